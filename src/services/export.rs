use crate::models::detection::BattleSequence;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// One label entry for the editor automation consumer
#[derive(Debug, Clone, Serialize)]
pub struct LabelEntry {
    pub trainer: String,
    pub label: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub start_timecode: String,
    pub end_timecode: String,
    pub start_frame: u64,
    pub end_frame: u64,
    pub approximate: bool,
}

#[derive(Debug, Serialize)]
pub struct LabelExport {
    pub fps: f64,
    pub generated_at: String,
    pub total_battles: usize,
    pub labels: Vec<LabelEntry>,
}

#[derive(Debug, Serialize)]
struct Segment {
    start: f64,
    duration: f64,
    #[serde(rename = "type")]
    segment_type: String,
    operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

/// Editor label category for a trainer
///
/// Categories mirror the label shortcuts set up in the editing project:
/// rival fights, gym leaders, the Elite Four, champions, and the evil-team
/// leaders each get their own color; everything else falls back to the
/// story-battle label.
pub fn editor_label(trainer_name: &str) -> &'static str {
    match trainer_name.to_lowercase().as_str() {
        "rival" => "Rival",

        "roark" | "gardenia" | "fantina" | "maylene" | "wake" | "byron" | "candice"
        | "volkner" | "falkner" | "bugsy" | "whitney" | "morty" | "chuck" | "jasmine"
        | "pryce" | "clair" | "brock" | "misty" | "lt. surge" | "surge" | "erika" | "sabrina"
        | "blaine" | "janine" | "roxanne" | "brawly" | "wattson" | "flannery" | "norman"
        | "winona" | "tate & liza" | "juan" | "giovanni" | "koga" | "cress" | "chili"
        | "cilan" | "lenora" | "burgh" | "elesa" | "clay" | "skyla" | "brycen" | "drayden" => {
            "Gym"
        }

        "aaron" | "bertha" | "flint" | "lucian" | "will" | "bruno" | "karen" | "sidney"
        | "phoebe" | "glacia" | "drake" | "lorelei" | "agatha" | "shauntal" | "marshall"
        | "grimsley" | "caitlin" => "E4",

        "cynthia" | "red" | "steven" | "wallace" | "blue" | "lance" => "Champion",

        "mars" | "jupiter" | "saturn" | "cyrus" | "maxie" | "archie" | "ghetsis" | "n" => {
            "Enemy Leader"
        }

        _ => "Cerulean",
    }
}

/// Convert seconds to SMPTE timecode (HH:MM:SS:FF)
pub fn seconds_to_timecode(seconds: f64, fps: f64) -> String {
    let total_frames = (seconds * fps) as u64;
    let fps_whole = fps as u64;
    let frames = total_frames % fps_whole;
    let total_seconds = total_frames / fps_whole;
    let secs = total_seconds % 60;
    let total_minutes = total_seconds / 60;
    let mins = total_minutes % 60;
    let hours = total_minutes / 60;
    format!("{:02}:{:02}:{:02}:{:02}", hours, mins, secs, frames)
}

/// Build the label list for the editor automation consumer
pub fn build_labels(battles: &[BattleSequence], fps: f64) -> LabelExport {
    let mut sorted: Vec<&BattleSequence> = battles.iter().collect();
    sorted.sort_by_key(|b| b.cut_in_frame);

    let labels = sorted
        .iter()
        .map(|battle| LabelEntry {
            trainer: battle.trainer.to_string(),
            label: editor_label(&battle.trainer.name).to_string(),
            start_seconds: battle.cut_in_seconds,
            end_seconds: battle.cut_out_seconds,
            start_timecode: seconds_to_timecode(battle.cut_in_seconds, fps),
            end_timecode: seconds_to_timecode(battle.cut_out_seconds, fps),
            start_frame: battle.cut_in_frame,
            end_frame: battle.cut_out_frame,
            approximate: battle.degraded,
        })
        .collect();

    LabelExport {
        fps,
        generated_at: chrono::Utc::now().to_rfc3339(),
        total_battles: battles.len(),
        labels,
    }
}

/// Write the label JSON for the editor automation consumer
pub fn export_labels(battles: &[BattleSequence], fps: f64, path: &Path) -> Result<(), String> {
    let export = build_labels(battles, fps);
    let json = serde_json::to_string_pretty(&export)
        .map_err(|e| format!("Failed to serialize labels: {}", e))?;
    fs::write(path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

/// Write the full segment list (gaps and labeled battles) for splitting tools
pub fn export_segments(
    battles: &[BattleSequence],
    video_duration: f64,
    path: &Path,
) -> Result<(), String> {
    let mut sorted: Vec<&BattleSequence> = battles.iter().collect();
    sorted.sort_by_key(|b| b.cut_in_frame);

    let mut segments = Vec::new();
    let mut current_time = 0.0f64;

    for battle in sorted {
        if battle.cut_in_seconds > current_time {
            segments.push(Segment {
                start: current_time,
                duration: battle.cut_in_seconds - current_time,
                segment_type: "original".to_string(),
                operation: "keep".to_string(),
                label: None,
                name: None,
            });
        }

        segments.push(Segment {
            start: battle.cut_in_seconds,
            duration: battle.duration_seconds(),
            segment_type: "original".to_string(),
            operation: "keep".to_string(),
            label: Some("Green".to_string()),
            name: Some(format!("{} Battle", battle.trainer)),
        });

        current_time = battle.cut_out_seconds;
    }

    if current_time < video_duration {
        segments.push(Segment {
            start: current_time,
            duration: video_duration - current_time,
            segment_type: "original".to_string(),
            operation: "keep".to_string(),
            label: None,
            name: None,
        });
    }

    let json = serde_json::to_string_pretty(&segments)
        .map_err(|e| format!("Failed to serialize segments: {}", e))?;
    fs::write(path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trainer::TrainerIdentity;

    fn battle(name: &str, cut_in: u64, cut_out: u64, degraded: bool) -> BattleSequence {
        BattleSequence {
            trainer: TrainerIdentity::named(name),
            detection_frame: cut_in + 100,
            cut_in_frame: cut_in,
            cut_out_frame: cut_out,
            cut_in_seconds: cut_in as f64 / 240.0,
            cut_out_seconds: cut_out as f64 / 240.0,
            degraded,
        }
    }

    #[test]
    fn test_editor_label_categories() {
        assert_eq!(editor_label("Rival"), "Rival");
        assert_eq!(editor_label("Roark"), "Gym");
        assert_eq!(editor_label("Lucian"), "E4");
        assert_eq!(editor_label("Cynthia"), "Champion");
        assert_eq!(editor_label("Cyrus"), "Enemy Leader");
        assert_eq!(editor_label("Kimono Girl"), "Cerulean");
    }

    #[test]
    fn test_seconds_to_timecode() {
        assert_eq!(seconds_to_timecode(0.0, 240.0), "00:00:00:00");
        assert_eq!(seconds_to_timecode(53.05, 240.0), "00:00:53:12");
        assert_eq!(seconds_to_timecode(3661.0, 240.0), "01:01:01:00");
    }

    #[test]
    fn test_build_labels_sorted_and_converted() {
        let battles = vec![
            battle("Cynthia", 24000, 48000, false),
            battle("Roark", 1200, 3600, true),
        ];

        let export = build_labels(&battles, 240.0);
        assert_eq!(export.total_battles, 2);
        assert_eq!(export.labels[0].trainer, "Roark");
        assert_eq!(export.labels[0].label, "Gym");
        assert!((export.labels[0].start_seconds - 5.0).abs() < 1e-9);
        assert!(export.labels[0].approximate);
        assert_eq!(export.labels[1].label, "Champion");
    }

    #[test]
    fn test_export_labels_writes_json() {
        let battles = vec![battle("Roark", 1200, 3600, false)];
        let path = std::env::temp_dir().join(format!(
            "fury-cutter-labels-{}.json",
            std::process::id()
        ));

        export_labels(&battles, 240.0, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["total_battles"], 1);
        assert_eq!(parsed["labels"][0]["label"], "Gym");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_export_segments_covers_whole_duration() {
        let battles = vec![battle("Roark", 2400, 4800, false)];
        let path = std::env::temp_dir().join(format!(
            "fury-cutter-segments-{}.json",
            std::process::id()
        ));

        export_segments(&battles, 60.0, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        let segments = parsed.as_array().unwrap();

        // Gap, battle, trailing gap.
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1]["label"], "Green");
        let last = segments.last().unwrap();
        let end = last["start"].as_f64().unwrap() + last["duration"].as_f64().unwrap();
        assert!((end - 60.0).abs() < 1e-9);

        let _ = std::fs::remove_file(&path);
    }
}
