use crate::models::config::SearchTuning;
use crate::models::detection::{
    BattleSequence, CutPoint, Detection, DetectionSample, Direction, FrameClass,
};
use crate::models::profile::GenerationProfile;
use crate::models::trainer::TrainerIdentity;
use crate::services::boundary::BoundarySearch;
use crate::services::cut_search::TransitionSearch;
use crate::services::frame_source::FrameSource;
use crate::services::matcher;
use crate::services::ocr::extractor::TextExtractor;
use crate::services::ocr::http_ocr::TextRecognizer;
use crate::services::transition::TransitionFrameScanner;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Everything one run produces
#[derive(Debug)]
pub struct Analysis {
    pub battles: Vec<BattleSequence>,
    pub detections: Vec<Detection>,
}

struct ResolvedBattle {
    sequence: BattleSequence,
    cut_in: CutPoint,
    cut_out: CutPoint,
}

/// Full-recording battle detection driver
///
/// Scans the recording for trainer header text at adaptive intervals, then
/// resolves each detection to its cut points: text boundaries first, then
/// black/white transition frames. Independent battles resolve in parallel;
/// each worker clones its own frame-source handle, and the only shared state
/// is the recognition-text cache. A frame is never recognized twice —
/// recognition output for an unchanged frame cannot change, so retries apply
/// only to widening search windows.
pub struct BattleDetector<'a, S, R>
where
    S: FrameSource + Clone + Send + Sync,
    R: TextRecognizer + Sync,
{
    source: S,
    recognizer: &'a R,
    profile: &'a GenerationProfile,
    tuning: SearchTuning,
    text_cache: Mutex<HashMap<u64, String>>,
}

impl<'a, S, R> BattleDetector<'a, S, R>
where
    S: FrameSource + Clone + Send + Sync,
    R: TextRecognizer + Sync,
{
    pub fn new(
        source: S,
        recognizer: &'a R,
        profile: &'a GenerationProfile,
        tuning: SearchTuning,
    ) -> Result<Self, String> {
        tuning.validate()?;
        Ok(Self {
            source,
            recognizer,
            profile,
            tuning,
            text_cache: Mutex::new(HashMap::new()),
        })
    }

    /// Cached header text for a frame
    fn header_text(&self, source: &mut S, frame: u64) -> Result<String, String> {
        if let Some(text) = self.text_cache.lock().get(&frame) {
            return Ok(text.clone());
        }

        let pixels = source.decode(frame)?;
        let text = TextExtractor::new(self.recognizer).extract(&pixels, self.profile)?;
        self.text_cache.lock().insert(frame, text.clone());
        Ok(text)
    }

    /// Probe one frame for trainer header text
    fn sample(&self, source: &mut S, frame: u64) -> Result<DetectionSample, String> {
        let text = self.header_text(source, frame)?;
        let trainer = matcher::match_trainer(&text, &self.profile.patterns);
        Ok(DetectionSample {
            frame,
            matched: trainer.is_some(),
            trainer,
        })
    }

    /// Scan the whole recording and resolve every battle's cut points
    pub fn analyze(&self) -> Result<Analysis, String> {
        let total_frames = self.source.frame_count();
        let fps = self.source.frame_rate();
        info!(
            total_frames,
            fps,
            generation = %self.profile.generation,
            "scanning recording for trainer battles"
        );

        let hits = self.scan(total_frames)?;
        info!(candidates = hits.len(), "scan complete");

        let resolved: Vec<ResolvedBattle> = hits
            .par_iter()
            .filter_map(|(identity, frame)| {
                let mut source = self.source.clone();
                match self.resolve_battle(&mut source, identity, *frame) {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(trainer = %identity, frame, "battle resolution failed: {}", e);
                        None
                    }
                }
            })
            .collect();

        let mut detections = Vec::new();
        for battle in &resolved {
            detections.push(cut_detection(&battle.cut_in, fps));
            detections.push(cut_detection(&battle.cut_out, fps));
        }
        detections.sort_by_key(|d| d.frame);
        detections.dedup_by_key(|d| d.frame);

        let mut battles: Vec<BattleSequence> =
            resolved.into_iter().map(|r| r.sequence).collect();
        battles.sort_by_key(|b| b.cut_in_frame);
        let battles = merge_overlapping(battles);

        for pair in battles.windows(2) {
            if pair[0].cut_out_frame > pair[1].cut_in_frame {
                // Distinct trainers with overlapping cut spans: the footage
                // needs manual review, there is no safe automatic policy.
                warn!(
                    first = %pair[0].trainer,
                    second = %pair[1].trainer,
                    "adjacent battles overlap; cut points need review"
                );
            }
        }

        info!(battles = battles.len(), "analysis complete");
        Ok(Analysis {
            battles,
            detections,
        })
    }

    /// Coarse scan for trainer header text
    ///
    /// Early-game footage is sampled more densely because its battles are
    /// short. Repeat sightings of a trainer within twice the local interval
    /// are the same battle still on screen, not a new one.
    fn scan(&self, total_frames: u64) -> Result<Vec<(TrainerIdentity, u64)>, String> {
        let mut source = self.source.clone();
        let mut hits: Vec<(TrainerIdentity, u64)> = Vec::new();
        let mut seen: HashMap<String, Vec<u64>> = HashMap::new();

        let mut frame = 0u64;
        while frame < total_frames {
            let sample = self.sample(&mut source, frame)?;
            if let Some(identity) = sample.trainer {
                let interval = self.tuning.interval_at(frame);
                let too_close = seen
                    .get(identity.name.as_str())
                    .map(|frames| frames.iter().any(|d| frame.abs_diff(*d) < interval * 2))
                    .unwrap_or(false);

                if !too_close {
                    debug!(trainer = %identity, frame, "trainer detected");
                    seen.entry(identity.name.clone()).or_default().push(frame);
                    hits.push((identity, frame));
                }
            }
            frame += self.tuning.interval_at(frame);
        }

        Ok(hits)
    }

    /// Resolve one detection to a full battle, or `None` when no valid cut
    /// span can be found
    fn resolve_battle(
        &self,
        source: &mut S,
        identity: &TrainerIdentity,
        detection_frame: u64,
    ) -> Result<Option<ResolvedBattle>, String> {
        let total_frames = self.source.frame_count();
        let fps = self.source.frame_rate();
        let last_frame = total_frames.saturating_sub(1);

        let boundary_search = BoundarySearch::new(
            self.tuning.transition_jump,
            self.tuning.max_sampling_jumps,
            total_frames,
        );

        let (before, after) = {
            let name = identity.name.as_str();
            // The probe matches on the trainer's canonical name; a glitched
            // battle number mid-battle must not read as a boundary.
            let mut probe = |frame: u64| -> Result<bool, String> {
                let sample = self.sample(source, frame)?;
                Ok(sample
                    .trainer
                    .map_or(false, |found| found.name == name))
            };

            let before =
                boundary_search.find_text_boundary(&mut probe, detection_frame, Direction::Before)?;
            let after =
                boundary_search.find_text_boundary(&mut probe, detection_frame, Direction::After)?;
            (before, after)
        };

        let scanner = TransitionFrameScanner::new(
            self.profile.gameplay_region,
            self.tuning.black_mean_threshold,
            self.tuning.white_mean_threshold,
        );
        let transition_search = TransitionSearch::new(&scanner, &self.tuning);

        let cut_in =
            transition_search.find_transition(source, before.frame, Direction::Before, detection_frame)?;
        let mut cut_out =
            transition_search.find_transition(source, after.frame, Direction::After, detection_frame)?;

        // An inverted span means the cut-out search latched onto something
        // behind the battle; widen forward until the ordering holds.
        if cut_out.frame() <= cut_in.frame() {
            for (window_seconds, step) in [(180.0, 10u64), (300.0, 20u64)] {
                let sweep_end = cut_in
                    .frame()
                    .saturating_add((fps * window_seconds) as u64)
                    .min(last_frame);
                if let Some(found) =
                    scanner.find_in_range(source, cut_in.frame() + 1, sweep_end, step)?
                {
                    let centered = scanner.run_center(source, found)?;
                    let class = scanner.classify_at(source, centered)?;
                    cut_out = CutPoint::Found {
                        frame: centered,
                        class,
                    };
                    break;
                }
            }
        }

        if cut_out.frame() <= cut_in.frame() {
            warn!(
                trainer = %identity,
                frame = detection_frame,
                "no valid cut-out found; skipping battle"
            );
            return Ok(None);
        }

        let degraded =
            !before.refined || !after.refined || cut_in.is_clamped() || cut_out.is_clamped();
        if degraded {
            warn!(
                trainer = %identity,
                frame = detection_frame,
                "battle cut points are approximate"
            );
        }

        let sequence = BattleSequence {
            trainer: identity.clone(),
            detection_frame,
            cut_in_frame: cut_in.frame(),
            cut_out_frame: cut_out.frame(),
            cut_in_seconds: cut_in.frame() as f64 / fps,
            cut_out_seconds: cut_out.frame() as f64 / fps,
            degraded,
        };
        debug!(trainer = %identity, cut_in = sequence.cut_in_frame, cut_out = sequence.cut_out_frame, "battle resolved");

        Ok(Some(ResolvedBattle {
            sequence,
            cut_in,
            cut_out,
        }))
    }
}

fn cut_detection(cut: &CutPoint, fps: f64) -> Detection {
    let (kind, details) = match cut {
        CutPoint::Found {
            class: FrameClass::Black,
            ..
        } => ("BLACK_FRAME", "".to_string()),
        CutPoint::Found {
            class: FrameClass::White,
            ..
        } => ("WHITE_FRAME", "".to_string()),
        CutPoint::Found { .. } => ("TRANSITION", "".to_string()),
        CutPoint::Clamped { .. } => ("CLAMPED", "no transition found".to_string()),
    };
    Detection {
        frame: cut.frame(),
        timestamp: cut.frame() as f64 / fps,
        kind: kind.to_string(),
        details,
    }
}

/// Union overlapping battles of the same trainer
///
/// A battle longer than the de-duplication window gets detected more than
/// once; both resolutions describe the same footage, so they merge into one
/// span. Input must be sorted by cut-in frame.
fn merge_overlapping(battles: Vec<BattleSequence>) -> Vec<BattleSequence> {
    let mut by_trainer: HashMap<String, Vec<BattleSequence>> = HashMap::new();
    for battle in battles {
        by_trainer
            .entry(battle.trainer.name.clone())
            .or_default()
            .push(battle);
    }

    let mut merged = Vec::new();
    for (_, mut group) in by_trainer {
        group.sort_by_key(|b| b.cut_in_frame);
        let mut iter = group.into_iter();
        let mut current = match iter.next() {
            Some(first) => first,
            None => continue,
        };

        for next in iter {
            if next.overlaps(&current) {
                // Keep the numbered identity when one side has it.
                if current.trainer.number.is_none() && next.trainer.number.is_some() {
                    current.trainer = next.trainer.clone();
                }
                current.detection_frame = current.detection_frame.min(next.detection_frame);
                current.cut_in_frame = current.cut_in_frame.min(next.cut_in_frame);
                current.cut_out_frame = current.cut_out_frame.max(next.cut_out_frame);
                current.cut_in_seconds = current.cut_in_seconds.min(next.cut_in_seconds);
                current.cut_out_seconds = current.cut_out_seconds.max(next.cut_out_seconds);
                current.degraded = current.degraded || next.degraded;
            } else {
                merged.push(current);
                current = next;
            }
        }
        merged.push(current);
    }

    merged.sort_by_key(|b| b.cut_in_frame);
    merged
}
