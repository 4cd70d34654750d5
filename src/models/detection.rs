use crate::models::trainer::TrainerIdentity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the battle a search is working toward
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward earlier frames (cut-in side)
    Before,
    /// Toward later frames (cut-out side)
    After,
}

impl Direction {
    /// Step a frame index one unit in this direction, saturating at zero
    pub fn step(&self, frame: u64, amount: u64) -> u64 {
        match self {
            Direction::Before => frame.saturating_sub(amount),
            Direction::After => frame.saturating_add(amount),
        }
    }
}

/// Result of a single text probe at one frame
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSample {
    pub frame: u64,
    pub matched: bool,
    pub trainer: Option<TrainerIdentity>,
}

/// Gameplay-region classification of one frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FrameClass {
    Black,
    White,
    Neither,
}

impl FrameClass {
    pub fn is_transition(&self) -> bool {
        matches!(self, FrameClass::Black | FrameClass::White)
    }
}

/// The frame where trainer text appears or disappears
///
/// `refined == false` means the sampling walk ran out of budget or hit the
/// recording bounds and the edge was clamped rather than binary-searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBoundary {
    pub frame: u64,
    pub refined: bool,
}

/// Final cut frame for one side of a battle
///
/// `Clamped` is the degraded outcome: every search phase failed and the cut
/// point fell back to the nearest defensible frame. It is reported, never
/// dropped, so the battle can be flagged for manual review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutPoint {
    Found { frame: u64, class: FrameClass },
    Clamped { frame: u64 },
}

impl CutPoint {
    pub fn frame(&self) -> u64 {
        match self {
            CutPoint::Found { frame, .. } => *frame,
            CutPoint::Clamped { frame } => *frame,
        }
    }

    pub fn is_clamped(&self) -> bool {
        matches!(self, CutPoint::Clamped { .. })
    }
}

/// A single classified event, kept for reporting
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub frame: u64,
    pub timestamp: f64,
    pub kind: String,
    pub details: String,
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Frame {:>8}] ({:>10.4}s) {}: {}",
            self.frame, self.timestamp, self.kind, self.details
        )
    }
}

/// A complete trainer battle with its resolved cut points
#[derive(Debug, Clone, Serialize)]
pub struct BattleSequence {
    pub trainer: TrainerIdentity,
    /// Frame where the coarse scan first saw the trainer text
    pub detection_frame: u64,
    pub cut_in_frame: u64,
    pub cut_out_frame: u64,
    pub cut_in_seconds: f64,
    pub cut_out_seconds: f64,
    /// True when either cut point was clamped instead of found
    pub degraded: bool,
}

impl BattleSequence {
    pub fn duration_seconds(&self) -> f64 {
        self.cut_out_seconds - self.cut_in_seconds
    }

    /// Whether two battles of the same trainer cover overlapping footage
    pub fn overlaps(&self, other: &BattleSequence) -> bool {
        self.cut_in_frame <= other.cut_out_frame && other.cut_in_frame <= self.cut_out_frame
    }
}

impl fmt::Display for BattleSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BATTLE: {}", self.trainer)?;
        writeln!(
            f,
            "  Cut IN:  Frame {:>8} ({:>10.4}s)",
            self.cut_in_frame, self.cut_in_seconds
        )?;
        writeln!(
            f,
            "  Cut OUT: Frame {:>8} ({:>10.4}s)",
            self.cut_out_frame, self.cut_out_seconds
        )?;
        write!(f, "  Duration: {:.2}s", self.duration_seconds())?;
        if self.degraded {
            write!(f, " (approximate)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_step() {
        assert_eq!(Direction::After.step(100, 30), 130);
        assert_eq!(Direction::Before.step(100, 30), 70);
        assert_eq!(Direction::Before.step(10, 30), 0);
    }

    #[test]
    fn test_cut_point_accessors() {
        let found = CutPoint::Found {
            frame: 500,
            class: FrameClass::Black,
        };
        let clamped = CutPoint::Clamped { frame: 900 };
        assert_eq!(found.frame(), 500);
        assert!(!found.is_clamped());
        assert_eq!(clamped.frame(), 900);
        assert!(clamped.is_clamped());
    }

    #[test]
    fn test_frame_class_transition() {
        assert!(FrameClass::Black.is_transition());
        assert!(FrameClass::White.is_transition());
        assert!(!FrameClass::Neither.is_transition());
    }

    #[test]
    fn test_battle_overlap() {
        let trainer = TrainerIdentity::named("Roark");
        let make = |cut_in: u64, cut_out: u64| BattleSequence {
            trainer: trainer.clone(),
            detection_frame: cut_in + 10,
            cut_in_frame: cut_in,
            cut_out_frame: cut_out,
            cut_in_seconds: cut_in as f64 / 240.0,
            cut_out_seconds: cut_out as f64 / 240.0,
            degraded: false,
        };
        assert!(make(100, 200).overlaps(&make(150, 300)));
        assert!(make(150, 300).overlaps(&make(100, 200)));
        assert!(!make(100, 200).overlaps(&make(201, 300)));
    }

    #[test]
    fn test_battle_display_marks_degraded() {
        let battle = BattleSequence {
            trainer: TrainerIdentity::named("Cynthia"),
            detection_frame: 1200,
            cut_in_frame: 960,
            cut_out_frame: 2400,
            cut_in_seconds: 4.0,
            cut_out_seconds: 10.0,
            degraded: true,
        };
        let text = battle.to_string();
        assert!(text.contains("Cynthia"));
        assert!(text.contains("(approximate)"));
    }
}
