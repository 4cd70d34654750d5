use crate::models::config::SearchTuning;
use crate::models::detection::{CutPoint, Direction};
use crate::services::frame_source::FrameSource;
use crate::services::transition::TransitionFrameScanner;
use tracing::{debug, warn};

/// Converts a text boundary into a black/white cut frame
///
/// Three widening tiers: a bounded window around the boundary, an extended
/// window (cut-out only), and a fallback linear sweep from the detection
/// frame. The tiers exist for battles shorter than one coarse jump: the
/// boundary walk can overshoot such a battle entirely, leaving the real
/// transition outside the first window. Exhausting all tiers clamps the cut
/// point instead of failing, so short battles always produce a reviewable
/// result.
pub struct TransitionSearch<'a> {
    scanner: &'a TransitionFrameScanner,
    tuning: &'a SearchTuning,
}

impl<'a> TransitionSearch<'a> {
    pub fn new(scanner: &'a TransitionFrameScanner, tuning: &'a SearchTuning) -> Self {
        Self { scanner, tuning }
    }

    /// Find the cut frame for one side of a battle
    ///
    /// `boundary_frame` is the refined text edge; `detection_frame` is where
    /// the scan first saw the battle, used as the anchor for the fallback
    /// sweep.
    pub fn find_transition<S: FrameSource>(
        &self,
        source: &mut S,
        boundary_frame: u64,
        direction: Direction,
        detection_frame: u64,
    ) -> Result<CutPoint, String> {
        match direction {
            Direction::Before => self.find_cut_in(source, boundary_frame, detection_frame),
            Direction::After => self.find_cut_out(source, boundary_frame, detection_frame),
        }
    }

    /// Cut-in: scan backward from the boundary so the transition nearest the
    /// battle wins
    ///
    /// Pre-battle sequences can contain an earlier white flash followed by a
    /// closer black run; scanning backward returns the closer one.
    fn find_cut_in<S: FrameSource>(
        &self,
        source: &mut S,
        boundary_frame: u64,
        detection_frame: u64,
    ) -> Result<CutPoint, String> {
        let window_start = boundary_frame.saturating_sub(self.tuning.transition_jump);

        // Bounded window, coarse step first, then frame by frame.
        for step in [10, 1] {
            if let Some(found) =
                self.scanner
                    .find_in_range(source, boundary_frame, window_start, step)?
            {
                return self.center(source, found);
            }
        }

        // Fallback sweep backward from the detection point.
        let fps = source.frame_rate();
        let sweep_start = detection_frame
            .saturating_sub((fps * 2.0 * self.tuning.fallback_fine_seconds) as u64);
        if let Some(found) = self.scanner.find_in_range(
            source,
            detection_frame,
            sweep_start,
            self.tuning.fallback_fine_step,
        )? {
            return self.center(source, found);
        }

        warn!(
            boundary = boundary_frame,
            "no cut-in transition found; clamping at the text boundary"
        );
        Ok(CutPoint::Clamped {
            frame: boundary_frame,
        })
    }

    /// Cut-out: forward window, extended window, then the fallback sweep
    fn find_cut_out<S: FrameSource>(
        &self,
        source: &mut S,
        boundary_frame: u64,
        detection_frame: u64,
    ) -> Result<CutPoint, String> {
        let fps = source.frame_rate();
        let last_frame = source.frame_count().saturating_sub(1);
        let jump = self.tuning.transition_jump;

        // Phase 1: bounded window. Starts a few seconds before the boundary
        // because the fade can begin while the header text is still readable.
        let window_start = boundary_frame.saturating_sub((fps * 5.0) as u64);
        let window_end = boundary_frame.saturating_add(jump).min(last_frame);
        if let Some(found) = self
            .scanner
            .find_in_range(source, window_start, window_end, 10)?
        {
            return self.center(source, found);
        }

        // Phase 2: extended window, double the jump.
        let extended_end = boundary_frame.saturating_add(jump * 2).min(last_frame);
        if extended_end > window_end {
            if let Some(found) = self
                .scanner
                .find_in_range(source, window_end, extended_end, 10)?
            {
                return self.center(source, found);
            }
        }

        // Phase 3: fallback sweep from the detection point, fine then coarse.
        let fine_end = detection_frame
            .saturating_add((fps * self.tuning.fallback_fine_seconds) as u64)
            .min(last_frame);
        if let Some(found) = self.scanner.find_in_range(
            source,
            detection_frame,
            fine_end,
            self.tuning.fallback_fine_step,
        )? {
            return self.center(source, found);
        }

        let coarse_end = detection_frame
            .saturating_add((fps * self.tuning.fallback_coarse_seconds) as u64)
            .min(last_frame);
        if coarse_end > fine_end {
            if let Some(found) = self.scanner.find_in_range(
                source,
                fine_end,
                coarse_end,
                self.tuning.fallback_coarse_step,
            )? {
                return self.center(source, found);
            }
        }

        // A battle running into the end of the recording has no transition
        // to find; everything else clamps at the boundary for review.
        let clamp = if detection_frame.saturating_add((fps * 60.0) as u64) > last_frame {
            last_frame
        } else {
            boundary_frame
        };
        warn!(
            boundary = boundary_frame,
            clamp, "no cut-out transition found; clamping"
        );
        Ok(CutPoint::Clamped { frame: clamp })
    }

    /// Center the found frame within its black/white run and classify it
    fn center<S: FrameSource>(&self, source: &mut S, found: u64) -> Result<CutPoint, String> {
        let centered = self.scanner.run_center(source, found)?;
        let class = self.scanner.classify_at(source, centered)?;
        debug!(frame = centered, ?class, "transition frame located");
        Ok(CutPoint::Found {
            frame: centered,
            class,
        })
    }
}
