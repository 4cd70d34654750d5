use crate::models::detection::{Direction, TextBoundary};
use tracing::{debug, warn};

/// Phase of a text-boundary search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchState {
    Sampling,
    Refining,
    Done,
}

/// Finds the frame where trainer header text appears or disappears
///
/// Two phases: a coarse walk by `jump_size` away from a frame known to show
/// the text, then a binary search of the last jump interval down to the
/// single-frame edge. Total probe cost is the walk plus O(log jump_size),
/// against O(n) for a linear scan; probes are recognition calls on freshly
/// sought frames, so this is the entire point of the design.
///
/// The probe is injected as a closure so the search logic is testable
/// without video or recognition behind it.
pub struct BoundarySearch {
    jump_size: u64,
    max_jumps: u32,
    last_frame: u64,
}

impl BoundarySearch {
    /// `frame_count` is the recording length; searches clamp inside it
    pub fn new(jump_size: u64, max_jumps: u32, frame_count: u64) -> Self {
        Self {
            jump_size: jump_size.max(1),
            max_jumps: max_jumps.max(1),
            last_frame: frame_count.saturating_sub(1),
        }
    }

    /// Walk from `start_frame` (which shows the text) in `direction` until
    /// the text disappears, then refine to the exact edge
    ///
    /// Returns the first frame in `direction` where the text is no longer
    /// visible. When the walk exhausts its jump budget or runs into the
    /// recording bounds while the text still matches, the boundary is
    /// clamped there and reported as non-refined.
    pub fn find_text_boundary<P>(
        &self,
        probe: &mut P,
        start_frame: u64,
        direction: Direction,
    ) -> Result<TextBoundary, String>
    where
        P: FnMut(u64) -> Result<bool, String>,
    {
        let bound = match direction {
            Direction::Before => 0,
            Direction::After => self.last_frame,
        };

        let mut state = SearchState::Sampling;
        let mut inside = start_frame.min(self.last_frame);
        let mut outside = inside;
        let mut jumps = 0u32;

        loop {
            match state {
                SearchState::Sampling => {
                    if inside == bound {
                        // Text runs into the edge of the recording.
                        warn!(
                            frame = inside,
                            ?direction,
                            "text boundary clamped at recording edge"
                        );
                        return Ok(TextBoundary {
                            frame: inside,
                            refined: false,
                        });
                    }
                    if jumps >= self.max_jumps {
                        warn!(
                            frame = inside,
                            ?direction,
                            jumps,
                            "text boundary walk exhausted its jump budget"
                        );
                        return Ok(TextBoundary {
                            frame: inside,
                            refined: false,
                        });
                    }

                    let next = direction.step(inside, self.jump_size).min(self.last_frame);
                    jumps += 1;

                    if probe(next)? {
                        inside = next;
                    } else {
                        outside = next;
                        state = SearchState::Refining;
                    }
                }
                SearchState::Refining => {
                    // Binary search of the last jump interval; terminates in
                    // log2(jump_size) probes by construction.
                    if inside.abs_diff(outside) <= 1 {
                        state = SearchState::Done;
                        continue;
                    }
                    let (lo, hi) = if inside < outside {
                        (inside, outside)
                    } else {
                        (outside, inside)
                    };
                    let mid = lo + (hi - lo) / 2;
                    if probe(mid)? {
                        inside = mid;
                    } else {
                        outside = mid;
                    }
                }
                SearchState::Done => break,
            }
        }

        debug!(boundary = outside, ?direction, "text boundary refined");
        Ok(TextBoundary {
            frame: outside,
            refined: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Probe with text visible on an inclusive frame range, counting calls
    struct RangeProbe {
        visible: std::ops::RangeInclusive<u64>,
        calls: Cell<u32>,
    }

    impl RangeProbe {
        fn new(visible: std::ops::RangeInclusive<u64>) -> Self {
            Self {
                visible,
                calls: Cell::new(0),
            }
        }

        fn probe(&self) -> impl FnMut(u64) -> Result<bool, String> + '_ {
            move |frame| {
                self.calls.set(self.calls.get() + 1);
                Ok(self.visible.contains(&frame))
            }
        }
    }

    #[test]
    fn test_backward_boundary() {
        let probe = RangeProbe::new(1000..=1500);
        let search = BoundarySearch::new(240, 64, 100_000);

        let boundary = search
            .find_text_boundary(&mut probe.probe(), 1200, Direction::Before)
            .unwrap();

        // First frame going backward where the text is gone.
        assert_eq!(boundary.frame, 999);
        assert!(boundary.refined);
    }

    #[test]
    fn test_forward_boundary() {
        let probe = RangeProbe::new(1000..=1500);
        let search = BoundarySearch::new(240, 64, 100_000);

        let boundary = search
            .find_text_boundary(&mut probe.probe(), 1200, Direction::After)
            .unwrap();

        assert_eq!(boundary.frame, 1501);
        assert!(boundary.refined);
    }

    #[test]
    fn test_boundaries_bracket_the_detection_frame() {
        let probe = RangeProbe::new(1000..=1500);
        let search = BoundarySearch::new(240, 64, 100_000);

        let before = search
            .find_text_boundary(&mut probe.probe(), 1200, Direction::Before)
            .unwrap();
        let after = search
            .find_text_boundary(&mut probe.probe(), 1200, Direction::After)
            .unwrap();

        assert!(before.frame < 1200);
        assert!(after.frame > 1200);
    }

    #[test]
    fn test_idempotent_over_deterministic_probe() {
        let probe = RangeProbe::new(4000..=9000);
        let search = BoundarySearch::new(720, 64, 1_000_000);

        let first = search
            .find_text_boundary(&mut probe.probe(), 5000, Direction::After)
            .unwrap();
        let second = search
            .find_text_boundary(&mut probe.probe(), 5000, Direction::After)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_clamped_at_recording_start() {
        // Text visible from frame zero: there is no earlier non-matching
        // frame to find.
        let probe = RangeProbe::new(0..=100);
        let search = BoundarySearch::new(240, 64, 100_000);

        let boundary = search
            .find_text_boundary(&mut probe.probe(), 50, Direction::Before)
            .unwrap();

        assert_eq!(boundary.frame, 0);
        assert!(!boundary.refined);
    }

    #[test]
    fn test_clamped_at_recording_end() {
        let probe = RangeProbe::new(900..=999);
        let search = BoundarySearch::new(240, 64, 1000);

        let boundary = search
            .find_text_boundary(&mut probe.probe(), 950, Direction::After)
            .unwrap();

        assert_eq!(boundary.frame, 999);
        assert!(!boundary.refined);
    }

    #[test]
    fn test_jump_budget_exhaustion() {
        // Probe that always matches within an enormous recording.
        let probe = RangeProbe::new(0..=u64::MAX);
        let search = BoundarySearch::new(10, 5, u64::MAX);

        let boundary = search
            .find_text_boundary(&mut probe.probe(), 0, Direction::After)
            .unwrap();

        assert_eq!(boundary.frame, 50);
        assert!(!boundary.refined);
    }

    #[test]
    fn test_probe_count_is_logarithmic() {
        let probe = RangeProbe::new(0..=1500);
        let search = BoundarySearch::new(256, 64, 100_000);

        let boundary = search
            .find_text_boundary(&mut probe.probe(), 0, Direction::After)
            .unwrap();
        assert_eq!(boundary.frame, 1501);

        // Walk: 1536/256 = 6 coarse probes; refinement: log2(256) = 8.
        assert!(
            probe.calls.get() <= 14,
            "expected <= 14 probes, used {}",
            probe.calls.get()
        );
    }

    #[test]
    fn test_probe_error_propagates() {
        let search = BoundarySearch::new(240, 64, 100_000);
        let mut failing = |_frame: u64| Err("decode failed".to_string());
        assert!(search
            .find_text_boundary(&mut failing, 1200, Direction::After)
            .is_err());
    }
}
