use crate::models::detection::FrameClass;
use crate::models::region::Region;
use crate::services::frame_source::FrameSource;
use crate::services::ocr::preprocessing;
use image::DynamicImage;

/// Classifies frames as black, white, or neither over the gameplay crop
///
/// Thresholds are fixed constants; correctness rides entirely on the crop
/// being right for the capture layout. A crop that includes letterboxing or
/// UI chrome shifts the mean enough to defeat both detections.
pub struct TransitionFrameScanner {
    gameplay_region: Region,
    black_threshold: f64,
    white_threshold: f64,
}

impl TransitionFrameScanner {
    pub fn new(gameplay_region: Region, black_threshold: f64, white_threshold: f64) -> Self {
        Self {
            gameplay_region,
            black_threshold,
            white_threshold,
        }
    }

    /// Classify a single decoded frame
    pub fn classify(&self, frame: &DynamicImage) -> Result<FrameClass, String> {
        let region = self.gameplay_region;
        if !region.fits_within(frame.width(), frame.height()) {
            return Err(format!(
                "Gameplay region {:?} outside frame bounds {}x{}",
                region,
                frame.width(),
                frame.height()
            ));
        }

        let crop = frame.crop_imm(region.x as u32, region.y as u32, region.width, region.height);
        let mean = preprocessing::mean_intensity(&crop.to_luma8());

        Ok(if mean <= self.black_threshold {
            FrameClass::Black
        } else if mean >= self.white_threshold {
            FrameClass::White
        } else {
            FrameClass::Neither
        })
    }

    /// Decode and classify one frame of a source
    pub fn classify_at<S: FrameSource>(
        &self,
        source: &mut S,
        frame: u64,
    ) -> Result<FrameClass, String> {
        let pixels = source.decode(frame)?;
        self.classify(&pixels)
    }

    /// Scan `from..=to` (either direction) by `step`, returning the first
    /// black or white frame
    pub fn find_in_range<S: FrameSource>(
        &self,
        source: &mut S,
        from: u64,
        to: u64,
        step: u64,
    ) -> Result<Option<u64>, String> {
        let step = step.max(1);
        let mut frame = from;
        loop {
            if self.classify_at(source, frame)?.is_transition() {
                return Ok(Some(frame));
            }
            if from <= to {
                frame += step;
                if frame > to {
                    break;
                }
            } else {
                if frame < to + step {
                    break;
                }
                frame -= step;
            }
        }
        Ok(None)
    }

    /// Binary-search the exact edge of a black/white run inside `lo..=hi`
    ///
    /// `find_start` looks for the first transition frame, otherwise the last.
    /// Returns `None` when neither endpoint is a transition frame.
    fn binary_search_edge<S: FrameSource>(
        &self,
        source: &mut S,
        lo: u64,
        hi: u64,
        find_start: bool,
    ) -> Result<Option<u64>, String> {
        let lo_transition = self.classify_at(source, lo)?.is_transition();
        let hi_transition = self.classify_at(source, hi)?.is_transition();

        if lo_transition && hi_transition {
            // The run covers the whole window; the edge is at (or beyond)
            // the window end.
            return Ok(Some(if find_start { lo } else { hi }));
        }
        if !lo_transition && !hi_transition {
            return Ok(None);
        }

        let (mut left, mut right) = (lo, hi);
        while right - left > 1 {
            let mid = left + (right - left) / 2;
            let mid_transition = self.classify_at(source, mid)?.is_transition();

            if find_start {
                if mid_transition {
                    right = mid;
                } else {
                    left = mid;
                }
            } else if mid_transition {
                left = mid;
            } else {
                right = mid;
            }
        }

        Ok(Some(if find_start { right } else { left }))
    }

    /// Center of the black/white run containing `approx`
    ///
    /// Transitions last several frames; cutting mid-run survives a frame of
    /// editor rounding in either direction. The run edges are binary-searched
    /// within a two-second window on each side.
    pub fn run_center<S: FrameSource>(
        &self,
        source: &mut S,
        approx: u64,
    ) -> Result<u64, String> {
        let window = (source.frame_rate() * 2.0) as u64;
        let last_frame = source.frame_count().saturating_sub(1);

        let search_start = approx.saturating_sub(window);
        let start = self
            .binary_search_edge(source, search_start, approx, true)?
            .unwrap_or(approx);

        let search_end = approx.saturating_add(window).min(last_frame);
        let end = self
            .binary_search_edge(source, approx, search_end, false)?
            .unwrap_or(approx);

        Ok(start + (end - start) / 2)
    }
}
