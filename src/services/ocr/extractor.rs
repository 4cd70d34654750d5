use crate::models::profile::{GenerationProfile, PreprocessingMode};
use crate::services::matcher;
use crate::services::ocr::http_ocr::{RecognitionMode, TextRecognizer};
use crate::services::ocr::preprocessing;
use image::DynamicImage;
use tracing::trace;

/// Extracts normalized header text from a frame
///
/// Preprocessing is selected by the profile alone. The profile is keyed on
/// the generation, never on the header's pattern family: two generations can
/// share a family while needing different preprocessing, and selecting by
/// family makes one of them unreadable.
pub struct TextExtractor<'a, R: TextRecognizer + ?Sized> {
    recognizer: &'a R,
}

impl<'a, R: TextRecognizer + ?Sized> TextExtractor<'a, R> {
    pub fn new(recognizer: &'a R) -> Self {
        Self { recognizer }
    }

    /// Crop the header region, preprocess per the profile, recognize, and
    /// normalize
    ///
    /// A crop outside the frame bounds is a configuration fault (wrong
    /// profile for the capture) and propagates as an error. A crop that
    /// cannot contain text short-circuits to the empty string without
    /// paying for recognition.
    pub fn extract(
        &self,
        frame: &DynamicImage,
        profile: &GenerationProfile,
    ) -> Result<String, String> {
        let region = profile.ocr_region;
        if !region.fits_within(frame.width(), frame.height()) {
            return Err(format!(
                "OCR region {:?} outside frame bounds {}x{} (wrong profile for this capture?)",
                region,
                frame.width(),
                frame.height()
            ));
        }

        let crop = frame.crop_imm(region.x as u32, region.y as u32, region.width, region.height);

        if !preprocessing::has_text_like_content(&crop) {
            return Ok(String::new());
        }

        let text = match profile.preprocessing {
            PreprocessingMode::Raw => self.recognizer.recognize(&crop, RecognitionMode::Block)?,
            PreprocessingMode::PercentileThreshold => {
                let binary = preprocessing::threshold_darkest(&crop);
                self.recognizer
                    .recognize(&DynamicImage::ImageLuma8(binary), RecognitionMode::Line)?
            }
        };

        let normalized = matcher::normalize(&text);
        trace!(text = %normalized, "header text");
        Ok(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{Generation, PatternFamily, Platform};
    use crate::models::region::Region;
    use image::{Rgb, RgbImage};
    use std::cell::Cell;

    /// Recognizer that only reads binarized (pure black/white) input; raw
    /// textured crops come back as garbage, the way a real engine behaves on
    /// a colored header background.
    struct BinaryOnlyRecognizer {
        calls: Cell<u32>,
    }

    impl BinaryOnlyRecognizer {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl TextRecognizer for BinaryOnlyRecognizer {
        fn recognize(&self, image: &DynamicImage, _mode: RecognitionMode) -> Result<String, String> {
            self.calls.set(self.calls.get() + 1);
            let binary = image
                .to_luma8()
                .pixels()
                .all(|p| p[0] == 0 || p[0] == 255);
            if binary {
                Ok("Leader Roark".to_string())
            } else {
                Ok("~#@ garbled".to_string())
            }
        }
    }

    fn profile(preprocessing: PreprocessingMode) -> GenerationProfile {
        GenerationProfile {
            generation: Generation::Gen4,
            platform: Platform::NintendoDs,
            pattern_family: PatternFamily::Leader,
            preprocessing,
            ocr_region: Region::new(0, 0, 100, 20),
            gameplay_region: Region::new(0, 20, 100, 20),
            patterns: vec![],
        }
    }

    /// Frame whose header row has dark text strokes on a textured background
    fn textured_header_frame() -> DynamicImage {
        let img = RgbImage::from_fn(200, 50, |x, y| {
            if y < 20 {
                if y >= 8 && y < 12 && x % 4 < 2 && x < 100 {
                    Rgb([15, 10, 20])
                } else {
                    // Textured band, not a flat color
                    Rgb([150 + (x % 40) as u8, 120, 90])
                }
            } else {
                Rgb([128, 128, 128])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    fn flat_frame() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 50, Rgb([128, 128, 128])))
    }

    #[test]
    fn test_preprocessing_selection_regression() {
        let recognizer = BinaryOnlyRecognizer::new();
        let extractor = TextExtractor::new(&recognizer);
        let frame = textured_header_frame();

        // Thresholding generation: readable only after binarization.
        let text = extractor
            .extract(&frame, &profile(PreprocessingMode::PercentileThreshold))
            .unwrap();
        assert_eq!(text, "leader roark");

        // Same frame through raw mode returns garbage, not a match.
        let text = extractor
            .extract(&frame, &profile(PreprocessingMode::Raw))
            .unwrap();
        assert!(!text.contains("roark"));
    }

    #[test]
    fn test_out_of_bounds_crop_is_an_error() {
        let recognizer = BinaryOnlyRecognizer::new();
        let extractor = TextExtractor::new(&recognizer);
        let frame = flat_frame();

        let mut bad = profile(PreprocessingMode::Raw);
        bad.ocr_region = Region::new(150, 0, 100, 20);

        let result = extractor.extract(&frame, &bad);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("outside frame bounds"));
    }

    #[test]
    fn test_prescreen_skips_recognition() {
        let recognizer = BinaryOnlyRecognizer::new();
        let extractor = TextExtractor::new(&recognizer);

        let text = extractor
            .extract(&flat_frame(), &profile(PreprocessingMode::Raw))
            .unwrap();
        assert_eq!(text, "");
        assert_eq!(recognizer.calls.get(), 0);
    }
}
