use image::{DynamicImage, GrayImage, ImageBuffer, Luma};

/// Convert a crop to single-channel intensity
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

/// Intensity value at the given percentile of the crop's histogram
///
/// Returns the smallest intensity whose cumulative pixel count reaches the
/// percentile. Zero-area images report 0.
pub fn percentile(gray: &GrayImage, pct: f64) -> u8 {
    let total = (gray.width() as u64) * (gray.height() as u64);
    if total == 0 {
        return 0;
    }

    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let target = (pct / 100.0 * total as f64).ceil().max(1.0) as u64;
    let mut cumulative = 0u64;
    for (value, count) in histogram.iter().enumerate() {
        cumulative += count;
        if cumulative >= target {
            return value as u8;
        }
    }
    255
}

/// Binarize at the crop's own 20th intensity percentile and invert
///
/// Pixels strictly darker than the 20th percentile are taken as text and
/// rendered black on a white field, which is what the recognizer's
/// single-line mode expects. Adapts to whatever background color or texture
/// the header uses. The comparison is strict so a bimodal crop whose
/// percentile lands on the background value does not flood to all-text.
pub fn threshold_darkest(image: &DynamicImage) -> GrayImage {
    let gray = to_grayscale(image);
    let threshold = percentile(&gray, 20.0);

    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] < threshold {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    })
}

/// Mean pixel intensity of a grayscale crop
pub fn mean_intensity(gray: &GrayImage) -> f64 {
    let total = (gray.width() as u64) * (gray.height() as u64);
    if total == 0 {
        return 0.0;
    }
    let sum: u64 = gray.pixels().map(|p| p[0] as u64).sum();
    sum as f64 / total as f64
}

const MIN_TEXT_CONTRAST: u8 = 30;
const MIN_TEXT_RATIO: f64 = 0.03;
const MAX_TEXT_RATIO: f64 = 0.6;

/// Cheap pre-screen: does this crop plausibly contain header text?
///
/// Orders of magnitude faster than recognition; filters the flat gameplay
/// frames that make up most of a recording. Requires enough contrast for
/// glyphs to exist and a dark-pixel share that looks like text rather than
/// noise or a solid block.
pub fn has_text_like_content(image: &DynamicImage) -> bool {
    let gray = to_grayscale(image);
    let total = (gray.width() as u64) * (gray.height() as u64);
    if total == 0 {
        return false;
    }

    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for pixel in gray.pixels() {
        let v = pixel[0];
        min = min.min(v);
        max = max.max(v);
    }
    if max - min < MIN_TEXT_CONTRAST {
        return false;
    }

    let threshold = percentile(&gray, 20.0);
    let dark: u64 = gray.pixels().filter(|p| p[0] < threshold).count() as u64;
    let ratio = dark as f64 / total as f64;

    (MIN_TEXT_RATIO..=MAX_TEXT_RATIO).contains(&ratio)
}
