use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Random-seek access to decoded video frames
///
/// Seeks are treated as expensive: every search in this crate is shaped to
/// minimize the number of `decode` calls. Implementations that wrap a real
/// decoder keep their seek state in `&mut self`; parallel workers each own
/// their own source handle.
pub trait FrameSource {
    fn frame_count(&self) -> u64;
    fn frame_rate(&self) -> f64;
    fn decode(&mut self, frame: u64) -> Result<DynamicImage, String>;

    /// Timestamp of a frame in seconds
    fn timestamp(&self, frame: u64) -> f64 {
        frame as f64 / self.frame_rate()
    }
}

/// Frame source over a directory of numbered frame images
///
/// Works on the per-frame image export of a capture (one file per frame,
/// lexicographic order == frame order). Decoding the container itself stays
/// outside this crate.
#[derive(Clone)]
pub struct ImageSequenceSource {
    frames: Arc<Vec<PathBuf>>,
    frame_rate: f64,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

impl ImageSequenceSource {
    /// Open a frame directory
    ///
    /// Fails when the directory cannot be read, contains no frame images, or
    /// the frame rate is not positive.
    pub fn open(dir: &Path, frame_rate: f64) -> Result<Self, String> {
        if frame_rate <= 0.0 {
            return Err(format!("Frame rate must be positive, got {}", frame_rate));
        }

        let entries = std::fs::read_dir(dir)
            .map_err(|e| format!("Failed to read frame directory {}: {}", dir.display(), e))?;

        let mut frames: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();

        if frames.is_empty() {
            return Err(format!("No frame images found in {}", dir.display()));
        }

        frames.sort();

        Ok(Self {
            frames: Arc::new(frames),
            frame_rate,
        })
    }
}

impl FrameSource for ImageSequenceSource {
    fn frame_count(&self) -> u64 {
        self.frames.len() as u64
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn decode(&mut self, frame: u64) -> Result<DynamicImage, String> {
        let path = self
            .frames
            .get(frame as usize)
            .ok_or_else(|| format!("Frame {} out of range (0..{})", frame, self.frames.len()))?;

        image::open(path).map_err(|e| format!("Failed to decode {}: {}", path.display(), e))
    }
}
