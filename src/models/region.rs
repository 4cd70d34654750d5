use serde::{Deserialize, Serialize};

/// Rectangular crop region within a video frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Create a new region from top-left corner and size
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a region from corner coordinates (x1, y1, x2, y2)
    pub fn from_bounds(x1: i32, y1: i32, x2: i32, y2: i32) -> Result<Self, String> {
        if x2 <= x1 {
            return Err("x2 must be greater than x1".to_string());
        }
        if y2 <= y1 {
            return Err("y2 must be greater than y1".to_string());
        }

        Ok(Self {
            x: x1,
            y: y1,
            width: (x2 - x1) as u32,
            height: (y2 - y1) as u32,
        })
    }

    /// Validate region dimensions
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Right edge (exclusive)
    pub fn x2(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Bottom edge (exclusive)
    pub fn y2(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Check that the region lies fully inside a frame of the given size
    pub fn fits_within(&self, frame_width: u32, frame_height: u32) -> bool {
        self.is_valid()
            && self.x >= 0
            && self.y >= 0
            && self.x2() <= frame_width as i32
            && self.y2() <= frame_height as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_creation() {
        let region = Region::new(448, 19, 1024, 768);
        assert_eq!(region.x, 448);
        assert_eq!(region.y, 19);
        assert_eq!(region.width, 1024);
        assert_eq!(region.height, 768);
    }

    #[test]
    fn test_region_from_bounds_valid() {
        let region = Region::from_bounds(100, 100, 300, 250).unwrap();
        assert_eq!(region.x, 100);
        assert_eq!(region.y, 100);
        assert_eq!(region.width, 200);
        assert_eq!(region.height, 150);
    }

    #[test]
    fn test_region_from_bounds_invalid() {
        assert!(Region::from_bounds(300, 100, 100, 250).is_err());
        assert!(Region::from_bounds(100, 250, 300, 100).is_err());
    }

    #[test]
    fn test_region_validation() {
        assert!(Region::new(0, 0, 100, 100).is_valid());
        assert!(!Region::new(0, 0, 0, 100).is_valid());
        assert!(!Region::new(0, 0, 100, 0).is_valid());
    }

    #[test]
    fn test_region_edges() {
        let region = Region::new(100, 200, 300, 400);
        assert_eq!(region.x2(), 400);
        assert_eq!(region.y2(), 600);
    }

    #[test]
    fn test_fits_within_frame() {
        let region = Region::new(1490, 20, 400, 35);
        assert!(region.fits_within(1920, 1080));
        // Right edge past the frame
        assert!(!region.fits_within(1800, 1080));
        // Negative origin never fits
        assert!(!Region::new(-1, 0, 10, 10).fits_within(100, 100));
    }

    #[test]
    fn test_region_serialization() {
        let region = Region::new(360, 19, 1200, 800);
        let json = serde_json::to_string(&region).unwrap();
        let deserialized: Region = serde_json::from_str(&json).unwrap();
        assert_eq!(region, deserialized);
    }
}
