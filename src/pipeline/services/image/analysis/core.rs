use image::RgbImage;
use std::time::Instant;

/// Result of a detection stage with a human-readable summary
#[derive(Debug, Clone)]
pub struct DetectionResult<T> {
    pub result: T,
    pub reasoning: String,
    pub processing_time_us: u64,
}

impl<T> DetectionResult<T> {
    pub fn new(result: T, reasoning: String) -> Self {
        Self {
            result,
            reasoning,
            processing_time_us: 0,
        }
    }

    pub fn with_timing(mut self, start_time: Instant) -> Self {
        self.processing_time_us = start_time.elapsed().as_micros() as u64;
        self
    }
}

/// Rectangular region of an image, e.g. a contour's bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ImageRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest region holding every point, inclusive of the extreme pixels.
    pub fn bounding(points: impl IntoIterator<Item = (i32, i32)>) -> Option<Self> {
        let mut points = points.into_iter();
        let (x0, y0) = points.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
        for (x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        let min_x = min_x.max(0);
        let min_y = min_y.max(0);
        Some(Self::new(
            min_x as u32,
            min_y as u32,
            (max_x - min_x + 1).max(0) as u32,
            (max_y - min_y + 1).max(0) as u32,
        ))
    }

    /// Vertical center as a fraction of `image_height`.
    pub fn vertical_center_ratio(&self, image_height: u32) -> f32 {
        if image_height == 0 {
            return 0.0;
        }
        (self.y as f32 + self.height as f32 / 2.0) / image_height as f32
    }

    /// Maps the region from an `from`-sized image onto a `to`-sized image,
    /// clamped to the target bounds.
    pub fn rescale(&self, from: (u32, u32), to: (u32, u32)) -> Self {
        let sx = to.0 as f32 / from.0.max(1) as f32;
        let sy = to.1 as f32 / from.1.max(1) as f32;
        let x = ((self.x as f32 * sx).floor() as u32).min(to.0.saturating_sub(1));
        let y = ((self.y as f32 * sy).floor() as u32).min(to.1.saturating_sub(1));
        let right = (((self.x + self.width) as f32 * sx).ceil() as u32).min(to.0);
        let bottom = (((self.y + self.height) as f32 * sy).ceil() as u32).min(to.1);
        Self::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
    }
}

/// Strategy for turning a photo into classified records
pub trait FeatureExtractor: Send + Sync {
    type Record;

    fn extract(&self, image: &RgbImage) -> DetectionResult<Vec<Self::Record>>;
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_includes_extreme_pixels() {
        let region = ImageRegion::bounding([(3, 4), (10, 4), (3, 9)]).unwrap();
        assert_eq!(region, ImageRegion::new(3, 4, 8, 6));
    }

    #[test]
    fn bounding_box_of_nothing_is_none() {
        assert!(ImageRegion::bounding(std::iter::empty()).is_none());
    }

    #[test]
    fn rescale_maps_onto_larger_image() {
        let region = ImageRegion::new(10, 20, 30, 40);
        let scaled = region.rescale((100, 100), (200, 400));
        assert_eq!(scaled, ImageRegion::new(20, 80, 60, 160));
    }

    #[test]
    fn rescale_clamps_to_target_bounds() {
        let region = ImageRegion::new(90, 90, 10, 10);
        let scaled = region.rescale((100, 100), (50, 50));
        assert_eq!(scaled, ImageRegion::new(45, 45, 5, 5));
    }

    #[test]
    fn vertical_center_ratio_uses_box_middle() {
        let region = ImageRegion::new(0, 40, 10, 20);
        assert!((region.vertical_center_ratio(100) - 0.5).abs() < 1e-6);
    }
}
