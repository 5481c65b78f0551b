use std::time::Instant;

use image::{imageops, GrayImage, RgbImage};
use tracing::debug;

use super::circle_detector::{CircleDetector, CircleSearch, DetectedCircle};
use super::config::ValidatorConfig;
use crate::error::{Feature, PipelineError};
use crate::pipeline::services::image::preprocessing::Preprocessor;
use crate::pipeline::types::ValidationResult;

/// Decides whether a photo shows a coffee cup with grounds in it.
///
/// A cup rim shows up as a strong circle in the edge map. The photo passes
/// when at least one such circle encloses a dark enough interior.
#[derive(Debug, Clone)]
pub struct CupValidator {
    config: ValidatorConfig,
    preprocessor: Preprocessor,
}

impl CupValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        let preprocessor = Preprocessor::new(config.preprocess.clone());
        Self {
            config,
            preprocessor,
        }
    }

    pub fn validate(&self, image: &RgbImage) -> ValidationResult {
        match self.find_cup(image) {
            Ok(_) => ValidationResult::accepted(),
            Err(error) => {
                debug!("Cup validation rejected photo: {}", error);
                ValidationResult::from(&error)
            }
        }
    }

    /// Decodes `bytes` first; undecodable input is reported as unreadable.
    pub fn validate_bytes(&self, bytes: &[u8]) -> ValidationResult {
        match image::load_from_memory(bytes) {
            Ok(decoded) => self.validate(&decoded.to_rgb8()),
            Err(error) => ValidationResult::from(&PipelineError::Decode(error)),
        }
    }

    /// The first circle with a dark interior, in source image coordinates.
    pub fn find_cup(&self, image: &RgbImage) -> Result<DetectedCircle, PipelineError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        if width < self.config.min_side || height < self.config.min_side {
            return Err(PipelineError::TooSmall {
                width,
                height,
                min_side: self.config.min_side,
            });
        }

        let (analysis, scale) = self.analysis_image(image);
        let filtered = self.preprocessor.preprocess_contrast(&analysis);
        let edges = self.preprocessor.detect_edges(&filtered);

        let short_side = analysis.width().min(analysis.height()) as f32;
        let detector = CircleDetector::new(CircleSearch {
            min_radius: (short_side * self.config.min_radius_ratio).round() as u32,
            max_radius: (short_side * self.config.max_radius_ratio).round() as u32,
            min_center_distance: self.config.min_center_distance * scale,
            gradient_threshold: self.config.gradient_threshold,
            vote_threshold: self.config.vote_threshold,
            max_candidates: self.config.max_center_candidates,
        });
        let circles = detector.detect(&filtered, &edges);
        debug!(
            "Found {} circle(s) over {} edge pixels in {:?}",
            circles.len(),
            edges.edge_count(),
            start.elapsed()
        );
        if circles.is_empty() {
            return Err(PipelineError::NoFeatureDetected(Feature::Cup));
        }

        let gray = Preprocessor::grayscale(&analysis);
        circles
            .iter()
            .find(|circle| {
                let radius = circle.radius * self.config.interior_radius_ratio;
                disc_mean(&gray, circle.center, radius)
                    .is_some_and(|mean| mean <= self.config.max_interior_brightness)
            })
            .map(|circle| circle.scaled(1.0 / scale))
            .ok_or(PipelineError::NoFeatureDetected(Feature::Grounds))
    }

    /// Downscales large photos so the short side fits `analysis_max_side`.
    fn analysis_image(&self, image: &RgbImage) -> (RgbImage, f32) {
        let (width, height) = image.dimensions();
        let short_side = width.min(height);
        if short_side <= self.config.analysis_max_side {
            return (image.clone(), 1.0);
        }
        let scale = self.config.analysis_max_side as f32 / short_side as f32;
        let new_width = ((width as f32 * scale).round() as u32).max(1);
        let new_height = ((height as f32 * scale).round() as u32).max(1);
        let resized = imageops::resize(image, new_width, new_height, imageops::FilterType::Triangle);
        (resized, scale)
    }
}

/// Mean intensity inside the disc, `None` when it covers no pixel.
fn disc_mean(gray: &GrayImage, center: (f32, f32), radius: f32) -> Option<f32> {
    let (width, height) = gray.dimensions();
    let x0 = (center.0 - radius).floor().max(0.0) as u32;
    let y0 = (center.1 - radius).floor().max(0.0) as u32;
    let x1 = ((center.0 + radius).ceil().max(0.0) as u32).min(width.saturating_sub(1));
    let y1 = ((center.1 + radius).ceil().max(0.0) as u32).min(height.saturating_sub(1));
    let radius_sq = radius * radius;

    let mut sum = 0u64;
    let mut count = 0u64;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 - center.0;
            let dy = y as f32 - center.1;
            if dx * dx + dy * dy <= radius_sq {
                sum += gray.get_pixel(x, y)[0] as u64;
                count += 1;
            }
        }
    }
    (count > 0).then(|| sum as f32 / count as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::ValidationReason;
    use image::{ImageBuffer, Luma, Rgb};

    fn ring_photo(size: u32, radius: f32, ring: u8, background: u8) -> RgbImage {
        let c = size as f32 / 2.0;
        ImageBuffer::from_fn(size, size, |x, y| {
            let d = (x as f32 - c).hypot(y as f32 - c);
            if (d - radius).abs() < 4.0 {
                Rgb([ring, ring, ring])
            } else {
                Rgb([background, background, background])
            }
        })
    }

    fn validator() -> CupValidator {
        CupValidator::new(ValidatorConfig::default())
    }

    #[test]
    fn bright_ring_with_dark_interior_is_accepted() {
        let result = validator().validate(&ring_photo(300, 90.0, 240, 40));
        assert!(result.ok, "rejected with {:?}", result.reason);
        assert_eq!(result.reason, ValidationReason::CupDetected);
    }

    #[test]
    fn light_interior_has_no_grounds() {
        let result = validator().validate(&ring_photo(300, 90.0, 30, 220));
        assert!(!result.ok);
        assert_eq!(result.reason, ValidationReason::NoGroundsDetected);
    }

    #[test]
    fn small_photo_is_too_small() {
        let result = validator().validate(&ring_photo(150, 45.0, 240, 40));
        assert!(!result.ok);
        assert_eq!(result.reason, ValidationReason::TooSmall);

        let narrow = ImageBuffer::from_pixel(800, 199, Rgb([40, 40, 40]));
        assert_eq!(validator().validate(&narrow).reason, ValidationReason::TooSmall);
    }

    #[test]
    fn featureless_photo_has_no_cup() {
        let blank = ImageBuffer::from_pixel(300, 300, Rgb([90, 90, 90]));
        let result = validator().validate(&blank);
        assert_eq!(result.reason, ValidationReason::NoCupDetected);
        assert_eq!(result.message, "no cup detected");
    }

    #[test]
    fn garbage_bytes_are_unreadable() {
        let result = validator().validate_bytes(b"definitely not an image");
        assert!(!result.ok);
        assert_eq!(result.reason, ValidationReason::ImageUnreadable);
    }

    #[test]
    fn large_photo_circle_is_reported_in_source_pixels() {
        let circle = validator()
            .find_cup(&ring_photo(1024, 300.0, 240, 40))
            .expect("cup should be found");
        let err = (circle.center.0 - 512.0).hypot(circle.center.1 - 512.0);
        assert!(err < 12.0, "center {:?}", circle.center);
        assert!((circle.radius - 300.0).abs() < 25.0, "radius {}", circle.radius);
    }

    #[test]
    fn disc_mean_averages_inside_radius() {
        let gray = GrayImage::from_fn(21, 21, |x, _| Luma([if x < 10 { 0 } else { 200 }]));
        let mean = disc_mean(&gray, (10.0, 10.0), 0.5).unwrap();
        assert_eq!(mean, 200.0);
        assert!(disc_mean(&gray, (10.0, 10.0), 8.0).unwrap() > 90.0);
    }
}
