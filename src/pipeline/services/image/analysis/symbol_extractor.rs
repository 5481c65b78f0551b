use std::time::Instant;

use image::{imageops, GrayImage, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use tracing::debug;

use super::config::SymbolConfig;
use super::core::{DetectionResult, FeatureExtractor, ImageRegion};
use super::geometry::{circularity, enclosed_pixel_area, perimeter};
use crate::pipeline::services::image::preprocessing::Preprocessor;
use crate::pipeline::types::{Position, ShapeType, Size, SymbolCategory, SymbolRecord};

/// Finds residue shapes in a cup photo and classifies them by shape and
/// position.
#[derive(Debug, Clone)]
pub struct SymbolExtractor {
    config: SymbolConfig,
    preprocessor: Preprocessor,
}

impl SymbolExtractor {
    pub fn new(config: SymbolConfig) -> Self {
        let preprocessor = Preprocessor::new(config.preprocess.clone());
        Self {
            config,
            preprocessor,
        }
    }

    pub fn extract_symbols(&self, image: &RgbImage) -> Vec<SymbolRecord> {
        let size = self.config.analysis_size;
        let resized = imageops::resize(image, size, size, imageops::FilterType::Triangle);
        let edges = self.preprocessor.preprocess(&resized);
        self.symbols_from_mask(edges.as_image(), image.dimensions())
    }

    /// Classifies the external contours of a binary `mask`.
    ///
    /// Positions and sizes are mapped from mask coordinates onto an image of
    /// `source_dims`.
    pub fn symbols_from_mask(&self, mask: &GrayImage, source_dims: (u32, u32)) -> Vec<SymbolRecord> {
        let (width, height) = mask.dimensions();
        let min_area = (width as f64 * height as f64) * self.config.min_area_ratio;

        find_contours::<i32>(mask)
            .into_iter()
            .filter(is_external)
            .filter_map(|contour| {
                let area = enclosed_pixel_area(&contour.points);
                if area < min_area {
                    return None;
                }
                let bounds = ImageRegion::bounding(contour.points.iter().map(|p| (p.x, p.y)))?;
                let category = SymbolCategory::from_vertical_position(bounds.vertical_center_ratio(height));
                let shape_type = self.classify_shape(area, perimeter(&contour.points));
                let region = bounds.rescale((width, height), source_dims);
                Some(SymbolRecord {
                    shape_type,
                    category,
                    position: Position {
                        x: region.x,
                        y: region.y,
                    },
                    size: Size {
                        width: region.width,
                        height: region.height,
                    },
                })
            })
            .collect()
    }

    fn classify_shape(&self, area: f64, perimeter: f64) -> ShapeType {
        match circularity(area, perimeter) {
            None => ShapeType::Undetermined,
            Some(c) if c > self.config.round_min && c < self.config.round_max => ShapeType::Round,
            Some(c) if c < self.config.elongated_max => ShapeType::Elongated,
            Some(_) => ShapeType::Mixed,
        }
    }
}

fn is_external(contour: &Contour<i32>) -> bool {
    contour.border_type == BorderType::Outer && contour.parent.is_none()
}

impl FeatureExtractor for SymbolExtractor {
    type Record = SymbolRecord;

    fn extract(&self, image: &RgbImage) -> DetectionResult<Vec<SymbolRecord>> {
        let start = Instant::now();
        let symbols = self.extract_symbols(image);
        let count = |shape: ShapeType| symbols.iter().filter(|s| s.shape_type == shape).count();
        let reasoning = format!(
            "{} symbol(s): {} round, {} elongated, {} mixed",
            symbols.len(),
            count(ShapeType::Round),
            count(ShapeType::Elongated),
            count(ShapeType::Mixed)
        );
        debug!("{}", reasoning);
        DetectionResult::new(symbols, reasoning).with_timing(start)
    }

    fn name(&self) -> &'static str {
        "symbol_extractor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb};

    const MASK: u32 = 224;

    fn draw_disc(mask: &mut GrayImage, cx: i32, cy: i32, r: i32) {
        for y in (cy - r)..=(cy + r) {
            for x in (cx - r)..=(cx + r) {
                if (x - cx).pow(2) + (y - cy).pow(2) <= r * r {
                    mask.put_pixel(x as u32, y as u32, Luma([255]));
                }
            }
        }
    }

    fn draw_rect(mask: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }

    fn extractor() -> SymbolExtractor {
        SymbolExtractor::new(SymbolConfig::default())
    }

    #[test]
    fn filled_circle_is_round() {
        let mut mask = GrayImage::new(MASK, MASK);
        draw_disc(&mut mask, 112, 112, 40);
        let symbols = extractor().symbols_from_mask(&mask, (MASK, MASK));
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].shape_type, ShapeType::Round);
        assert_eq!(symbols[0].category, SymbolCategory::Love);
        assert_eq!(symbols[0].position, Position { x: 72, y: 72 });
        assert_eq!(
            symbols[0].size,
            Size {
                width: 81,
                height: 81
            }
        );
    }

    #[test]
    fn small_discs_above_noise_floor_are_round() {
        for radius in 5..=12 {
            let mut mask = GrayImage::new(MASK, MASK);
            draw_disc(&mut mask, 112, 112, radius);
            let shapes: Vec<_> = extractor()
                .symbols_from_mask(&mask, (MASK, MASK))
                .into_iter()
                .map(|s| s.shape_type)
                .collect();
            assert_eq!(shapes, vec![ShapeType::Round], "disc of radius {radius}");
        }
    }

    #[test]
    fn disc_below_noise_floor_is_dropped() {
        let mut mask = GrayImage::new(MASK, MASK);
        draw_disc(&mut mask, 112, 112, 4);
        assert!(extractor().symbols_from_mask(&mask, (MASK, MASK)).is_empty());
    }

    #[test]
    fn thin_bar_is_elongated() {
        let mut mask = GrayImage::new(MASK, MASK);
        draw_rect(&mut mask, 60, 110, 100, 4);
        let symbols = extractor().symbols_from_mask(&mask, (MASK, MASK));
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].shape_type, ShapeType::Elongated);
    }

    #[test]
    fn square_is_mixed() {
        let mut mask = GrayImage::new(MASK, MASK);
        draw_rect(&mut mask, 90, 90, 40, 40);
        let symbols = extractor().symbols_from_mask(&mask, (MASK, MASK));
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].shape_type, ShapeType::Mixed);
    }

    #[test]
    fn category_follows_vertical_position_only() {
        let mut mask = GrayImage::new(MASK, MASK);
        draw_disc(&mut mask, 40, 22, 15);
        draw_rect(&mut mask, 100, 110, 80, 4);
        draw_disc(&mut mask, 180, 202, 15);
        let categories: Vec<_> = extractor()
            .symbols_from_mask(&mask, (MASK, MASK))
            .into_iter()
            .map(|s| s.category)
            .collect();
        assert_eq!(
            categories,
            vec![SymbolCategory::Career, SymbolCategory::Love, SymbolCategory::Health]
        );
    }

    #[test]
    fn tiny_blobs_are_noise() {
        let mut mask = GrayImage::new(MASK, MASK);
        draw_rect(&mut mask, 10, 10, 5, 5);
        assert!(extractor().symbols_from_mask(&mask, (MASK, MASK)).is_empty());
    }

    #[test]
    fn holes_are_not_reported() {
        let mut mask = GrayImage::new(MASK, MASK);
        draw_disc(&mut mask, 112, 112, 60);
        for y in 82..142u32 {
            for x in 82..142u32 {
                mask.put_pixel(x, y, Luma([0]));
            }
        }
        let symbols = extractor().symbols_from_mask(&mask, (MASK, MASK));
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].shape_type, ShapeType::Round);
    }

    #[test]
    fn bounds_map_onto_source_image() {
        let mut mask = GrayImage::new(MASK, MASK);
        draw_rect(&mut mask, 56, 56, 56, 56);
        let symbols = extractor().symbols_from_mask(&mask, (448, 896));
        assert_eq!(symbols[0].position, Position { x: 112, y: 224 });
        assert_eq!(
            symbols[0].size,
            Size {
                width: 112,
                height: 224
            }
        );
    }

    #[test]
    fn dark_blot_in_photo_is_found() {
        let photo = ImageBuffer::from_fn(448, 448, |x, y| {
            let d = (x as f32 - 224.0).hypot(y as f32 - 224.0);
            if d < 80.0 {
                Rgb([30, 20, 10])
            } else {
                Rgb([220, 210, 200])
            }
        });
        let result = extractor().extract(&photo);
        assert!(!result.result.is_empty(), "{}", result.reasoning);
        assert!(result
            .result
            .iter()
            .any(|s| s.shape_type == ShapeType::Round && s.category == SymbolCategory::Love));
    }

    #[test]
    fn blank_photo_has_no_symbols() {
        let photo = ImageBuffer::from_pixel(300, 300, Rgb([200, 200, 200]));
        assert!(extractor().extract_symbols(&photo).is_empty());
    }
}
