use std::time::Instant;

use image::RgbImage;
use tracing::debug;

use super::config::PalmConfig;
use super::core::{DetectionResult, FeatureExtractor};
use super::segment_detector::SegmentDetector;
use crate::pipeline::services::image::preprocessing::{EdgeMap, Preprocessor};
use crate::pipeline::types::{LineRecord, PalmLine};

/// Finds long straight creases in a palm photo and names them by angle.
#[derive(Debug, Clone)]
pub struct PalmLineExtractor {
    config: PalmConfig,
    preprocessor: Preprocessor,
    detector: SegmentDetector,
}

impl PalmLineExtractor {
    pub fn new(config: PalmConfig) -> Self {
        let preprocessor = Preprocessor::new(config.preprocess.clone());
        let detector = SegmentDetector::new(config.segments.clone());
        Self {
            config,
            preprocessor,
            detector,
        }
    }

    pub fn extract_lines(&self, image: &RgbImage) -> Vec<LineRecord> {
        self.lines_from_edges(&self.preprocessor.preprocess(image))
    }

    pub fn lines_from_edges(&self, edges: &EdgeMap) -> Vec<LineRecord> {
        let segments = self.detector.detect(edges);
        debug!("Palm edge map produced {} segment(s)", segments.len());
        segments
            .iter()
            .filter(|segment| segment.length() > self.config.min_line_length)
            .map(|segment| LineRecord::from(PalmLine::from_angle(segment.angle_degrees())))
            .collect()
    }
}

impl FeatureExtractor for PalmLineExtractor {
    type Record = LineRecord;

    fn extract(&self, image: &RgbImage) -> DetectionResult<Vec<LineRecord>> {
        let start = Instant::now();
        let lines = self.extract_lines(image);
        let reasoning = match lines.len() {
            0 => "no line longer than the minimum length".to_string(),
            n => format!(
                "{} line(s): {}",
                n,
                lines
                    .iter()
                    .map(|line| line.category.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };
        DetectionResult::new(lines, reasoning).with_timing(start)
    }

    fn name(&self) -> &'static str {
        "palm_line_extractor"
    }
}
