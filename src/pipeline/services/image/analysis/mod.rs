pub mod circle_detector;
pub mod config;
pub mod core;
pub mod cup_validator;
pub mod geometry;
pub mod palm_line_extractor;
pub mod segment_detector;
pub mod symbol_extractor;

pub use circle_detector::{CircleDetector, CircleSearch, DetectedCircle};
pub use config::{
    ClaheConfig, DenoiseFilter, EdgeThresholds, InterpretationConfig, PalmConfig, PipelineSettings,
    PreprocessConfig, SegmentSearchConfig, SymbolConfig, ValidatorConfig,
};
pub use self::core::{DetectionResult, FeatureExtractor, ImageRegion};
pub use cup_validator::CupValidator;
pub use palm_line_extractor::PalmLineExtractor;
pub use segment_detector::{LineSegment, SegmentDetector};
pub use symbol_extractor::SymbolExtractor;
