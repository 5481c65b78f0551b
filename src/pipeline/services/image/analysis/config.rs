use serde::{Deserialize, Serialize};

/// Tunable thresholds for every stage of the photo pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub validator: ValidatorConfig,
    pub symbols: SymbolConfig,
    pub palm: PalmConfig,
    pub interpretation: InterpretationConfig,
}

/// Noise filter applied right after grayscale conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DenoiseFilter {
    None,
    Median { radius: u32 },
    Gaussian { sigma: f32 },
}

/// Tile-based histogram equalization parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaheConfig {
    /// Number of tiles along each axis.
    pub tiles: u32,
    /// Histogram bins are clipped at `clip_limit * tile_area / 256`.
    pub clip_limit: f32,
}

/// Low/high hysteresis pair for the edge detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeThresholds {
    pub low: f32,
    pub high: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub denoise: DenoiseFilter,
    /// Local contrast equalization, skipped when `None`.
    pub contrast: Option<ClaheConfig>,
    pub edges: EdgeThresholds,
    /// Square dilation radius applied to the edge map. 0 disables it.
    pub dilation_radius: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub preprocess: PreprocessConfig,
    /// Both image sides must be at least this long.
    pub min_side: u32,
    /// Photos are downscaled so their short side is at most this long before
    /// circle detection.
    pub analysis_max_side: u32,
    /// Minimum distance between two circle centers, in source pixels.
    pub min_center_distance: f32,
    /// Radius search window as fractions of the short side.
    pub min_radius_ratio: f32,
    pub max_radius_ratio: f32,
    /// Edge pixels with a weaker gradient magnitude do not vote.
    pub gradient_threshold: f32,
    /// Minimum accumulator votes for a circle center, and minimum edge
    /// support for its radius.
    pub vote_threshold: u32,
    /// At most this many center candidates are examined.
    pub max_center_candidates: usize,
    /// Interior disc radius as a fraction of the detected radius.
    pub interior_radius_ratio: f32,
    /// A cup interior brighter than this (0-255) holds no visible grounds.
    pub max_interior_brightness: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolConfig {
    pub preprocess: PreprocessConfig,
    /// Side of the square the photo is resized to before contour search.
    pub analysis_size: u32,
    /// Contours enclosing less than this fraction of the analysis area are noise.
    pub min_area_ratio: f64,
    /// Open interval of circularity classified as round.
    pub round_min: f64,
    pub round_max: f64,
    /// Circularity below this is elongated.
    pub elongated_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PalmConfig {
    pub preprocess: PreprocessConfig,
    pub segments: SegmentSearchConfig,
    /// Segments must be strictly longer than this to be classified.
    pub min_line_length: f32,
}

/// Probabilistic line-segment transform parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentSearchConfig {
    pub angle_step_degrees: f32,
    pub vote_threshold: u32,
    pub min_length: f32,
    pub max_gap: u32,
    /// Seed for the edge point visiting order.
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpretationConfig {
    /// Fixed seed for phrase selection. Unset means fresh entropy per call.
    pub seed: Option<u64>,
    /// Ages above this get the check-up phrase.
    pub senior_age: u32,
}

impl Default for ClaheConfig {
    fn default() -> Self {
        Self {
            tiles: 8,
            clip_limit: 2.0,
        }
    }
}

impl Default for EdgeThresholds {
    fn default() -> Self {
        Self {
            low: 50.0,
            high: 150.0,
        }
    }
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            denoise: DenoiseFilter::Median { radius: 1 },
            contrast: None,
            edges: EdgeThresholds::default(),
            dilation_radius: 0,
        }
    }
}

impl PreprocessConfig {
    /// Coffee residue: median denoise, CLAHE, 50/150 edges, 5x5 dilation.
    pub fn residue() -> Self {
        Self {
            denoise: DenoiseFilter::Median { radius: 1 },
            contrast: Some(ClaheConfig::default()),
            edges: EdgeThresholds::default(),
            dilation_radius: 2,
        }
    }

    /// Palm lines: 5x5 Gaussian blur, 100/200 edges.
    pub fn palm() -> Self {
        Self {
            denoise: DenoiseFilter::Gaussian { sigma: 1.1 },
            contrast: None,
            edges: EdgeThresholds {
                low: 100.0,
                high: 200.0,
            },
            dilation_radius: 0,
        }
    }

    pub fn with_dilation(mut self, radius: u8) -> Self {
        self.dilation_radius = radius;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.edges.low < 0.0 || self.edges.low > self.edges.high {
            return Err("Edge thresholds must satisfy 0 <= low <= high".to_string());
        }
        if let DenoiseFilter::Gaussian { sigma } = self.denoise {
            if sigma <= 0.0 {
                return Err("Gaussian sigma must be greater than 0".to_string());
            }
        }
        if let Some(contrast) = self.contrast {
            if contrast.tiles == 0 {
                return Err("CLAHE tile count must be greater than 0".to_string());
            }
            if contrast.clip_limit <= 0.0 {
                return Err("CLAHE clip limit must be greater than 0".to_string());
            }
        }
        Ok(())
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            preprocess: PreprocessConfig::default(),
            min_side: 200,
            analysis_max_side: 512,
            min_center_distance: 100.0,
            min_radius_ratio: 0.2,
            max_radius_ratio: 0.4,
            gradient_threshold: 50.0,
            vote_threshold: 30,
            max_center_candidates: 100,
            interior_radius_ratio: 0.8,
            max_interior_brightness: 180.0,
        }
    }
}

impl ValidatorConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.preprocess.validate()?;
        if self.min_side == 0 || self.analysis_max_side == 0 {
            return Err("Validator sizes must be greater than 0".to_string());
        }
        if self.min_radius_ratio <= 0.0 || self.min_radius_ratio > self.max_radius_ratio {
            return Err("Radius window must satisfy 0 < min <= max".to_string());
        }
        if !(0.0..=1.0).contains(&self.interior_radius_ratio) {
            return Err("Interior radius ratio must be between 0.0 and 1.0".to_string());
        }
        if self.max_center_candidates == 0 {
            return Err("At least one center candidate must be examined".to_string());
        }
        Ok(())
    }
}

impl Default for SymbolConfig {
    fn default() -> Self {
        Self {
            preprocess: PreprocessConfig::residue(),
            analysis_size: 224,
            min_area_ratio: 0.001,
            round_min: 0.85,
            round_max: 1.15,
            elongated_max: 0.6,
        }
    }
}

impl SymbolConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.preprocess.validate()?;
        if self.analysis_size == 0 {
            return Err("Analysis size must be greater than 0".to_string());
        }
        if !(0.0..1.0).contains(&self.min_area_ratio) {
            return Err("Minimum area ratio must be in [0.0, 1.0)".to_string());
        }
        if self.round_min >= self.round_max || self.elongated_max > self.round_min {
            return Err("Circularity bands must satisfy elongated <= round_min < round_max".to_string());
        }
        Ok(())
    }
}

impl Default for PalmConfig {
    fn default() -> Self {
        Self {
            preprocess: PreprocessConfig::palm(),
            segments: SegmentSearchConfig::default(),
            min_line_length: 200.0,
        }
    }
}

impl PalmConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.preprocess.validate()?;
        self.segments.validate()
    }
}

impl Default for SegmentSearchConfig {
    fn default() -> Self {
        Self {
            angle_step_degrees: 1.0,
            vote_threshold: 50,
            min_length: 100.0,
            max_gap: 10,
            seed: 0x5eed_f00d,
        }
    }
}

impl SegmentSearchConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.angle_step_degrees > 0.0 && self.angle_step_degrees <= 90.0) {
            return Err("Angle step must be in (0, 90] degrees".to_string());
        }
        if self.vote_threshold == 0 {
            return Err("Segment vote threshold must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for InterpretationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            senior_age: 50,
        }
    }
}

impl PipelineSettings {
    /// Validate every stage's parameters
    pub fn validate(&self) -> Result<(), String> {
        self.validator.validate()?;
        self.symbols.validate()?;
        self.palm.validate()
    }

    /// Pin phrase selection to a seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.interpretation.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PipelineSettings::default().validate().is_ok());
    }

    #[test]
    fn defaults_carry_reference_thresholds() {
        let settings = PipelineSettings::default();
        assert_eq!(settings.validator.min_side, 200);
        assert_eq!(settings.validator.max_interior_brightness, 180.0);
        assert_eq!(settings.symbols.analysis_size, 224);
        assert_eq!(settings.symbols.min_area_ratio, 0.001);
        assert_eq!(settings.palm.min_line_length, 200.0);
        assert_eq!(settings.palm.segments.vote_threshold, 50);
        assert_eq!(settings.palm.preprocess.edges.low, 100.0);
    }

    #[test]
    fn inverted_radius_window_is_rejected() {
        let mut settings = PipelineSettings::default();
        settings.validator.min_radius_ratio = 0.5;
        settings.validator.max_radius_ratio = 0.3;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn inverted_edge_thresholds_are_rejected() {
        let mut settings = PipelineSettings::default();
        settings.palm.preprocess.edges = EdgeThresholds {
            low: 250.0,
            high: 100.0,
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn overlapping_circularity_bands_are_rejected() {
        let mut settings = PipelineSettings::default();
        settings.symbols.elongated_max = 0.9;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn denoise_filter_deserializes_from_tagged_table() {
        let filter: DenoiseFilter =
            serde_json::from_str(r#"{"kind":"gaussian","sigma":1.5}"#).unwrap();
        assert_eq!(filter, DenoiseFilter::Gaussian { sigma: 1.5 });
    }
}
