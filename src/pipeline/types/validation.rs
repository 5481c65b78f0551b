use serde::{Deserialize, Serialize};

use crate::error::{Feature, PipelineError};

/// Outcome of checking a coffee-cup photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    CupDetected,
    ImageUnreadable,
    TooSmall,
    NoCupDetected,
    NoGroundsDetected,
}

impl ValidationReason {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationReason::CupDetected => "coffee cup detected",
            ValidationReason::ImageUnreadable => "image unreadable",
            ValidationReason::TooSmall => "image too small (<200px on a side)",
            ValidationReason::NoCupDetected => "no cup detected",
            ValidationReason::NoGroundsDetected => "no grounds detected",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ValidationReason::CupDetected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub reason: ValidationReason,
    pub message: String,
}

impl ValidationResult {
    pub fn accepted() -> Self {
        ValidationReason::CupDetected.into()
    }
}

impl From<ValidationReason> for ValidationResult {
    fn from(reason: ValidationReason) -> Self {
        Self {
            ok: reason.is_ok(),
            reason,
            message: reason.message().to_string(),
        }
    }
}

impl From<&PipelineError> for ValidationResult {
    fn from(error: &PipelineError) -> Self {
        let reason = match error {
            PipelineError::Decode(_) => ValidationReason::ImageUnreadable,
            PipelineError::TooSmall { .. } => ValidationReason::TooSmall,
            PipelineError::NoFeatureDetected(Feature::Grounds) => ValidationReason::NoGroundsDetected,
            PipelineError::NoFeatureDetected(_) => ValidationReason::NoCupDetected,
        };
        reason.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cup_detected_is_ok() {
        assert!(ValidationResult::accepted().ok);
        assert!(!ValidationResult::from(ValidationReason::NoCupDetected).ok);
    }

    #[test]
    fn errors_map_to_reasons() {
        let too_small = PipelineError::TooSmall {
            width: 10,
            height: 10,
            min_side: 200,
        };
        assert_eq!(ValidationResult::from(&too_small).reason, ValidationReason::TooSmall);
        let grounds = PipelineError::NoFeatureDetected(Feature::Grounds);
        assert_eq!(
            ValidationResult::from(&grounds).message,
            "no grounds detected"
        );
    }

    #[test]
    fn serializes_reason_and_message() {
        let json = serde_json::to_value(ValidationResult::from(ValidationReason::TooSmall)).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["reason"], "too_small");
        assert_eq!(json["message"], "image too small (<200px on a side)");
    }
}
