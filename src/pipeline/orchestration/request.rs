use serde::Serialize;

use crate::pipeline::types::{Reading, UserContext, ValidationResult};

/// One unit of work for the reading pipeline, carrying raw upload bytes.
#[derive(Debug, Clone)]
pub enum ReadingRequest {
    ValidateCup { bytes: Vec<u8> },
    Coffee { bytes: Vec<u8>, context: UserContext },
    Palm { bytes: Vec<u8> },
    PalmTip,
}

impl ReadingRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            ReadingRequest::ValidateCup { .. } => "validate_cup",
            ReadingRequest::Coffee { .. } => "coffee",
            ReadingRequest::Palm { .. } => "palm",
            ReadingRequest::PalmTip => "palm_tip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReadingResponse {
    Validation(ValidationResult),
    Reading(Reading),
    Tip { tip: String },
}
