use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
    #[error("Pipeline Error: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("Failed to read {1}: {0}")]
    Io(std::io::Error, PathBuf),
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Reading task failed: {0}")]
    Task(String),
    #[error("Reading service failed: {0}")]
    Service(String),
}

// Per-request error type. These never escape the pipeline facade: they are
// turned into rejected readings or fallback narratives.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Image could not be decoded: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Image is {width}x{height}px, both sides must be at least {min_side}px")]
    TooSmall {
        width: u32,
        height: u32,
        min_side: u32,
    },
    #[error("No {0} detected")]
    NoFeatureDetected(Feature),
}

/// Visual feature a detection stage looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Cup,
    Grounds,
    Symbol,
    PalmLine,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::Cup => "cup",
            Feature::Grounds => "grounds",
            Feature::Symbol => "symbol",
            Feature::PalmLine => "palm line",
        };
        f.write_str(name)
    }
}

// Startup error type. Any of these aborts initialization.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid settings: {0}")]
    Settings(String),
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Failed to read knowledge base {1}: {0}")]
    Io(std::io::Error, PathBuf),
    #[error("Malformed knowledge base: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Knowledge base entry {0} has no phrases")]
    EmptyPhrases(String),
}
