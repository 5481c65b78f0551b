pub mod common;
pub mod config;
pub mod error;
pub mod pipeline;

pub use common::Photo;
pub use config::Configuration;
pub use error::{AppError, ConfigError, PipelineError};
pub use pipeline::{
    FortunePipeline, KnowledgeBase, PipelineSettings, Reading, ReadingRequest, ReadingResponse,
    ReadingService,
};
