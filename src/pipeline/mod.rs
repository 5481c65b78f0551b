pub mod orchestration;
pub mod services;
pub mod types;

pub use orchestration::{FortunePipeline, ReadingRequest, ReadingResponse, ReadingService};
pub use services::image::PipelineSettings;
pub use services::interpretation::KnowledgeBase;
pub use types::{FortuneResult, Reading, Readings, UserContext, ValidationResult};
