pub mod fortune_pipeline;
pub mod request;
pub mod service;

pub use fortune_pipeline::FortunePipeline;
pub use request::{ReadingRequest, ReadingResponse};
pub use service::{ReadingService, ReadingServiceBuilder};
