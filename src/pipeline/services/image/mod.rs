pub mod analysis;
pub mod preprocessing;

pub use analysis::{CupValidator, PalmLineExtractor, PipelineSettings, SymbolExtractor};
pub use preprocessing::{EdgeMap, Preprocessor};
