use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::ConfigError;
use crate::pipeline::services::image::PipelineSettings;
use crate::pipeline::services::interpretation::KnowledgeBase;

/// Prefix for environment overrides, e.g. `FAL__LOG_LEVEL=debug` or
/// `FAL__PIPELINE__VALIDATOR__MIN_SIDE=300`.
const ENV_PREFIX: &str = "FAL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub log_level: String,
    /// Phrase corpus to load instead of the embedded one.
    pub knowledge_base_path: Option<PathBuf>,
    /// Overall request timeout for the async service, 0 disables it.
    pub request_timeout_secs: u64,
    pub pipeline: PipelineSettings,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            knowledge_base_path: None,
            request_timeout_secs: 30,
            pipeline: PipelineSettings::default(),
        }
    }
}

impl Configuration {
    /// Defaults, overlaid by the optional file, overlaid by environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let configuration: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.log_level
            .parse::<Level>()
            .map_err(|_| ConfigError::Settings(format!("Unknown log level '{}'", self.log_level)))?;
        self.pipeline.validate().map_err(ConfigError::Settings)
    }

    pub fn log_level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Loads the configured corpus, or the embedded one when none is set.
    pub fn knowledge_base(&self) -> Result<KnowledgeBase, ConfigError> {
        match &self.knowledge_base_path {
            Some(path) => KnowledgeBase::load(path),
            None => KnowledgeBase::embedded(),
        }
    }
}
