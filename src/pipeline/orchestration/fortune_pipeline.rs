use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};

use super::request::{ReadingRequest, ReadingResponse};
use crate::common::Photo;
use crate::error::{ConfigError, Feature, PipelineError};
use crate::pipeline::services::image::analysis::{FeatureExtractor, PipelineSettings};
use crate::pipeline::services::image::{CupValidator, PalmLineExtractor, SymbolExtractor};
use crate::pipeline::services::interpretation::{
    CoffeeInterpreter, KnowledgeBase, PalmInterpreter, RandomSource,
};
use crate::pipeline::types::{FortuneResult, Reading, Readings, UserContext, ValidationResult};

/// Runs the coffee and palm flows end to end.
///
/// Per-request failures never escape: they come back as rejected readings or
/// fallback narratives. The pipeline holds no mutable state and can be shared
/// across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct FortunePipeline {
    validator: CupValidator,
    symbols: SymbolExtractor,
    palm_lines: PalmLineExtractor,
    coffee: CoffeeInterpreter,
    palm: PalmInterpreter,
    random: RandomSource,
}

impl FortunePipeline {
    /// Fails with `ConfigError::Settings` when any stage's thresholds are invalid.
    pub fn new(settings: &PipelineSettings, knowledge: Arc<KnowledgeBase>) -> Result<Self, ConfigError> {
        settings.validate().map_err(ConfigError::Settings)?;
        Ok(Self {
            validator: CupValidator::new(settings.validator.clone()),
            symbols: SymbolExtractor::new(settings.symbols.clone()),
            palm_lines: PalmLineExtractor::new(settings.palm.clone()),
            coffee: CoffeeInterpreter::new(knowledge.clone(), settings.interpretation.senior_age),
            palm: PalmInterpreter::new(knowledge),
            random: RandomSource::from_seed(settings.interpretation.seed),
        })
    }

    pub fn validate_cup(&self, photo: &Photo) -> ValidationResult {
        let start = Instant::now();
        let result = self.validator.validate(photo.image());
        debug!(
            "Validated photo {} in {:?}: {}",
            photo.id(),
            start.elapsed(),
            result.message
        );
        result
    }

    pub fn read_coffee(&self, photo: &Photo, context: &UserContext) -> Reading {
        let start = Instant::now();
        let validation = self.validate_cup(photo);
        if !validation.ok {
            info!("Coffee reading for photo {} rejected: {}", photo.id(), validation.message);
            return Reading::Rejected(validation);
        }

        let detection = self.symbols.extract(photo.image());
        debug!(
            "{} on photo {}: {} ({}us)",
            self.symbols.name(),
            photo.id(),
            detection.reasoning,
            detection.processing_time_us
        );
        if detection.result.is_empty() {
            debug!("{}", PipelineError::NoFeatureDetected(Feature::Symbol));
        }

        let narrative = self.coffee.interpret(
            &detection.result,
            context.profile.as_ref(),
            context.mood,
            &mut self.random.rng(),
        );
        info!(
            "Coffee reading for photo {} completed with {} symbol(s) in {:?} ({}ms since intake)",
            photo.id(),
            detection.result.len(),
            start.elapsed(),
            (Utc::now() - photo.received_at()).num_milliseconds()
        );
        Reading::Completed(FortuneResult::new(narrative, Readings::Symbols(detection.result)))
    }

    pub fn read_palm(&self, photo: &Photo) -> Reading {
        let start = Instant::now();
        let detection = self.palm_lines.extract(photo.image());
        debug!(
            "{} on photo {}: {} ({}us)",
            self.palm_lines.name(),
            photo.id(),
            detection.reasoning,
            detection.processing_time_us
        );
        if detection.result.is_empty() {
            debug!("{}", PipelineError::NoFeatureDetected(Feature::PalmLine));
        }

        let narrative = self.palm.interpret(&detection.result, &mut self.random.rng());
        info!(
            "Palm reading for photo {} completed with {} line(s) in {:?} ({}ms since intake)",
            photo.id(),
            detection.result.len(),
            start.elapsed(),
            (Utc::now() - photo.received_at()).num_milliseconds()
        );
        Reading::Completed(FortuneResult::new(narrative, Readings::Lines(detection.result)))
    }

    pub fn daily_palm_tip(&self) -> String {
        self.palm.daily_tip(&mut self.random.rng())
    }

    /// Decodes the upload and dispatches the request.
    pub fn handle(&self, request: ReadingRequest) -> ReadingResponse {
        debug!("Handling {} request", request.kind());
        match request {
            ReadingRequest::ValidateCup { bytes } => ReadingResponse::Validation(
                decode(&bytes).map_or_else(|rejected| rejected, |photo| self.validate_cup(&photo)),
            ),
            ReadingRequest::Coffee { bytes, context } => ReadingResponse::Reading(match decode(&bytes) {
                Ok(photo) => self.read_coffee(&photo, &context),
                Err(rejected) => Reading::Rejected(rejected),
            }),
            ReadingRequest::Palm { bytes } => ReadingResponse::Reading(match decode(&bytes) {
                Ok(photo) => self.read_palm(&photo),
                Err(rejected) => Reading::Rejected(rejected),
            }),
            ReadingRequest::PalmTip => ReadingResponse::Tip {
                tip: self.daily_palm_tip(),
            },
        }
    }
}

fn decode(bytes: &[u8]) -> Result<Photo, ValidationResult> {
    Photo::decode(bytes).map_err(|error| {
        info!("Rejecting upload of {} bytes: {}", bytes.len(), error);
        ValidationResult::from(&error)
    })
}
