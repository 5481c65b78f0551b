mod cli;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tower::ServiceExt;
use tracing::{info, Level};

use fal_vision::pipeline::orchestration::ReadingServiceBuilder;
use fal_vision::{AppError, Configuration, FortunePipeline, ReadingRequest};

use crate::cli::{Cli, Command};

fn init_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_upload(path: &Path) -> Result<Vec<u8>, AppError> {
    std::fs::read(path).map_err(|e| AppError::Io(e, path.to_path_buf()))
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let mut configuration = Configuration::load(cli.config.as_deref())?;
    if let Some(path) = cli.knowledge_base {
        configuration.knowledge_base_path = Some(path);
    }
    if let Some(seed) = cli.seed {
        configuration.pipeline = configuration.pipeline.with_seed(seed);
    }
    init_logging(configuration.log_level());

    let knowledge = Arc::new(configuration.knowledge_base()?);
    let pipeline = Arc::new(FortunePipeline::new(&configuration.pipeline, knowledge)?);

    let mut builder = ReadingServiceBuilder::new();
    if let Some(timeout) = configuration.request_timeout() {
        builder = builder.timeout(timeout);
    }
    let service = builder.build(pipeline);

    let request = match cli.command {
        Command::Validate { image } => ReadingRequest::ValidateCup {
            bytes: read_upload(&image)?,
        },
        Command::Coffee { image, context } => ReadingRequest::Coffee {
            bytes: read_upload(&image)?,
            context: context.into(),
        },
        Command::Palm { image } => ReadingRequest::Palm {
            bytes: read_upload(&image)?,
        },
        Command::Tip => ReadingRequest::PalmTip,
    };
    info!("Running {} request", request.kind());

    let response = service
        .oneshot(request)
        .await
        .map_err(|e| AppError::Service(e.to_string()))?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
