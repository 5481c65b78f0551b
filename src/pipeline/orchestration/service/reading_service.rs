use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::BoxFuture;
use tower::timeout::TimeoutLayer;
use tower::util::BoxService;
use tower::{BoxError, Service, ServiceBuilder};

use crate::error::AppError;
use crate::pipeline::orchestration::fortune_pipeline::FortunePipeline;
use crate::pipeline::orchestration::request::{ReadingRequest, ReadingResponse};

/// Runs pipeline requests on the blocking thread pool.
///
/// Errors are boxed so the service composes with `TimeoutLayer`.
#[derive(Debug, Clone)]
pub struct ReadingService {
    pipeline: Arc<FortunePipeline>,
}

impl ReadingService {
    pub fn new(pipeline: Arc<FortunePipeline>) -> Self {
        Self { pipeline }
    }
}

impl Service<ReadingRequest> for ReadingService {
    type Response = ReadingResponse;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ReadingRequest) -> Self::Future {
        let pipeline = self.pipeline.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || pipeline.handle(req))
                .await
                .map_err(|e| BoxError::from(AppError::Task(e.to_string())))
        })
    }
}

#[derive(Debug, Default)]
pub struct ReadingServiceBuilder {
    timeout: Option<Duration>,
}

impl ReadingServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self, pipeline: Arc<FortunePipeline>) -> BoxService<ReadingRequest, ReadingResponse, BoxError> {
        let service = ServiceBuilder::new()
            .option_layer(self.timeout.map(TimeoutLayer::new))
            .service(ReadingService::new(pipeline));
        BoxService::new(service)
    }
}
