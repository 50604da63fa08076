//! Runs operations on independent tasks with bounded concurrency

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::app::compress_interactor::{CompressRequest, CompressResponse};
use crate::app::container::AppContainer;
use crate::app::inspect_interactor::ValidationReport;
use crate::app::split_interactor::{SplitRequest, SplitResponse};
use crate::domain::errors::DomainError;
use crate::domain::model::SizeEstimate;

/// One unit of work accepted by the dispatcher
#[derive(Debug, Clone)]
pub enum Operation {
    Split(SplitRequest),
    Compress(CompressRequest),
    Estimate(CompressRequest),
    Inspect(PathBuf),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Split(_) => "split",
            Operation::Compress(_) => "compress",
            Operation::Estimate(_) => "estimate",
            Operation::Inspect(_) => "inspect",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum OperationResult {
    Split(SplitResponse),
    Compress(CompressResponse),
    Estimate(SizeEstimate),
    Inspect(ValidationReport),
}

/// Each submitted operation runs on its own tokio task; at most
/// `max_concurrent` of them execute at once, the rest wait for a permit.
pub struct OperationDispatcher {
    container: Arc<dyn AppContainer>,
    permits: Arc<Semaphore>,
}

impl OperationDispatcher {
    pub fn new(container: Arc<dyn AppContainer>, max_concurrent: usize) -> Self {
        Self {
            container,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Permits not currently held by a running operation
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Refuse operations that have not started yet
    pub fn close(&self) {
        self.permits.close();
    }

    pub fn submit(&self, operation: Operation) -> JoinHandle<Result<OperationResult, DomainError>> {
        let container = Arc::clone(&self.container);
        let permits = Arc::clone(&self.permits);

        tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| DomainError::Closed)?;
            debug!(operation = operation.name(), "Operation started");
            execute(container.as_ref(), operation).await
        })
    }
}

async fn execute(
    container: &dyn AppContainer,
    operation: Operation,
) -> Result<OperationResult, DomainError> {
    match operation {
        Operation::Split(request) => container
            .split_interactor()
            .execute(request)
            .await
            .map(OperationResult::Split),
        Operation::Compress(request) => container
            .compress_interactor()
            .execute(request)
            .await
            .map(OperationResult::Compress),
        Operation::Estimate(request) => container
            .compress_interactor()
            .estimate(request)
            .await
            .map(OperationResult::Estimate),
        Operation::Inspect(path) => container
            .inspect_interactor()
            .inspect(&path)
            .await
            .map(OperationResult::Inspect),
    }
}
