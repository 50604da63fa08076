// Compress interactor - Orchestrates compression and size estimation

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, info_span, Instrument};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::MediaEngine;
use crate::output::{OperationId, OutputLayout};

/// Compress request
#[derive(Debug, Clone)]
pub struct CompressRequest {
    pub input: PathBuf,
    pub request: CompressionRequest,
}

/// Compress response
#[derive(Debug, Clone, Serialize)]
pub struct CompressResponse {
    pub op_id: OperationId,
    pub output: PathBuf,
    pub original_size: u64,
    pub compressed_size: u64,
    pub reduction_percent: f64,
}

/// Interactor for compression and estimate use cases
pub struct CompressInteractor {
    engine: Arc<MediaEngine>,
    output_dir: PathBuf,
}

impl CompressInteractor {
    pub fn new(engine: Arc<MediaEngine>, output_dir: PathBuf) -> Self {
        Self { engine, output_dir }
    }

    /// Execute a compression
    pub async fn execute(&self, request: CompressRequest) -> Result<CompressResponse, DomainError> {
        let op_id = OperationId::generate();
        let span = info_span!(
            "compress",
            op_id = %op_id,
            mode = request.request.mode_name()
        );

        async {
            info!("Compressing {}", request.input.display());
            let original_size = self.engine.source_size(&request.input).await?;
            let layout = OutputLayout::new(&self.output_dir, op_id.clone());
            let artifact = self
                .engine
                .compress(&request.input, &request.request, &layout)
                .await?;

            Ok::<_, DomainError>(CompressResponse {
                op_id: op_id.clone(),
                reduction_percent: reduction_percent(original_size, artifact.size_bytes),
                original_size,
                compressed_size: artifact.size_bytes,
                output: artifact.path,
            })
        }
        .instrument(span)
        .await
    }

    /// Estimate a compression without running it
    pub async fn estimate(&self, request: CompressRequest) -> Result<SizeEstimate, DomainError> {
        self.engine.estimate(&request.input, &request.request).await
    }
}

/// Size reduction in percent, one decimal
fn reduction_percent(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    let percent = (original as f64 - compressed as f64) / original as f64 * 100.0;
    (percent * 10.0).round() / 10.0
}
