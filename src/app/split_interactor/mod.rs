// Split interactor - Orchestrates the split-into-parts use case

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::MediaEngine;
use crate::output::{OperationId, OutputLayout};
use crate::ports::*;

/// Split request
#[derive(Debug, Clone)]
pub struct SplitRequest {
    pub input: PathBuf,
    pub parts: usize,
    /// Bundle the parts into one ZIP and delete the loose files
    pub archive: bool,
}

/// Split response
#[derive(Debug, Clone, Serialize)]
pub struct SplitResponse {
    pub op_id: OperationId,
    pub num_parts: usize,
    /// Loose segment files; empty when they were archived
    pub segments: Vec<SegmentArtifact>,
    pub archive: Option<PathBuf>,
}

/// Interactor for the split use case
pub struct SplitInteractor {
    engine: Arc<MediaEngine>,
    archive_port: Arc<dyn ArchivePort>,
    fs_port: Arc<dyn FsPort>,
    output_dir: PathBuf,
}

impl SplitInteractor {
    /// Create new split interactor with injected ports
    pub fn new(
        engine: Arc<MediaEngine>,
        archive_port: Arc<dyn ArchivePort>,
        fs_port: Arc<dyn FsPort>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            engine,
            archive_port,
            fs_port,
            output_dir,
        }
    }

    /// Execute a split operation
    pub async fn execute(&self, request: SplitRequest) -> Result<SplitResponse, DomainError> {
        let op_id = OperationId::generate();
        let span = info_span!("split", op_id = %op_id, parts = request.parts);
        self.run(request, op_id).instrument(span).await
    }

    async fn run(&self, request: SplitRequest, op_id: OperationId) -> Result<SplitResponse, DomainError> {
        info!("Splitting {}", request.input.display());
        let layout = OutputLayout::new(&self.output_dir, op_id.clone());
        let segments = self.engine.split(&request.input, request.parts, &layout).await?;
        let num_parts = segments.len();

        if !request.archive {
            info!(num_parts, "Split complete");
            return Ok(SplitResponse {
                op_id,
                num_parts,
                segments,
                archive: None,
            });
        }

        let archive = self.bundle(&request, &layout, &segments).await;
        // Loose parts go away whether or not bundling worked
        for segment in &segments {
            if let Err(e) = self.fs_port.remove_file(&segment.path).await {
                warn!(index = segment.index, error = %e, "Could not remove bundled segment");
            }
        }
        let archive = archive?;

        info!(num_parts, archive = %archive.display(), "Split complete");
        Ok(SplitResponse {
            op_id,
            num_parts,
            segments: Vec::new(),
            archive: Some(archive),
        })
    }

    async fn bundle(
        &self,
        request: &SplitRequest,
        layout: &OutputLayout,
        segments: &[SegmentArtifact],
    ) -> Result<PathBuf, DomainError> {
        let files: Vec<PathBuf> = segments.iter().map(|s| s.path.clone()).collect();
        let destination = layout.archive_path(&request.input);
        let archiver = Arc::clone(&self.archive_port);

        tokio::task::spawn_blocking(move || archiver.bundle(&files, &destination))
            .await
            .map_err(|e| DomainError::Archive(format!("archive task failed: {}", e)))?
    }
}
