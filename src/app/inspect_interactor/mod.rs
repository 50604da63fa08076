// Inspect interactor - Tool checks, media summaries and split previews

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::MediaEngine;

/// Result of validating a file as media
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub summary: Option<MediaSummary>,
}

/// Interactor for read-only inspection use cases
pub struct InspectInteractor {
    engine: Arc<MediaEngine>,
}

impl InspectInteractor {
    pub fn new(engine: Arc<MediaEngine>) -> Self {
        Self { engine }
    }

    pub async fn check_tools(&self) -> ToolStatus {
        self.engine.check_tools().await
    }

    /// Summarize a media file; invalid media is reported, not summarized
    pub async fn inspect(&self, path: &Path) -> Result<ValidationReport, DomainError> {
        if !self.engine.validate_media(path).await? {
            return Ok(ValidationReport {
                valid: false,
                summary: None,
            });
        }
        let summary = self.engine.summarize(path).await?;
        Ok(ValidationReport {
            valid: true,
            summary: Some(summary),
        })
    }

    pub async fn preview_split(&self, path: &Path, parts: usize) -> Result<SplitPreview, DomainError> {
        self.engine.preview_split(path, parts).await
    }
}
