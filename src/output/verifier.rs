//! Output verification implementation
//!
//! An artifact is structurally valid when the producing process succeeded
//! and the file it wrote exists with more than a minimum number of bytes.
//! Rejected outputs are deleted before the verdict is returned.

use std::path::Path;

use tracing::{debug, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::EncodeOutcome;
use crate::ports::FsPort;

/// Result of checking one output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted { size_bytes: u64 },
    Rejected { reason: String, timed_out: bool },
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }
}

/// Output file verifier
pub struct ArtifactVerifier<'a> {
    fs: &'a dyn FsPort,
    min_bytes: u64,
}

impl<'a> ArtifactVerifier<'a> {
    /// Accept only files strictly larger than `min_bytes`
    pub fn new(fs: &'a dyn FsPort, min_bytes: u64) -> Self {
        Self { fs, min_bytes }
    }

    pub async fn verify(
        &self,
        outcome: &EncodeOutcome,
        output: &Path,
    ) -> Result<Verdict, DomainError> {
        let verdict = if !outcome.success {
            Verdict::Rejected {
                reason: outcome.failure_detail(),
                timed_out: outcome.timed_out(),
            }
        } else {
            let size = match self.fs.file_size(output).await {
                Ok(size) => size,
                Err(e) => {
                    self.discard(output).await;
                    return Err(e);
                }
            };
            match size {
                Some(size) if size > self.min_bytes => Verdict::Accepted { size_bytes: size },
                Some(size) => Verdict::Rejected {
                    reason: format!("output is only {} bytes", size),
                    timed_out: false,
                },
                None => Verdict::Rejected {
                    reason: "output file was not created".to_string(),
                    timed_out: false,
                },
            }
        };

        match &verdict {
            Verdict::Accepted { size_bytes } => {
                debug!(output = %output.display(), size_bytes, "Output verified");
            }
            Verdict::Rejected { reason, .. } => {
                warn!(output = %output.display(), %reason, "Output rejected");
                self.discard(output).await;
            }
        }
        Ok(verdict)
    }

    /// Best-effort removal of a file that must not survive
    pub async fn discard(&self, path: &Path) {
        if let Err(e) = self.fs.remove_file(path).await {
            warn!(path = %path.display(), error = %e, "Could not remove partial output");
        }
    }
}
