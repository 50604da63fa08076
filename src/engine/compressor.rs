//! Compression engine: constant-quality and two-pass target-size encodes

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::engine::reencode::{
    constant_quality_invocation, first_pass_invocation, second_pass_invocation, stats_log_path,
};
use crate::engine::EngineSettings;
use crate::output::verifier::{ArtifactVerifier, Verdict};
use crate::output::OutputLayout;
use crate::planner::CompressionPlan;
use crate::ports::{FsPort, TranscodePort};

/// Drives the encoder for one compression plan
pub struct CompressionEngine<'a> {
    transcoder: &'a dyn TranscodePort,
    fs: &'a dyn FsPort,
    settings: &'a EngineSettings,
}

impl<'a> CompressionEngine<'a> {
    pub fn new(
        transcoder: &'a dyn TranscodePort,
        fs: &'a dyn FsPort,
        settings: &'a EngineSettings,
    ) -> Self {
        Self {
            transcoder,
            fs,
            settings,
        }
    }

    fn verifier(&self) -> ArtifactVerifier<'_> {
        ArtifactVerifier::new(self.fs, 0)
    }

    /// Encode `source` into the layout's compressed path
    ///
    /// On any failure the output file is removed before returning.
    pub async fn compress(
        &self,
        source: &Path,
        plan: &CompressionPlan,
        layout: &OutputLayout,
    ) -> Result<CompressionArtifact, DomainError> {
        self.fs.create_dir_all(layout.dir()).await?;
        let output = layout.compressed_path(source);
        let started = Instant::now();

        let artifact = match *plan {
            CompressionPlan::TwoPass { video_bitrate_kbps } => {
                self.two_pass(source, video_bitrate_kbps, &output, layout).await?
            }
            CompressionPlan::ConstantQuality { crf, scale_height } => {
                let invocation =
                    constant_quality_invocation(self.settings, source, &output, crf, scale_height);
                let outcome = self.run(&invocation, &output).await?;
                self.finish(&outcome, &output).await?
            }
        };

        info!(
            output = %artifact.path.display(),
            size_bytes = artifact.size_bytes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Compression finished"
        );
        Ok(artifact)
    }

    async fn two_pass(
        &self,
        source: &Path,
        video_bitrate_kbps: f64,
        output: &Path,
        layout: &OutputLayout,
    ) -> Result<CompressionArtifact, DomainError> {
        self.fs.create_dir_all(&self.settings.work_dir).await?;
        // Removed with its pass logs when this scope ends
        let scratch = tempfile::Builder::new()
            .prefix(&layout.scratch_prefix())
            .tempdir_in(&self.settings.work_dir)
            .map_err(|e| {
                DomainError::Filesystem(format!(
                    "cannot create pass log directory in {}: {}",
                    self.settings.work_dir.display(),
                    e
                ))
            })?;
        let passlog = scratch.path().join("passlog");
        debug!(video_bitrate_kbps, passlog = %passlog.display(), "Starting two-pass encode");

        let first = first_pass_invocation(self.settings, source, video_bitrate_kbps, &passlog);
        let outcome = self.run(&first, output).await?;
        if !outcome.success {
            self.verifier().discard(output).await;
            return Err(DomainError::CompressionFailed {
                reason: format!("first pass failed ({})", outcome.failure_detail()),
                timed_out: outcome.timed_out(),
            });
        }

        let stats_log = match self.fs.file_size(&stats_log_path(&passlog)).await {
            Ok(size) => size,
            Err(e) => {
                self.verifier().discard(output).await;
                return Err(e);
            }
        };
        if stats_log.is_none() {
            self.verifier().discard(output).await;
            return Err(DomainError::CompressionFailed {
                reason: "first pass produced no statistics log".to_string(),
                timed_out: false,
            });
        }

        let second =
            second_pass_invocation(self.settings, source, video_bitrate_kbps, &passlog, output);
        let outcome = self.run(&second, output).await?;
        self.finish(&outcome, output).await
    }

    async fn run(&self, invocation: &Invocation, output: &Path) -> Result<EncodeOutcome, DomainError> {
        match self.transcoder.invoke(invocation).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.verifier().discard(output).await;
                Err(e)
            }
        }
    }

    async fn finish(
        &self,
        outcome: &EncodeOutcome,
        output: &Path,
    ) -> Result<CompressionArtifact, DomainError> {
        match self.verifier().verify(outcome, output).await? {
            Verdict::Accepted { size_bytes } => Ok(CompressionArtifact {
                path: output.to_path_buf(),
                size_bytes,
            }),
            Verdict::Rejected { reason, timed_out } => {
                warn!(%reason, "Compression output rejected");
                Err(DomainError::CompressionFailed { reason, timed_out })
            }
        }
    }
}

