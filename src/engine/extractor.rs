//! Segment extraction with strategy fallback and all-or-nothing rollback

use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::engine::copy::stream_copy_invocation;
use crate::engine::reencode::reencode_segment_invocation;
use crate::engine::EngineSettings;
use crate::output::verifier::{ArtifactVerifier, Verdict};
use crate::output::OutputLayout;
use crate::planner::ExtractionStrategy;
use crate::ports::{FsPort, TranscodePort};

/// Segments produced so far by one split operation
///
/// Committing hands the artifacts to the caller. Rolling back, or dropping
/// the transaction without committing, deletes every recorded file.
#[derive(Debug, Default)]
pub struct SplitTransaction {
    artifacts: Vec<SegmentArtifact>,
}

impl SplitTransaction {
    pub fn begin() -> Self {
        Self::default()
    }

    pub fn record(&mut self, artifact: SegmentArtifact) {
        self.artifacts.push(artifact);
    }

    pub fn artifacts(&self) -> &[SegmentArtifact] {
        &self.artifacts
    }

    pub fn commit(mut self) -> Vec<SegmentArtifact> {
        std::mem::take(&mut self.artifacts)
    }

    pub async fn rollback(mut self, fs: &dyn FsPort) {
        for artifact in self.artifacts.drain(..) {
            if let Err(e) = fs.remove_file(&artifact.path).await {
                warn!(index = artifact.index, error = %e, "Could not remove segment during rollback");
            }
        }
    }
}

impl Drop for SplitTransaction {
    fn drop(&mut self) {
        // Only reached with artifacts when the operation future was dropped mid-split
        for artifact in self.artifacts.drain(..) {
            let _ = std::fs::remove_file(&artifact.path);
        }
    }
}

/// Cuts every range of a plan into its own file
pub struct SegmentExtractor<'a> {
    transcoder: &'a dyn TranscodePort,
    fs: &'a dyn FsPort,
    settings: &'a EngineSettings,
}

impl<'a> SegmentExtractor<'a> {
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

    /// Extract all ranges in order
    ///
    /// Fails with `ExtractionFailed` naming the first range neither strategy
    /// could produce; no segment of the plan is left on disk in that case.
    pub async fn extract(
        &self,
        source: &Path,
        plan: &SplitPlan,
        layout: &OutputLayout,
    ) -> Result<Vec<SegmentArtifact>, DomainError> {
        self.fs.create_dir_all(layout.dir()).await?;

        let mut tx = SplitTransaction::begin();
        for (i, range) in plan.ranges().iter().enumerate() {
            let index = i + 1;
            let output = layout.segment_path(source, index);
            match self.extract_range(source, range, index, &output).await {
                Ok(artifact) => tx.record(artifact),
                Err(e) => {
                    warn!(
                        index,
                        discarded = tx.artifacts().len(),
                        "Split aborted, rolling back earlier segments"
                    );
                    tx.rollback(self.fs).await;
                    return Err(e);
                }
            }
        }

        Ok(tx.commit())
    }

    fn invocation_for(
        &self,
        strategy: ExtractionStrategy,
        source: &Path,
        range: &TimeRange,
        output: &Path,
    ) -> Invocation {
        match strategy {
            ExtractionStrategy::StreamCopy => {
                stream_copy_invocation(source, range, output, self.settings.timeouts.segment())
            }
            ExtractionStrategy::Reencode => {
                reencode_segment_invocation(self.settings, source, range, output)
            }
        }
    }

    async fn extract_range(
        &self,
        source: &Path,
        range: &TimeRange,
        index: usize,
        output: &Path,
    ) -> Result<SegmentArtifact, DomainError> {
        let verifier = ArtifactVerifier::new(self.fs, self.settings.min_segment_bytes);
        let mut timed_out = false;

        for strategy in ExtractionStrategy::LADDER {
            let invocation = self.invocation_for(strategy, source, range, output);
            let started = Instant::now();

            let outcome = match self.transcoder.invoke(&invocation).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    verifier.discard(output).await;
                    return Err(e);
                }
            };

            match verifier.verify(&outcome, output).await? {
                Verdict::Accepted { size_bytes } => {
                    info!(
                        index,
                        %strategy,
                        %range,
                        size_bytes,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Segment extracted"
                    );
                    return Ok(SegmentArtifact {
                        index,
                        path: output.to_path_buf(),
                    });
                }
                Verdict::Rejected {
                    reason,
                    timed_out: attempt_timed_out,
                } => {
                    timed_out |= attempt_timed_out;
                    warn!(index, %strategy, %reason, "Extraction strategy failed");
                }
            }
        }

        Err(DomainError::ExtractionFailed { index, timed_out })
    }
}
