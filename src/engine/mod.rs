//! Core transcoding engine module
//!
//! [`MediaEngine`] is the facade the application layer talks to. It owns
//! the ports and per-deployment settings but no per-request state, so one
//! engine can serve any number of concurrent operations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config_initialization::{TimeoutConfig, ToolkitConfig};
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::{SizeEstimator, SplitPlanner};
use crate::output::OutputLayout;
use crate::planner::{CompressionPlan, CompressionPlanner};
use crate::ports::{FsPort, ProbePort, TranscodePort};

pub mod compressor;
pub mod copy;
pub mod extractor;
pub mod reencode;

pub use compressor::CompressionEngine;
pub use extractor::{SegmentExtractor, SplitTransaction};

/// Encoder parameters and budgets the engine runs with
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub audio_bitrate_kbps: u32,
    pub min_video_bitrate_kbps: u32,
    pub min_segment_bytes: u64,
    pub video_encoder: String,
    pub encoder_preset: String,
    pub audio_encoder: String,
    pub reencode_crf: u8,
    pub work_dir: PathBuf,
    pub timeouts: TimeoutConfig,
}

impl From<&ToolkitConfig> for EngineSettings {
    fn from(config: &ToolkitConfig) -> Self {
        Self {
            audio_bitrate_kbps: config.audio_bitrate_kbps,
            min_video_bitrate_kbps: config.min_video_bitrate_kbps,
            min_segment_bytes: config.min_segment_bytes,
            video_encoder: config.video_encoder.clone(),
            encoder_preset: config.encoder_preset.clone(),
            audio_encoder: config.audio_encoder.clone(),
            reencode_crf: config.reencode_crf,
            work_dir: config.work_dir.clone(),
            timeouts: config.timeouts.clone(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&ToolkitConfig::default())
    }
}

/// Seconds as passed to `-ss` and `-t`
pub(crate) fn seconds_arg(seconds: f64) -> String {
    format!("{:.3}", seconds)
}

/// Probe, plan, extract, compress and estimate
pub struct MediaEngine {
    probe: Arc<dyn ProbePort>,
    transcoder: Arc<dyn TranscodePort>,
    fs: Arc<dyn FsPort>,
    settings: EngineSettings,
}

impl MediaEngine {
    pub fn new(
        probe: Arc<dyn ProbePort>,
        transcoder: Arc<dyn TranscodePort>,
        fs: Arc<dyn FsPort>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            probe,
            transcoder,
            fs,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Availability of both external tools, checked concurrently
    pub async fn check_tools(&self) -> ToolStatus {
        let (ffmpeg, ffprobe) = tokio::join!(self.transcoder.is_available(), self.probe.is_available());
        let status = ToolStatus { ffmpeg, ffprobe };
        debug!(ffmpeg, ffprobe, "Tool availability");
        status
    }

    /// Fail with `ToolUnavailable` unless both tools can be executed
    pub async fn ensure_tools(&self) -> Result<(), DomainError> {
        match self.check_tools().await.first_missing() {
            Some(tool) => Err(DomainError::ToolUnavailable {
                tool: tool.name().to_string(),
            }),
            None => Ok(()),
        }
    }

    async fn require_file(&self, path: &Path) -> Result<u64, DomainError> {
        self.fs.file_size(path).await?.ok_or_else(|| {
            DomainError::InvalidInput(format!("file not found: {}", path.display()))
        })
    }

    pub async fn probe(&self, path: &Path) -> Result<MediaDescriptor, DomainError> {
        self.require_file(path).await?;
        self.probe.probe(path).await
    }

    pub async fn probe_duration(&self, path: &Path) -> Result<f64, DomainError> {
        self.require_file(path).await?;
        self.probe.probe_duration(path).await
    }

    pub async fn summarize(&self, path: &Path) -> Result<MediaSummary, DomainError> {
        let descriptor = self.probe(path).await?;
        Ok(MediaSummary::new(path, &descriptor))
    }

    /// Whether `path` exists and reports a positive duration
    ///
    /// A missing prober is still an error; any other probe failure means
    /// the file is not usable media.
    pub async fn validate_media(&self, path: &Path) -> Result<bool, DomainError> {
        if self.fs.file_size(path).await?.is_none() {
            return Ok(false);
        }
        match self.probe.probe_duration(path).await {
            Ok(duration) => Ok(ensure_positive_duration(duration).is_ok()),
            Err(e @ DomainError::ToolUnavailable { .. }) => Err(e),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Not valid media");
                Ok(false)
            }
        }
    }

    pub fn plan_split(&self, duration: f64, parts: usize) -> Result<SplitPlan, DomainError> {
        SplitPlanner::plan(duration, parts)
    }

    /// Plan a split of the file at `path` without extracting anything
    pub async fn preview_split(&self, path: &Path, parts: usize) -> Result<SplitPreview, DomainError> {
        let duration = self.probe_duration(path).await?;
        Ok(self.plan_split(duration, parts)?.preview())
    }

    /// Extract every range of `plan`; all-or-nothing
    pub async fn extract_segments(
        &self,
        source: &Path,
        plan: &SplitPlan,
        layout: &OutputLayout,
    ) -> Result<Vec<SegmentArtifact>, DomainError> {
        self.ensure_tools().await?;
        self.require_file(source).await?;
        SegmentExtractor::new(self.transcoder.as_ref(), self.fs.as_ref(), &self.settings)
            .extract(source, plan, layout)
            .await
    }

    /// Probe, plan and extract in one call
    pub async fn split(
        &self,
        source: &Path,
        parts: usize,
        layout: &OutputLayout,
    ) -> Result<Vec<SegmentArtifact>, DomainError> {
        self.ensure_tools().await?;
        let duration = self.probe_duration(source).await?;
        let plan = self.plan_split(duration, parts)?;
        SegmentExtractor::new(self.transcoder.as_ref(), self.fs.as_ref(), &self.settings)
            .extract(source, &plan, layout)
            .await
    }

    pub fn plan_compression(
        &self,
        request: &CompressionRequest,
        duration: f64,
    ) -> Result<CompressionPlan, DomainError> {
        CompressionPlanner::new(
            self.settings.audio_bitrate_kbps,
            self.settings.min_video_bitrate_kbps,
        )
        .plan(request, duration)
    }

    pub async fn compress(
        &self,
        source: &Path,
        request: &CompressionRequest,
        layout: &OutputLayout,
    ) -> Result<CompressionArtifact, DomainError> {
        request.validate()?;
        self.ensure_tools().await?;
        let duration = self.probe_duration(source).await?;
        let plan = self.plan_compression(request, duration)?;
        debug!(mode = request.mode_name(), ?plan, "Compression planned");
        CompressionEngine::new(self.transcoder.as_ref(), self.fs.as_ref(), &self.settings)
            .compress(source, &plan, layout)
            .await
    }

    /// Advisory output size; never invokes the encoder
    ///
    /// Every mode probes the source first, so a missing prober or a file
    /// that is not media fails here. Only an unknown current height falls
    /// back to a flat ratio.
    pub async fn estimate(
        &self,
        source: &Path,
        request: &CompressionRequest,
    ) -> Result<SizeEstimate, DomainError> {
        request.validate()?;
        let file_size = self.require_file(source).await?;
        let descriptor = self.probe.probe(source).await?;

        let size_bytes = match descriptor.size_bytes {
            0 => file_size,
            reported => reported,
        };
        let current_height = match request {
            CompressionRequest::Resolution { .. } => {
                let height = descriptor.known_height();
                if height.is_none() {
                    warn!("Current resolution unknown, using flat estimate");
                }
                height
            }
            _ => None,
        };

        SizeEstimator::estimate(size_bytes, current_height, request)
    }

    /// Size of the source file in bytes
    pub async fn source_size(&self, path: &Path) -> Result<u64, DomainError> {
        self.require_file(path).await
    }
}
