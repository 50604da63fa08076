//! FFprobe adapter for media file probing
//!
//! This module provides FFprobe-based media file analysis capabilities.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::adapters::process_tokio::answers_version_query;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

impl FfprobeStream {
    fn is_kind(&self, wanted: &str) -> bool {
        self.codec_type.as_deref() == Some(wanted)
    }
}

/// FFprobe-based probe adapter
pub struct FfprobeAdapter {
    runner: Arc<dyn ProcessRunner>,
    program: PathBuf,
    probe_timeout: Duration,
    capability_timeout: Duration,
}

impl FfprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        program: PathBuf,
        probe_timeout: Duration,
        capability_timeout: Duration,
    ) -> Self {
        Self {
            runner,
            program,
            probe_timeout,
            capability_timeout,
        }
    }

    async fn run_probe(&self, args: Vec<String>) -> Result<EncodeOutcome, DomainError> {
        let outcome = self.runner.run(&self.program, &args, self.probe_timeout).await?;
        if outcome.timed_out() {
            return Err(DomainError::ProbeFailed {
                reason: format!("ffprobe {}", outcome.exit),
                timed_out: true,
            });
        }
        if !outcome.success {
            let detail = match outcome.stderr_tail() {
                "" => outcome.exit.to_string(),
                tail => tail.to_string(),
            };
            return Err(DomainError::ProbeFailed {
                reason: format!("failed to read media file: {}", detail),
                timed_out: false,
            });
        }
        Ok(outcome)
    }
}

/// Convert ffprobe's JSON dump into a descriptor
pub(crate) fn parse_probe_output(json: &str) -> Result<MediaDescriptor, DomainError> {
    let output: FfprobeOutput = serde_json::from_str(json).map_err(|e| DomainError::ProbeFailed {
        reason: format!("unparseable ffprobe output: {}", e),
        timed_out: false,
    })?;

    if output.streams.is_empty() {
        return Err(DomainError::ProbeFailed {
            reason: "file contains no streams".to_string(),
            timed_out: false,
        });
    }

    let duration_seconds = output
        .format
        .duration
        .as_deref()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0);
    let size_bytes = output
        .format
        .size
        .as_deref()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);

    let video = output.streams.iter().find(|s| s.is_kind("video"));
    let audio = output.streams.iter().find(|s| s.is_kind("audio"));

    Ok(MediaDescriptor {
        duration_seconds,
        size_bytes,
        video_codec: video
            .and_then(|s| s.codec_name.clone())
            .unwrap_or_else(|| "unknown".to_string()),
        audio_codec: audio.map(|s| s.codec_name.clone().unwrap_or_else(|| "unknown".to_string())),
        has_audio: audio.is_some(),
        width: video.and_then(|s| s.width).unwrap_or(0),
        height: video.and_then(|s| s.height).unwrap_or(0),
    })
}

/// Parse the bare number printed by a duration-only query
pub(crate) fn parse_duration_output(stdout: &str) -> Result<f64, DomainError> {
    stdout
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite())
        .ok_or_else(|| DomainError::ProbeFailed {
            reason: format!("unparseable duration '{}'", stdout.trim()),
            timed_out: false,
        })
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn probe(&self, path: &Path) -> Result<MediaDescriptor, DomainError> {
        info!("Probing media file: {}", path.display());
        let args = vec![
            "-v".to_string(),
            "quiet".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_format".to_string(),
            "-show_streams".to_string(),
            path.to_string_lossy().to_string(),
        ];
        let outcome = self.run_probe(args).await?;
        let descriptor = parse_probe_output(&outcome.stdout)?;
        debug!(
            duration = descriptor.duration_seconds,
            size = descriptor.size_bytes,
            video_codec = %descriptor.video_codec,
            resolution = %descriptor.resolution_label(),
            "Probe complete"
        );
        Ok(descriptor)
    }

    async fn probe_duration(&self, path: &Path) -> Result<f64, DomainError> {
        let args = vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            path.to_string_lossy().to_string(),
        ];
        let outcome = self.run_probe(args).await?;
        parse_duration_output(&outcome.stdout)
    }

    async fn is_available(&self) -> bool {
        answers_version_query(self.runner.as_ref(), &self.program, self.capability_timeout).await
    }
}
