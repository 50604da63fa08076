//! FFmpeg execution adapter
//!
//! Runs fully built transcoder invocations through a [`ProcessRunner`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::adapters::process_tokio::answers_version_query;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// FFmpeg-based execution adapter
pub struct FfmpegAdapter {
    runner: Arc<dyn ProcessRunner>,
    program: PathBuf,
    capability_timeout: Duration,
}

impl FfmpegAdapter {
    /// Create new FFmpeg adapter
    pub fn new(runner: Arc<dyn ProcessRunner>, program: PathBuf, capability_timeout: Duration) -> Self {
        Self {
            runner,
            program,
            capability_timeout,
        }
    }
}

#[async_trait]
impl TranscodePort for FfmpegAdapter {
    async fn invoke(&self, invocation: &Invocation) -> Result<EncodeOutcome, DomainError> {
        if invocation.tool != Tool::Ffmpeg {
            return Err(DomainError::InvalidInput(format!(
                "ffmpeg adapter cannot run a {} invocation",
                invocation.tool
            )));
        }
        debug!(command = %invocation, "Invoking transcoder");
        self.runner
            .run(&self.program, &invocation.args, invocation.timeout)
            .await
    }

    async fn is_available(&self) -> bool {
        answers_version_query(self.runner.as_ref(), &self.program, self.capability_timeout).await
    }
}
