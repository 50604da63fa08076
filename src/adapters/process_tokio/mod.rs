//! Process runner backed by `tokio::process`
//!
//! Every invocation runs under a hard timeout. When the budget expires the
//! pending wait is dropped and `kill_on_drop` terminates the child, so a
//! timed-out process is never left running.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Runs external programs as child processes
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

fn program_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.to_string_lossy().to_string())
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        timeout: Duration,
    ) -> Result<EncodeOutcome, DomainError> {
        let name = program_name(program);
        let started = Instant::now();

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DomainError::ToolUnavailable { tool: name.clone() }
                } else {
                    DomainError::Filesystem(format!("failed to spawn {}: {}", name, e))
                }
            })?;

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let exit = match output.status.code() {
                    Some(code) => ExitInfo::Code(code),
                    None => ExitInfo::Terminated,
                };
                debug!(
                    tool = %name,
                    %exit,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Process finished"
                );
                Ok(EncodeOutcome::from_exit(
                    exit,
                    String::from_utf8_lossy(&output.stdout).to_string(),
                    String::from_utf8_lossy(&output.stderr).to_string(),
                ))
            }
            Ok(Err(e)) => Err(DomainError::Filesystem(format!(
                "I/O error waiting for {}: {}",
                name, e
            ))),
            Err(_elapsed) => {
                warn!(tool = %name, timeout_secs = timeout.as_secs(), "Process timed out and was killed");
                Ok(EncodeOutcome::from_exit(
                    ExitInfo::TimedOut(timeout),
                    String::new(),
                    String::new(),
                ))
            }
        }
    }
}

/// Resolve the binary to execute for `name`
///
/// An explicit path is used when it exists; otherwise `PATH` is searched.
/// When nothing is found the bare name is returned so that absence is
/// reported when the tool is actually used.
pub fn resolve_tool(configured: Option<&Path>, name: &str) -> PathBuf {
    if let Some(path) = configured {
        if path.exists() {
            return path.to_path_buf();
        }
        warn!("Configured {} path {} does not exist, searching PATH", name, path.display());
    }
    which::which(name).unwrap_or_else(|_| PathBuf::from(name))
}

/// Run `<program> -version` within `timeout`; any completed run counts
pub(crate) async fn answers_version_query(
    runner: &dyn ProcessRunner,
    program: &Path,
    timeout: Duration,
) -> bool {
    match runner.run(program, &["-version".to_string()], timeout).await {
        Ok(outcome) => !outcome.timed_out(),
        Err(_) => false,
    }
}
