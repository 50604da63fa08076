// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Coarse classification a caller uses to decide what to do with a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// A required external tool is missing; fall back or report unavailable
    ServiceUnavailable,
    /// The request itself is wrong; the caller must fix its input
    RejectedRequest,
    /// The operation hit a time budget; retrying may succeed
    Retryable,
    /// The operation failed for another reason
    Failed,
}

impl ErrorClass {
    /// Message prefix shown to end users for this class
    pub fn label(&self) -> &'static str {
        match self {
            ErrorClass::ServiceUnavailable => "Service unavailable",
            ErrorClass::RejectedRequest => "Request rejected",
            ErrorClass::Retryable => "Timed out, try again",
            ErrorClass::Failed => "Processing failed",
        }
    }

    /// Process exit code used by the command-line front end (sysexits values)
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorClass::ServiceUnavailable => 69,
            ErrorClass::RejectedRequest => 65,
            ErrorClass::Retryable => 75,
            ErrorClass::Failed => 1,
        }
    }
}

/// Domain-specific error types
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// Prober or transcoder binary cannot be executed
    #[error("{tool} is not installed or not on PATH")]
    ToolUnavailable { tool: String },

    /// Bad part count, preset, target size or unusable media
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Metadata query failed
    #[error("Failed to probe media: {reason}")]
    ProbeFailed { reason: String, timed_out: bool },

    /// Neither extraction strategy produced the given part (1-based)
    #[error("Failed to split video at part {index}")]
    ExtractionFailed { index: usize, timed_out: bool },

    /// Encoder run failed or left no output
    #[error("Video compression failed: {reason}")]
    CompressionFailed { reason: String, timed_out: bool },

    /// Computed video bitrate is below the playable floor
    #[error(
        "Target size too small: {video_bitrate_kbps:.1} kbps video bitrate is below the {floor_kbps} kbps floor"
    )]
    TargetTooSmall { video_bitrate_kbps: f64, floor_kbps: u32 },

    /// Filesystem operation failed
    #[error("Filesystem error: {0}")]
    Filesystem(String),

    /// Archive creation failed
    #[error("Archive error: {0}")]
    Archive(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// The dispatcher no longer accepts operations
    #[error("Not accepting new operations")]
    Closed,
}

impl DomainError {
    /// Whether the failure was caused by an expired time budget
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            DomainError::ProbeFailed { timed_out: true, .. }
                | DomainError::ExtractionFailed { timed_out: true, .. }
                | DomainError::CompressionFailed { timed_out: true, .. }
        )
    }

    pub fn class(&self) -> ErrorClass {
        if self.is_timeout() {
            return ErrorClass::Retryable;
        }
        match self {
            DomainError::ToolUnavailable { .. } | DomainError::Closed => {
                ErrorClass::ServiceUnavailable
            }
            DomainError::InvalidInput(_)
            | DomainError::TargetTooSmall { .. }
            | DomainError::Config(_) => ErrorClass::RejectedRequest,
            _ => ErrorClass::Failed,
        }
    }

    /// Full user-facing message including the class prefix
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.class().label(), self)
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Filesystem(err.to_string())
    }
}
