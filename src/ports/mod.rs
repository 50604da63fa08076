// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for running an external program under a hard time limit
///
/// A non-zero exit is not an error: the outcome carries the exit
/// information and captured output for the caller to interpret. Only a
/// failure to start the program at all is returned as `Err`.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        timeout: Duration,
    ) -> Result<EncodeOutcome, DomainError>;
}

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Full structured metadata for a file
    async fn probe(&self, path: &Path) -> Result<MediaDescriptor, DomainError>;

    /// Container duration in seconds only
    async fn probe_duration(&self, path: &Path) -> Result<f64, DomainError>;

    /// Whether the prober can be executed; never touches any media file
    async fn is_available(&self) -> bool;
}

/// Port for transcoder invocations
#[async_trait]
pub trait TranscodePort: Send + Sync {
    /// Run one fully built invocation
    async fn invoke(&self, invocation: &Invocation) -> Result<EncodeOutcome, DomainError>;

    /// Whether the transcoder can be executed
    async fn is_available(&self) -> bool;
}

/// Port for the filesystem operations the engine relies on
#[async_trait]
pub trait FsPort: Send + Sync {
    /// Size of a regular file, `None` when it does not exist
    async fn file_size(&self, path: &Path) -> Result<Option<u64>, DomainError>;

    /// Delete a file; a missing file is not an error
    async fn remove_file(&self, path: &Path) -> Result<(), DomainError>;

    /// Create a directory and all missing parents
    async fn create_dir_all(&self, path: &Path) -> Result<(), DomainError>;
}

/// Port for bundling several outputs into one downloadable file
pub trait ArchivePort: Send + Sync {
    /// Write `files` into a new archive at `destination`
    fn bundle(&self, files: &[PathBuf], destination: &Path) -> Result<PathBuf, DomainError>;
}

/// Port for configuration loading
pub trait ConfigPort: Send + Sync {
    /// Load the file-level configuration layer
    fn load(&self) -> Result<crate::config_initialization::ToolkitConfig, DomainError>;

    /// Location the configuration was or would be read from
    fn source(&self) -> Option<PathBuf>;
}
