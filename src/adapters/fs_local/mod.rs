// Local filesystem adapter

use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::ports::*;

/// Filesystem adapter over `tokio::fs`
#[derive(Debug, Clone, Default)]
pub struct LocalFsAdapter;

impl LocalFsAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FsPort for LocalFsAdapter {
    async fn file_size(&self, path: &Path) -> Result<Option<u64>, DomainError> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::Filesystem(format!(
                "cannot stat {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn remove_file(&self, path: &Path) -> Result<(), DomainError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Filesystem(format!(
                "cannot remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn create_dir_all(&self, path: &Path) -> Result<(), DomainError> {
        tokio::fs::create_dir_all(path).await.map_err(|e| {
            DomainError::Filesystem(format!("cannot create {}: {}", path.display(), e))
        })
    }
}
