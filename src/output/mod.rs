//! Output naming and artifact verification module

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use crate::utils::path::{extension_or, file_stem};

pub mod verifier;

/// Short identifier prefixed to every path an operation writes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OperationId(String);

impl OperationId {
    /// First eight hex characters of a random v4 UUID
    pub fn generate() -> Self {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(8);
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where one operation writes its outputs
///
/// Paths from different operations never collide because each carries
/// its own [`OperationId`].
#[derive(Debug, Clone)]
pub struct OutputLayout {
    dir: PathBuf,
    op_id: OperationId,
}

impl OutputLayout {
    pub fn new(dir: impl Into<PathBuf>, op_id: OperationId) -> Self {
        Self {
            dir: dir.into(),
            op_id,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn op_id(&self) -> &OperationId {
        &self.op_id
    }

    /// `<op>_<stem>_part<index><ext>`
    pub fn segment_path(&self, source: &Path, index: usize) -> PathBuf {
        self.dir.join(format!(
            "{}_{}_part{}{}",
            self.op_id,
            file_stem(source),
            index,
            extension_or(source, ".mp4")
        ))
    }

    /// `<op>_<stem>_split.zip`
    pub fn archive_path(&self, source: &Path) -> PathBuf {
        self.dir
            .join(format!("{}_{}_split.zip", self.op_id, file_stem(source)))
    }

    /// `<op>_compressed_<stem>.mp4`
    pub fn compressed_path(&self, source: &Path) -> PathBuf {
        self.dir
            .join(format!("{}_compressed_{}.mp4", self.op_id, file_stem(source)))
    }

    /// Prefix for scratch directories owned by this operation
    pub fn scratch_prefix(&self) -> String {
        format!("{}_", self.op_id)
    }
}
