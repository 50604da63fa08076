//! ZIP archive adapter

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::domain::errors::*;
use crate::ports::*;

/// Bundles files into a deflate-compressed ZIP
#[derive(Debug, Clone, Default)]
pub struct ZipArchiveAdapter;

impl ZipArchiveAdapter {
    pub fn new() -> Self {
        Self
    }

    fn write_archive(files: &[PathBuf], destination: &Path) -> Result<(), DomainError> {
        let archive_err = |e: zip::result::ZipError| DomainError::Archive(e.to_string());

        let out = File::create(destination)?;
        let mut writer = ZipWriter::new(out);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for file in files {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .ok_or_else(|| {
                    DomainError::Archive(format!("{} has no file name", file.display()))
                })?;
            writer.start_file(name, options).map_err(archive_err)?;
            let mut input = File::open(file)?;
            io::copy(&mut input, &mut writer)?;
        }

        writer.finish().map_err(archive_err)?;
        Ok(())
    }
}

impl ArchivePort for ZipArchiveAdapter {
    fn bundle(&self, files: &[PathBuf], destination: &Path) -> Result<PathBuf, DomainError> {
        if files.is_empty() {
            return Err(DomainError::Archive("nothing to archive".to_string()));
        }

        if let Err(e) = Self::write_archive(files, destination) {
            let _ = std::fs::remove_file(destination);
            return Err(e);
        }

        info!(
            archive = %destination.display(),
            entries = files.len(),
            "Archive written"
        );
        Ok(destination.to_path_buf())
    }
}
