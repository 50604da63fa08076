//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::domain::errors::DomainError;
use crate::domain::model::{CompressionRequest, QualityPreset, TargetHeight, MAX_PARTS, MIN_PARTS};

fn parse_parts(s: &str) -> Result<usize, String> {
    clap_num::number_range(s, MIN_PARTS, MAX_PARTS)
}

/// Arguments for the info command
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,
}

/// Arguments for the split-preview command
#[derive(Args, Debug)]
pub struct SplitPreviewArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Number of equal parts (2-20)
    #[arg(short, long, value_parser = parse_parts)]
    pub parts: usize,
}

/// Arguments for the split command
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Number of equal parts (2-20)
    #[arg(short, long, value_parser = parse_parts)]
    pub parts: usize,

    /// Bundle the parts into a single ZIP archive
    #[arg(long)]
    pub zip: bool,
}

/// Compression mode
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Two-pass encode to a target file size
    TargetSize,
    /// Constant-quality encode
    Quality,
    /// Downscale, then constant-quality encode
    Resolution,
}

/// Arguments for the compress and estimate commands
#[derive(Args, Debug)]
pub struct CompressArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Compression mode
    #[arg(short, long, value_enum, default_value = "quality")]
    pub mode: ModeArg,

    /// Target size in MB (target-size mode)
    #[arg(long)]
    pub target_size_mb: Option<f64>,

    /// Quality preset: low, medium, high
    #[arg(long, default_value = "medium")]
    pub preset: String,

    /// Target height: 2160p, 1440p, 1080p, 720p, 480p, 360p (resolution mode)
    #[arg(long)]
    pub resolution: Option<String>,
}

impl CompressArgs {
    /// Resolve the flag combination into a compression request
    pub fn to_request(&self) -> Result<CompressionRequest, DomainError> {
        match self.mode {
            ModeArg::TargetSize => {
                let size = self.target_size_mb.ok_or_else(|| {
                    DomainError::InvalidInput("--target-size-mb is required for target-size mode".to_string())
                })?;
                CompressionRequest::target_size(size)
            }
            ModeArg::Quality => Ok(CompressionRequest::Quality {
                preset: self.preset.parse::<QualityPreset>()?,
            }),
            ModeArg::Resolution => {
                let height = self.resolution.as_deref().ok_or_else(|| {
                    DomainError::InvalidInput("--resolution is required for resolution mode".to_string())
                })?;
                Ok(CompressionRequest::Resolution {
                    preset: self.preset.parse::<QualityPreset>()?,
                    height: height.parse::<TargetHeight>()?,
                })
            }
        }
    }
}
