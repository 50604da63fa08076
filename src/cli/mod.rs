//! CLI module for mtk
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::logging::LogFormat;

pub mod args;
pub mod commands;

/// Split and compress videos by driving ffmpeg
///
/// Splits a video into equal parts (with lossless stream copy where
/// possible) or compresses it to a target size, quality or resolution.
#[derive(Parser, Debug)]
#[command(name = "mtk")]
#[command(about = "Media toolkit - split and compress videos with ffmpeg")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: ./mtk.toml when present)
    #[arg(long, global = true, env = "MTK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Directory for generated files
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that ffmpeg and ffprobe can be executed
    Check,
    /// Show duration, size, codec and resolution of a video
    Info(args::InfoArgs),
    /// Show how a video would be split without writing anything
    SplitPreview(args::SplitPreviewArgs),
    /// Split a video into equal parts
    Split(args::SplitArgs),
    /// Compress a video
    Compress(args::CompressArgs),
    /// Estimate the size a compression would produce
    Estimate(args::CompressArgs),
}
