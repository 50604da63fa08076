//! Media toolkit library
//!
//! Splits videos into equal parts and compresses them to a target size,
//! quality or resolution by driving the external `ffmpeg` and `ffprobe`
//! binaries. The engine builds invocations, enforces per-call timeouts,
//! validates outputs and cleans up after itself on every failure path.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod output;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use config_initialization::ToolkitConfig;
pub use domain::errors::{DomainError, ErrorClass};
pub use domain::model::{CompressionRequest, MediaDescriptor, QualityPreset, SplitPlan, TargetHeight};
pub use engine::{EngineSettings, MediaEngine};
