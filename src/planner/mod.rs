//! Extraction strategy and compression planning module

use serde::Serialize;

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::BitrateRules;

pub mod strategy;

pub use strategy::ExtractionStrategy;

/// Encoder parameters a compression request resolves to
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompressionPlan {
    /// Two passes at a fixed video bitrate
    TwoPass { video_bitrate_kbps: f64 },
    /// One constant-quality pass, optionally downscaled first
    ConstantQuality {
        crf: u8,
        scale_height: Option<TargetHeight>,
    },
}

/// Maps compression requests to encoder parameters
pub struct CompressionPlanner {
    audio_bitrate_kbps: u32,
    min_video_bitrate_kbps: u32,
}

impl CompressionPlanner {
    pub fn new(audio_bitrate_kbps: u32, min_video_bitrate_kbps: u32) -> Self {
        Self {
            audio_bitrate_kbps,
            min_video_bitrate_kbps,
        }
    }

    /// Resolve `request` for a source of `duration` seconds
    pub fn plan(
        &self,
        request: &CompressionRequest,
        duration: f64,
    ) -> Result<CompressionPlan, DomainError> {
        request.validate()?;
        ensure_positive_duration(duration)?;

        let plan = match *request {
            CompressionRequest::TargetSize { target_size_mb } => CompressionPlan::TwoPass {
                video_bitrate_kbps: BitrateRules::checked_video_bitrate_kbps(
                    target_size_mb,
                    duration,
                    self.audio_bitrate_kbps,
                    self.min_video_bitrate_kbps,
                )?,
            },
            CompressionRequest::Quality { preset } => CompressionPlan::ConstantQuality {
                crf: preset.crf(),
                scale_height: None,
            },
            CompressionRequest::Resolution { preset, height } => {
                CompressionPlan::ConstantQuality {
                    crf: preset.crf(),
                    scale_height: Some(height),
                }
            }
        };
        Ok(plan)
    }
}
