// Domain rules - Business logic and policies

use crate::domain::errors::*;
use crate::domain::model::*;


/// Business rules for dividing a file into equal parts
pub struct SplitPlanner;

impl SplitPlanner {
    /// Divide `[0, duration]` into `parts` equal, contiguous ranges
    ///
    /// Boundaries are plain floating-point multiples of `duration / parts`
    /// and are not snapped to frames. The last range ends at exactly
    /// `duration`.
    pub fn plan(duration: f64, parts: usize) -> Result<SplitPlan, DomainError> {
        if !(MIN_PARTS..=MAX_PARTS).contains(&parts) {
            return Err(DomainError::InvalidInput(format!(
                "number of parts must be between {} and {}, got {}",
                MIN_PARTS, MAX_PARTS, parts
            )));
        }
        ensure_positive_duration(duration)?;

        let part_duration = duration / parts as f64;
        let ranges = (0..parts)
            .map(|i| {
                let start = i as f64 * part_duration;
                let end = if i + 1 == parts {
                    duration
                } else {
                    (i + 1) as f64 * part_duration
                };
                TimeRange::new(start, end)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SplitPlan::from_ranges(duration, ranges))
    }
}

/// Business rules for bitrate-targeted encodes
pub struct BitrateRules;

impl BitrateRules {
    /// Video bitrate that makes `duration` seconds fit `target_size_mb`
    /// once `audio_bitrate_kbps` is reserved for audio
    pub fn video_bitrate_kbps(target_size_mb: f64, duration: f64, audio_bitrate_kbps: u32) -> f64 {
        (target_size_mb * 8192.0 / duration) - audio_bitrate_kbps as f64
    }

    /// Video bitrate for a target-size encode, refusing results below `floor_kbps`
    pub fn checked_video_bitrate_kbps(
        target_size_mb: f64,
        duration: f64,
        audio_bitrate_kbps: u32,
        floor_kbps: u32,
    ) -> Result<f64, DomainError> {
        CompressionRequest::target_size(target_size_mb)?;
        ensure_positive_duration(duration)?;

        let bitrate = Self::video_bitrate_kbps(target_size_mb, duration, audio_bitrate_kbps);
        if bitrate < floor_kbps as f64 {
            return Err(DomainError::TargetTooSmall {
                video_bitrate_kbps: bitrate,
                floor_kbps,
            });
        }
        Ok(bitrate)
    }
}

/// Flat multiplier used when the current resolution is unknown
const UNKNOWN_RESOLUTION_RATIO: f64 = 0.5;

/// Heuristic output-size estimates; never a contract
pub struct SizeEstimator;

impl SizeEstimator {
    /// Estimate the output of `request` for a file of `original_bytes`
    /// whose video height is `current_height` (if known)
    pub fn estimate(
        original_bytes: u64,
        current_height: Option<u32>,
        request: &CompressionRequest,
    ) -> Result<SizeEstimate, DomainError> {
        request.validate()?;
        let original_mb = bytes_to_mb(original_bytes);

        let estimated_mb = match *request {
            CompressionRequest::TargetSize { target_size_mb } => target_size_mb,
            CompressionRequest::Quality { preset } => original_mb * preset.size_ratio(),
            CompressionRequest::Resolution { preset, height } => match current_height {
                Some(current) if current > 0 => {
                    let scale = height.pixels() as f64 / current as f64;
                    original_mb * scale * scale * preset.size_ratio()
                }
                _ => original_mb * UNKNOWN_RESOLUTION_RATIO,
            },
        };

        let reduction = if original_mb > 0.0 {
            (original_mb - estimated_mb) / original_mb * 100.0
        } else {
            0.0
        };

        Ok(SizeEstimate {
            original_size_mb: round_to(original_mb, 2),
            estimated_size_mb: round_to(estimated_mb, 2),
            reduction_percent: round_to(reduction, 1),
        })
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
