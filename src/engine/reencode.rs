//! Re-encoding invocations for segment fallback and compression

use std::path::{Path, PathBuf};

use crate::domain::model::*;
use crate::engine::{seconds_arg, EngineSettings};

/// Sink for the analysis pass, which writes no media
#[cfg(windows)]
pub const NULL_SINK: &str = "NUL";
#[cfg(not(windows))]
pub const NULL_SINK: &str = "/dev/null";

fn video_args(invocation: Invocation, settings: &EngineSettings) -> Invocation {
    invocation
        .arg("-c:v")
        .arg(settings.video_encoder.as_str())
        .arg("-preset")
        .arg(settings.encoder_preset.as_str())
}

fn audio_args(invocation: Invocation, settings: &EngineSettings) -> Invocation {
    invocation
        .arg("-c:a")
        .arg(settings.audio_encoder.as_str())
        .arg("-b:a")
        .arg(format!("{}k", settings.audio_bitrate_kbps))
}

/// Re-encode `range` of `source`; used when stream copy fails
pub fn reencode_segment_invocation(
    settings: &EngineSettings,
    source: &Path,
    range: &TimeRange,
    output: &Path,
) -> Invocation {
    let inv = Invocation::new(Tool::Ffmpeg, settings.timeouts.segment())
        .arg("-y")
        .arg("-i")
        .path_arg(source)
        .arg("-ss")
        .arg(seconds_arg(range.start))
        .arg("-t")
        .arg(seconds_arg(range.duration()));
    let inv = video_args(inv, settings)
        .arg("-crf")
        .arg(settings.reencode_crf.to_string());
    audio_args(inv, settings).path_arg(output)
}

/// Single constant-quality pass, downscaled to `scale_height` when set
///
/// The width is derived from the aspect ratio and forced even.
pub fn constant_quality_invocation(
    settings: &EngineSettings,
    source: &Path,
    output: &Path,
    crf: u8,
    scale_height: Option<TargetHeight>,
) -> Invocation {
    let mut inv = Invocation::new(Tool::Ffmpeg, settings.timeouts.compression())
        .arg("-y")
        .arg("-i")
        .path_arg(source);
    if let Some(height) = scale_height {
        inv = inv.arg("-vf").arg(format!("scale=-2:{}", height.pixels()));
    }
    let inv = video_args(inv, settings).arg("-crf").arg(crf.to_string());
    audio_args(inv, settings).path_arg(output)
}

fn bitrate_arg(video_bitrate_kbps: f64) -> String {
    format!("{}k", video_bitrate_kbps.trunc() as u64)
}

/// Analysis pass: no audio, media discarded, statistics written to `passlog`
pub fn first_pass_invocation(
    settings: &EngineSettings,
    source: &Path,
    video_bitrate_kbps: f64,
    passlog: &Path,
) -> Invocation {
    let inv = Invocation::new(Tool::Ffmpeg, settings.timeouts.compression())
        .arg("-y")
        .arg("-i")
        .path_arg(source);
    video_args(inv, settings)
        .arg("-b:v")
        .arg(bitrate_arg(video_bitrate_kbps))
        .args(["-pass", "1", "-passlogfile"])
        .path_arg(passlog)
        .args(["-an", "-f", "null", NULL_SINK])
}

/// Final pass reading the statistics written by the first
pub fn second_pass_invocation(
    settings: &EngineSettings,
    source: &Path,
    video_bitrate_kbps: f64,
    passlog: &Path,
    output: &Path,
) -> Invocation {
    let inv = Invocation::new(Tool::Ffmpeg, settings.timeouts.compression())
        .arg("-y")
        .arg("-i")
        .path_arg(source);
    let inv = video_args(inv, settings)
        .arg("-b:v")
        .arg(bitrate_arg(video_bitrate_kbps))
        .args(["-pass", "2", "-passlogfile"])
        .path_arg(passlog);
    audio_args(inv, settings).path_arg(output)
}

/// Statistics file the first pass leaves behind for `passlog`
pub fn stats_log_path(passlog: &Path) -> PathBuf {
    PathBuf::from(format!("{}-0.log", passlog.to_string_lossy()))
}
