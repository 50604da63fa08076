// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::domain::errors::DomainError;
use crate::utils::time::format_duration;

#[cfg(test)]
mod tests;

/// Fewest parts a split may produce
pub const MIN_PARTS: usize = 2;
/// Most parts a split may produce
pub const MAX_PARTS: usize = 20;

/// Structured result of probing a media file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaDescriptor {
    pub duration_seconds: f64,
    pub size_bytes: u64,
    /// Codec of the first video stream, `"unknown"` when there is none
    pub video_codec: String,
    /// Codec of the first audio stream; `None` when the file has no audio
    pub audio_codec: Option<String>,
    pub has_audio: bool,
    pub width: u32,
    pub height: u32,
}

impl MediaDescriptor {
    /// `WxH`, or `unknown` when either dimension is missing
    pub fn resolution_label(&self) -> String {
        if self.width > 0 && self.height > 0 {
            format!("{}x{}", self.width, self.height)
        } else {
            "unknown".to_string()
        }
    }

    /// Height in pixels when the probe reported one
    pub fn known_height(&self) -> Option<u32> {
        (self.width > 0 && self.height > 0).then_some(self.height)
    }

    pub fn size_mb(&self) -> f64 {
        bytes_to_mb(self.size_bytes)
    }

    /// Reject descriptors that cannot drive a split or compression plan
    pub fn ensure_plannable(&self) -> Result<(), DomainError> {
        ensure_positive_duration(self.duration_seconds)
    }
}

/// Reject zero, negative or non-finite durations
pub fn ensure_positive_duration(duration_seconds: f64) -> Result<(), DomainError> {
    if duration_seconds.is_finite() && duration_seconds > 0.0 {
        Ok(())
    } else {
        Err(DomainError::InvalidInput(format!(
            "media has no usable duration ({})",
            duration_seconds
        )))
    }
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Display form of a probed file
#[derive(Debug, Clone, Serialize)]
pub struct MediaSummary {
    pub filename: String,
    pub duration: f64,
    pub duration_formatted: String,
    pub size: u64,
    pub video_codec: String,
    pub resolution: String,
}

impl MediaSummary {
    pub fn new(path: &Path, descriptor: &MediaDescriptor) -> Self {
        Self {
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            duration: descriptor.duration_seconds,
            duration_formatted: format_duration(descriptor.duration_seconds),
            size: descriptor.size_bytes,
            video_codec: descriptor.video_codec.clone(),
            resolution: descriptor.resolution_label(),
        }
    }
}

/// Half-open time interval in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    /// Create a range, requiring `0 <= start < end`
    pub fn new(start: f64, end: f64) -> Result<Self, DomainError> {
        if !(start.is_finite() && end.is_finite()) || start < 0.0 || start >= end {
            return Err(DomainError::InvalidInput(format!(
                "invalid time range {}..{}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}s, {:.3}s)", self.start, self.end)
    }
}

/// Ordered, contiguous ranges covering a whole file
///
/// Only the split planner constructs plans, so every plan holds between
/// [`MIN_PARTS`] and [`MAX_PARTS`] ranges whose union is `[0, duration]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPlan {
    duration: f64,
    ranges: Vec<TimeRange>,
}

impl SplitPlan {
    pub(crate) fn from_ranges(duration: f64, ranges: Vec<TimeRange>) -> Self {
        Self { duration, ranges }
    }

    pub fn ranges(&self) -> &[TimeRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Human-readable description of every part without touching any file
    pub fn preview(&self) -> SplitPreview {
        let parts = self
            .ranges
            .iter()
            .enumerate()
            .map(|(i, range)| PartPreview {
                part: i + 1,
                start: range.start,
                end: range.end,
                start_formatted: format_duration(range.start),
                end_formatted: format_duration(range.end),
                duration: range.duration(),
                duration_formatted: format_duration(range.duration()),
            })
            .collect();

        SplitPreview {
            total_duration: self.duration,
            total_duration_formatted: format_duration(self.duration),
            num_parts: self.ranges.len(),
            parts,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PartPreview {
    pub part: usize,
    pub start: f64,
    pub end: f64,
    pub start_formatted: String,
    pub end_formatted: String,
    pub duration: f64,
    pub duration_formatted: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitPreview {
    pub total_duration: f64,
    pub total_duration_formatted: String,
    pub num_parts: usize,
    pub parts: Vec<PartPreview>,
}

/// One extracted part of a split operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentArtifact {
    /// 1-based position in the plan
    pub index: usize,
    pub path: PathBuf,
}

/// Output of a successful compression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompressionArtifact {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Quality preset shared by quality and resolution modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    Medium,
    High,
}

impl QualityPreset {
    /// Constant rate factor; lower is higher quality
    pub fn crf(&self) -> u8 {
        match self {
            QualityPreset::Low => 28,
            QualityPreset::Medium => 23,
            QualityPreset::High => 18,
        }
    }

    /// Typical output/input size ratio used for estimates
    pub fn size_ratio(&self) -> f64 {
        match self {
            QualityPreset::Low => 0.3,
            QualityPreset::Medium => 0.5,
            QualityPreset::High => 0.7,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "low",
            QualityPreset::Medium => "medium",
            QualityPreset::High => "high",
        }
    }
}

impl FromStr for QualityPreset {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(QualityPreset::Low),
            "medium" => Ok(QualityPreset::Medium),
            "high" => Ok(QualityPreset::High),
            other => Err(DomainError::InvalidInput(format!(
                "unknown quality preset '{}'. Valid presets: low, medium, high",
                other
            ))),
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel height a resolution-capped encode scales to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TargetHeight {
    P2160,
    P1440,
    P1080,
    P720,
    P480,
    P360,
}

impl TargetHeight {
    pub const ALL: [TargetHeight; 6] = [
        TargetHeight::P2160,
        TargetHeight::P1440,
        TargetHeight::P1080,
        TargetHeight::P720,
        TargetHeight::P480,
        TargetHeight::P360,
    ];

    pub fn pixels(&self) -> u32 {
        match self {
            TargetHeight::P2160 => 2160,
            TargetHeight::P1440 => 1440,
            TargetHeight::P1080 => 1080,
            TargetHeight::P720 => 720,
            TargetHeight::P480 => 480,
            TargetHeight::P360 => 360,
        }
    }

    pub fn from_pixels(pixels: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.pixels() == pixels)
    }
}

impl FromStr for TargetHeight {
    type Err = DomainError;

    /// Accepts `720p` as well as `720`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        let digits = trimmed.strip_suffix('p').unwrap_or(&trimmed);
        digits
            .parse::<u32>()
            .ok()
            .and_then(Self::from_pixels)
            .ok_or_else(|| {
                DomainError::InvalidInput(format!(
                    "invalid resolution '{}'. Valid resolutions: 2160p, 1440p, 1080p, 720p, 480p, 360p",
                    s
                ))
            })
    }
}

impl fmt::Display for TargetHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.pixels())
    }
}

/// What a compression should optimise for
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CompressionRequest {
    /// Hit an output size with a two-pass bitrate encode
    TargetSize { target_size_mb: f64 },
    /// Single-pass constant-quality encode
    Quality { preset: QualityPreset },
    /// Downscale to a height, then constant-quality encode
    Resolution { preset: QualityPreset, height: TargetHeight },
}

impl CompressionRequest {
    /// Target-size request, rejecting non-positive or non-finite sizes
    pub fn target_size(target_size_mb: f64) -> Result<Self, DomainError> {
        let request = CompressionRequest::TargetSize { target_size_mb };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            CompressionRequest::TargetSize { target_size_mb }
                if !(target_size_mb.is_finite() && *target_size_mb > 0.0) =>
            {
                Err(DomainError::InvalidInput(format!(
                    "target size must be positive, got {} MB",
                    target_size_mb
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            CompressionRequest::TargetSize { .. } => "target_size",
            CompressionRequest::Quality { .. } => "quality",
            CompressionRequest::Resolution { .. } => "resolution",
        }
    }
}

/// Non-binding estimate of a compression's output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeEstimate {
    pub original_size_mb: f64,
    pub estimated_size_mb: f64,
    pub reduction_percent: f64,
}

/// External binaries the engine drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Ffmpeg,
    Ffprobe,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Ffmpeg => "ffmpeg",
            Tool::Ffprobe => "ffprobe",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Availability of each external tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    pub ffmpeg: bool,
    pub ffprobe: bool,
}

impl ToolStatus {
    pub fn all_available(&self) -> bool {
        self.ffmpeg && self.ffprobe
    }

    /// First tool that is missing, prober first
    pub fn first_missing(&self) -> Option<Tool> {
        if !self.ffprobe {
            Some(Tool::Ffprobe)
        } else if !self.ffmpeg {
            Some(Tool::Ffmpeg)
        } else {
            None
        }
    }
}

/// A fully built transcoder command line
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub tool: Tool,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl Invocation {
    pub fn new(tool: Tool, timeout: Duration) -> Self {
        Self {
            tool,
            args: Vec::new(),
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().to_string())
    }

    /// Value following `flag`, if present
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }

    /// Last argument, which is the output target for every transcoder call
    pub fn output_target(&self) -> Option<&str> {
        self.args.last().map(String::as_str)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tool, self.args.join(" "))
    }
}

/// How an external process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitInfo {
    /// Exited on its own with this code
    Code(i32),
    /// Ended by a signal, no exit code
    Terminated,
    /// Killed after exceeding its time budget
    TimedOut(Duration),
}

impl fmt::Display for ExitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitInfo::Code(code) => write!(f, "exit code {}", code),
            ExitInfo::Terminated => f.write_str("terminated by signal"),
            ExitInfo::TimedOut(after) => write!(f, "timed out after {}s", after.as_secs()),
        }
    }
}

/// Result of one external process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOutcome {
    pub success: bool,
    pub exit: ExitInfo,
    pub stdout: String,
    pub stderr: String,
}

impl EncodeOutcome {
    pub fn from_exit(exit: ExitInfo, stdout: String, stderr: String) -> Self {
        Self {
            success: exit == ExitInfo::Code(0),
            exit,
            stdout,
            stderr,
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self.exit, ExitInfo::TimedOut(_))
    }

    /// Last non-empty stderr line, for compact error reporting
    pub fn stderr_tail(&self) -> &str {
        self.stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("")
    }

    /// Exit information followed by the last stderr line, if any
    pub fn failure_detail(&self) -> String {
        match self.stderr_tail() {
            "" => self.exit.to_string(),
            tail => format!("{}: {}", self.exit, tail),
        }
    }
}
