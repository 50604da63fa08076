//! Configuration hierarchy: CLI > Env > File > Defaults

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::errors::DomainError;
use crate::ports::ConfigPort;
use crate::utils::logging::{self, LogFormat};

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "MTK_";

/// Per-invocation time budgets, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Tool availability checks
    pub capability_secs: u64,
    /// Metadata probes
    pub probe_secs: u64,
    /// Each split segment, per strategy
    pub segment_secs: u64,
    /// Each full-file compression pass
    pub compression_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            capability_secs: 5,
            probe_secs: 30,
            segment_secs: 600,
            compression_secs: 3600,
        }
    }
}

impl TimeoutConfig {
    pub fn capability(&self) -> Duration {
        Duration::from_secs(self.capability_secs)
    }

    pub fn probe(&self) -> Duration {
        Duration::from_secs(self.probe_secs)
    }

    pub fn segment(&self) -> Duration {
        Duration::from_secs(self.segment_secs)
    }

    pub fn compression(&self) -> Duration {
        Duration::from_secs(self.compression_secs)
    }
}

/// Complete toolkit configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// Explicit transcoder binary; looked up on PATH when unset
    pub ffmpeg_path: Option<PathBuf>,
    /// Explicit prober binary; looked up on PATH when unset
    pub ffprobe_path: Option<PathBuf>,
    /// Where segments, archives and compressed files are written
    pub output_dir: PathBuf,
    /// Scratch space for two-pass statistics
    pub work_dir: PathBuf,
    pub audio_bitrate_kbps: u32,
    /// Target-size encodes below this video bitrate are refused
    pub min_video_bitrate_kbps: u32,
    /// Outputs at or below this size are treated as failed
    pub min_segment_bytes: u64,
    pub video_encoder: String,
    pub encoder_preset: String,
    pub audio_encoder: String,
    /// CRF of the re-encode split fallback
    pub reencode_crf: u8,
    pub max_concurrent_operations: usize,
    pub log_level: String,
    pub log_format: LogFormat,
    pub timeouts: TimeoutConfig,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            output_dir: PathBuf::from("outputs"),
            work_dir: std::env::temp_dir().join("media-toolkit"),
            audio_bitrate_kbps: 128,
            min_video_bitrate_kbps: 100,
            min_segment_bytes: 1000,
            video_encoder: "libx264".to_string(),
            encoder_preset: "medium".to_string(),
            audio_encoder: "aac".to_string(),
            reencode_crf: 23,
            max_concurrent_operations: num_cpus::get().max(1),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl ToolkitConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, DomainError> {
        toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))
    }

    pub fn to_toml_string(&self) -> Result<String, DomainError> {
        toml::to_string_pretty(self)
            .map_err(|e| DomainError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        logging::validate_level(&self.log_level).map_err(DomainError::Config)?;

        if self.reencode_crf > 51 {
            return Err(DomainError::Config(
                "CRF value cannot exceed 51".to_string(),
            ));
        }
        if self.max_concurrent_operations == 0 {
            return Err(DomainError::Config(
                "max_concurrent_operations must be at least 1".to_string(),
            ));
        }
        if self.audio_bitrate_kbps == 0 {
            return Err(DomainError::Config(
                "audio_bitrate_kbps must be positive".to_string(),
            ));
        }

        let t = &self.timeouts;
        for (name, secs) in [
            ("capability_secs", t.capability_secs),
            ("probe_secs", t.probe_secs),
            ("segment_secs", t.segment_secs),
            ("compression_secs", t.compression_secs),
        ] {
            if secs == 0 {
                return Err(DomainError::Config(format!(
                    "timeouts.{} must be positive",
                    name
                )));
            }
        }

        for (name, value) in [
            ("video_encoder", &self.video_encoder),
            ("encoder_preset", &self.encoder_preset),
            ("audio_encoder", &self.audio_encoder),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::Config(format!("{} cannot be empty", name)));
            }
        }

        Ok(())
    }

    /// Apply `MTK_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<usize, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(&format!("{}{}", ENV_PREFIX, key));
        let mut applied = 0;

        if let Some(v) = var("FFMPEG_PATH") {
            self.ffmpeg_path = Some(PathBuf::from(v));
            applied += 1;
        }
        if let Some(v) = var("FFPROBE_PATH") {
            self.ffprobe_path = Some(PathBuf::from(v));
            applied += 1;
        }
        if let Some(v) = var("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
            applied += 1;
        }
        if let Some(v) = var("WORK_DIR") {
            self.work_dir = PathBuf::from(v);
            applied += 1;
        }
        if let Some(v) = var("AUDIO_BITRATE_KBPS") {
            self.audio_bitrate_kbps = parse_env("AUDIO_BITRATE_KBPS", &v)?;
            applied += 1;
        }
        if let Some(v) = var("MAX_CONCURRENT_OPERATIONS") {
            self.max_concurrent_operations = parse_env("MAX_CONCURRENT_OPERATIONS", &v)?;
            applied += 1;
        }
        if let Some(v) = var("SEGMENT_TIMEOUT_SECS") {
            self.timeouts.segment_secs = parse_env("SEGMENT_TIMEOUT_SECS", &v)?;
            applied += 1;
        }
        if let Some(v) = var("COMPRESSION_TIMEOUT_SECS") {
            self.timeouts.compression_secs = parse_env("COMPRESSION_TIMEOUT_SECS", &v)?;
            applied += 1;
        }
        if let Some(v) = var("LOG_LEVEL") {
            self.log_level = v;
            applied += 1;
        }
        if let Some(v) = var("LOG_FORMAT") {
            self.log_format = v.parse().map_err(DomainError::Config)?;
            applied += 1;
        }

        Ok(applied)
    }

    /// Apply command-line overrides
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> usize {
        let mut applied = 0;
        if let Some(dir) = &overrides.output_dir {
            self.output_dir = dir.clone();
            applied += 1;
        }
        if let Some(level) = &overrides.log_level {
            self.log_level = level.clone();
            applied += 1;
        }
        if let Some(format) = overrides.log_format {
            self.log_format = format;
            applied += 1;
        }
        applied
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, DomainError> {
    value.trim().parse().map_err(|_| {
        DomainError::Config(format!("Invalid value for {}{}: {}", ENV_PREFIX, key, value))
    })
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub output_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

/// Build the effective configuration from every layer
pub fn initialize_configuration_hierarchy(
    config_port: &dyn ConfigPort,
    overrides: &ConfigOverrides,
) -> Result<ToolkitConfig, DomainError> {
    // File layer, which starts from defaults
    let mut config = config_port.load()?;
    match config_port.source() {
        Some(path) => debug!("Configuration file layer: {}", path.display()),
        None => debug!("No configuration file, using defaults"),
    }

    let env_overrides = config.apply_env(|key| std::env::var(key).ok())?;
    if env_overrides > 0 {
        debug!("Applied {} environment variable overrides", env_overrides);
    }

    let cli_overrides = config.apply_overrides(overrides);
    if cli_overrides > 0 {
        debug!("Applied {} CLI configuration overrides", cli_overrides);
    }

    config.validate()?;
    info!(
        output_dir = %config.output_dir.display(),
        max_concurrent_operations = config.max_concurrent_operations,
        "Configuration initialized"
    );
    Ok(config)
}
