//! Logging configuration and subscriber setup

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line format
    #[default]
    Pretty,
    /// Single-line text format
    Compact,
    /// JSON format for structured logging
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!(
                "Invalid log format: {}. Valid formats: pretty, compact, json",
                other
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        };
        f.write_str(name)
    }
}

/// Check that `level` is a valid tracing filter level
pub fn validate_level(level: &str) -> Result<(), String> {
    match level.trim().to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(()),
        other => Err(format!(
            "Invalid log level: {}. Valid levels: trace, debug, info, warn, error, off",
            other
        )),
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `level`. Logs go to stderr so that
/// `--json` command output on stdout stays machine-readable. Calling this
/// more than once keeps the first subscriber.
pub fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };
}
