// TOML config adapter - Configuration management using TOML files

use std::path::PathBuf;

use tracing::debug;

use crate::config_initialization::ToolkitConfig;
use crate::domain::errors::*;
use crate::ports::*;

/// Name of the configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "mtk.toml";

/// TOML configuration adapter
#[derive(Debug, Clone)]
pub struct TomlConfigAdapter {
    explicit: Option<PathBuf>,
}

impl TomlConfigAdapter {
    /// Read `path` if given, else `mtk.toml` when it exists
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { explicit: path }
    }

    fn resolve(&self) -> Option<PathBuf> {
        match &self.explicit {
            Some(path) => Some(path.clone()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.is_file().then_some(default)
            }
        }
    }
}

impl ConfigPort for TomlConfigAdapter {
    fn load(&self) -> Result<ToolkitConfig, DomainError> {
        let Some(path) = self.resolve() else {
            return Ok(ToolkitConfig::default());
        };

        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(&path).map_err(|e| {
            DomainError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        ToolkitConfig::from_toml_str(&content)
    }

    fn source(&self) -> Option<PathBuf> {
        self.resolve()
    }
}
