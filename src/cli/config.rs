//! Configuration file
//!
//! Optional JSON file; every field has a default, so an absent file and `{}`
//! are equivalent.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::http_server::HttpServerConfig;
use crate::observability::LogFormat;
use crate::provision::{ExistingPathPolicy, StorageRoot};

use super::errors::{CliError, CliResult};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Storage root (absolute). Defaults to `<home>/toolboxes`.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Log level (default "info"); `RUST_LOG` overrides it
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Handling of module paths occupied by a non-directory
    #[serde(default)]
    pub existing_path_policy: ExistingPathPolicy,

    #[serde(default)]
    pub http: HttpServerConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            existing_path_policy: ExistingPathPolicy::default(),
            http: HttpServerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// `path` if given, built-in defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        if let Some(dir) = &self.data_dir {
            if dir.trim().is_empty() {
                return Err(CliError::config_error("data_dir must not be empty"));
            }
            if !Path::new(dir).is_absolute() {
                return Err(CliError::config_error(format!(
                    "data_dir must be an absolute path, got '{}'",
                    dir
                )));
            }
        }

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'. Must be one of {}.",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        self.http.validate()?;

        Ok(())
    }

    /// The storage root this configuration selects
    pub fn storage_root(&self) -> CliResult<StorageRoot> {
        match &self.data_dir {
            Some(dir) => Ok(StorageRoot::new(PathBuf::from(dir))),
            None => Ok(StorageRoot::from_home()?),
        }
    }
}
