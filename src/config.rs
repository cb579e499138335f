//! Store configuration file
//!
//! JSON, read once at startup:
//!
//! ```json
//! {
//!   "data_dir": "./data",
//!   "backend": "append_log",
//!   "max_record_size": 1048576,
//!   "async_writes": false,
//!   "log_level": "info"
//! }
//! ```
//!
//! Only `data_dir` is required.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::Severity;
use crate::store::DEFAULT_MAX_RECORD_SIZE;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write config {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Storage backend selected at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Persistent append-only log
    #[default]
    AppendLog,
    /// Volatile hash map
    Memory,
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the log file (required)
    pub data_dir: PathBuf,

    /// Backend to open (optional, default "append_log")
    #[serde(default)]
    pub backend: Backend,

    /// Max key + value bytes (optional, default 1 MiB)
    #[serde(default = "default_max_record_size")]
    pub max_record_size: usize,

    /// Skip fsync after appends (optional, default false)
    #[serde(default)]
    pub async_writes: bool,

    /// Minimum severity printed by the CLI logger (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: Severity,
}

fn default_max_record_size() -> usize {
    DEFAULT_MAX_RECORD_SIZE
}

fn default_log_level() -> Severity {
    Severity::Info
}

impl StoreConfig {
    /// Configuration with every optional field at its default
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            backend: Backend::default(),
            max_record_size: default_max_record_size(),
            async_writes: false,
            log_level: default_log_level(),
        }
    }

    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: StoreConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json + "\n").map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_dir must not be empty".into()));
        }
        if self.max_record_size == 0 {
            return Err(ConfigError::Invalid("max_record_size must be > 0".into()));
        }
        if self.max_record_size as u64 > u32::MAX as u64 {
            return Err(ConfigError::Invalid(format!(
                "max_record_size must be <= {}",
                u32::MAX
            )));
        }
        Ok(())
    }
}
