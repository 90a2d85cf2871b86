//! Ledger configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use stakepoll_utils::LogFormat;

use crate::PollError;

/// Configuration for a poll ledger.
///
/// Can be loaded from a TOML file via [`PollConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Maximum number of records refreshed by one `update_votes` call.
    #[serde(default = "default_max_resync_batch")]
    pub max_resync_batch: usize,

    /// Page size used when a list call passes a limit of 0.
    #[serde(default = "default_page_limit")]
    pub default_page_limit: usize,

    /// Upper bound applied to every list call.
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: usize,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where and how the LMDB environment is opened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    #[serde(default = "default_max_dbs")]
    pub max_dbs: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// "human" or "json".
    #[serde(default)]
    pub format: LogFormat,

    /// Filter directive, e.g. "info" or "debug,stakepoll_governance=trace".
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_max_resync_batch() -> usize {
    1000
}

fn default_page_limit() -> usize {
    100
}

fn default_max_page_limit() -> usize {
    1000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./stakepoll_data")
}

fn default_map_size() -> usize {
    1 << 30
}

fn default_max_dbs() -> u32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_resync_batch: default_max_resync_batch(),
            default_page_limit: default_page_limit(),
            max_page_limit: default_max_page_limit(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            max_dbs: default_max_dbs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_log_level(),
        }
    }
}

impl PollConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, PollError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PollError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, PollError> {
        let config: Self = toml::from_str(s).map_err(|e| PollError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, PollError> {
        toml::to_string_pretty(self).map_err(|e| PollError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), PollError> {
        if self.max_resync_batch == 0 {
            return Err(PollError::Config("max_resync_batch must be at least 1".into()));
        }
        if self.max_page_limit == 0 {
            return Err(PollError::Config("max_page_limit must be at least 1".into()));
        }
        Ok(())
    }

    /// Effective page size for a requested `limit`.
    pub fn page_limit(&self, limit: usize) -> usize {
        let requested = if limit == 0 {
            self.default_page_limit
        } else {
            limit
        };
        requested.clamp(1, self.max_page_limit)
    }
}
