//! Pipeline configuration bridging the CLI and config files to domain types.
//!
//! A JSON file supplies the base configuration; CLI flags override it.

use crate::backtest::BacktestConfig;
use crate::discovery::DiscoveryConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default currency pairs analysed when none are given
pub const DEFAULT_INSTRUMENTS: &[&str] = &[
    "EURUSD", "GBPUSD", "USDJPY", "AUDUSD", "USDCHF", "USDCAD", "NZDUSD", "EURGBP",
];

/// Where return data comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding `<INSTRUMENT>.csv` files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_instruments")]
    pub instruments: Vec<String>,

    /// Longest price gap bridged by forward-fill (hours)
    #[serde(default = "default_max_fill_gap_hours")]
    pub max_fill_gap_hours: u32,

    /// Generate data instead of reading CSV files
    #[serde(default)]
    pub synthetic: bool,

    #[serde(default = "default_synthetic_hours")]
    pub synthetic_hours: usize,

    #[serde(default = "default_synthetic_lag")]
    pub synthetic_lag: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_instruments() -> Vec<String> {
    DEFAULT_INSTRUMENTS.iter().map(|s| s.to_string()).collect()
}
fn default_max_fill_gap_hours() -> u32 {
    4
}
fn default_synthetic_hours() -> usize {
    24 * 30
}
fn default_synthetic_lag() -> usize {
    2
}
fn default_seed() -> u64 {
    42
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            instruments: default_instruments(),
            max_fill_gap_hours: default_max_fill_gap_hours(),
            synthetic: false,
            synthetic_hours: default_synthetic_hours(),
            synthetic_lag: default_synthetic_lag(),
            seed: default_seed(),
        }
    }
}

impl DataConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.instruments.len() < 2 {
            return Err("need at least 2 instruments to form pairs".to_string());
        }
        if self.synthetic && self.synthetic_hours == 0 {
            return Err("synthetic_hours must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Complete configuration for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub backtest: BacktestConfig,
}

impl PipelineConfig {
    /// Read a JSON config file; missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.data.validate().map_err(ConfigError::Invalid)?;
        self.discovery.validate().map_err(ConfigError::Invalid)?;
        self.backtest.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

/// Errors that can occur when building the pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid timestamp '{0}'. Expected RFC 3339, 'YYYY-MM-DD HH:MM:SS' or unix seconds")]
    InvalidTimestamp(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
