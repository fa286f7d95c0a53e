//! Serializable run configuration.
//!
//! Every field has a default, so an absent or partial TOML file is valid.
//! The configuration never carries the ticker list or the lookback window;
//! those are fixed by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::data::FetchMode;

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiiChartConfig {
    /// Directory under which the timestamped output directory is created.
    pub output_root: PathBuf,

    /// Show the combined chart in the terminal before saving.
    pub display: bool,

    pub fetch_mode: FetchMode,

    pub provider: ProviderSettings,

    pub chart: ChartSettings,
}

impl Default for FiiChartConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            display: true,
            fetch_mode: FetchMode::Sequential,
            provider: ProviderSettings::default(),
            chart: ChartSettings::default(),
        }
    }
}

impl FiiChartConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// HTTP settings for the market data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://query2.finance.yahoo.com".into(),
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
        }
    }
}

/// Pixel sizes of the saved PNG charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub combined_width: u32,
    pub combined_height: u32,
    pub single_width: u32,
    pub single_height: u32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        // 12x8in and 10x5in at 100 dpi
        Self {
            combined_width: 1200,
            combined_height: 800,
            single_width: 1000,
            single_height: 500,
        }
    }
}
