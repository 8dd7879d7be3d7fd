//! Analyzer configuration, loadable from TOML.
//!
//! Every field has a default, so an empty file (or no file) yields the
//! standard engine:
//!
//! ```toml
//! min_confluence = 5
//!
//! [data]
//! history_timeout_secs = 30
//! coingecko_base = "http://localhost:8080/api/v3"
//! ```

use crate::signal::ConfluenceParams;
use crate::structure::StructureParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Rolling window for the Fibonacci envelope.
    pub swing_lookback: usize,
    pub near_pct_fib: f64,
    pub near_pct_ema: f64,
    pub min_confluence: u32,
    pub swing_left: usize,
    pub swing_right: usize,
    pub bos_window: usize,
    pub bos_threshold: f64,
    pub fib_recent_window: usize,
    pub data: DataConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        let confluence = ConfluenceParams::default();
        let structure = StructureParams::default();
        Self {
            swing_lookback: 20,
            near_pct_fib: confluence.near_pct_fib,
            near_pct_ema: confluence.near_pct_ema,
            min_confluence: confluence.min_confluence,
            swing_left: structure.left,
            swing_right: structure.right,
            bos_window: structure.bos_window,
            bos_threshold: structure.bos_threshold,
            fib_recent_window: confluence.fib_recent_window,
            data: DataConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn structure_params(&self) -> StructureParams {
        StructureParams {
            left: self.swing_left,
            right: self.swing_right,
            bos_window: self.bos_window,
            bos_threshold: self.bos_threshold,
        }
    }

    pub fn confluence_params(&self) -> ConfluenceParams {
        ConfluenceParams {
            near_pct_fib: self.near_pct_fib,
            near_pct_ema: self.near_pct_ema,
            min_confluence: self.min_confluence,
            fib_recent_window: self.fib_recent_window,
        }
    }
}

/// Remote source endpoints and timeouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub history_timeout_secs: u64,
    pub quote_timeout_secs: u64,
    pub directory_timeout_secs: u64,
    pub address_timeout_secs: u64,
    pub coingecko_base: String,
    pub coinpaprika_base: String,
    pub geckoterminal_base: String,
    pub dexscreener_base: String,
    /// Upper bound on synthetic series length, in daily candles.
    pub synthetic_max_days: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            history_timeout_secs: 60,
            quote_timeout_secs: 10,
            directory_timeout_secs: 10,
            address_timeout_secs: 10,
            coingecko_base: "https://api.coingecko.com/api/v3".into(),
            coinpaprika_base: "https://api.coinpaprika.com/v1".into(),
            geckoterminal_base: "https://api.geckoterminal.com/api/v2".into(),
            dexscreener_base: "https://api.dexscreener.com/latest/dex".into(),
            synthetic_max_days: 30,
        }
    }
}

impl DataConfig {
    pub fn history_timeout(&self) -> Duration {
        Duration::from_secs(self.history_timeout_secs)
    }

    pub fn quote_timeout(&self) -> Duration {
        Duration::from_secs(self.quote_timeout_secs)
    }

    pub fn directory_timeout(&self) -> Duration {
        Duration::from_secs(self.directory_timeout_secs)
    }

    pub fn address_timeout(&self) -> Duration {
        Duration::from_secs(self.address_timeout_secs)
    }
}
