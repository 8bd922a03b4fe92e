//! Runner configuration (TOML).
//!
//! ```toml
//! models = ["spx_barometer"]
//! data_dir = "data"
//! output_dir = "output"
//! refresh_interval_secs = 86400
//!
//! [engine]
//! lookback = 30
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use barometer_core::EngineConfig;

use crate::models::SPX_BAROMETER;

/// Once a day.
pub const DEFAULT_REFRESH_SECS: u64 = 86_400;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("engine config: {0}")]
    Engine(#[from] barometer_core::ConfigError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarometerConfig {
    /// Registry keys to run, in order.
    pub models: Vec<String>,
    /// Root of the exported workbooks: `{data_dir}/{model input}/{INDEX}.csv`.
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub refresh_interval_secs: u64,
    pub engine: EngineConfig,
}

impl Default for BarometerConfig {
    fn default() -> Self {
        Self {
            models: vec![SPX_BAROMETER.to_string()],
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            engine: EngineConfig::default(),
        }
    }
}

impl BarometerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "refresh_interval_secs must be at least 1".into(),
            ));
        }
        if self.models.is_empty() {
            return Err(ConfigError::Invalid("no models selected".into()));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}
