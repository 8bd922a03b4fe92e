//! Engine configuration (TOML).
//!
//! ```toml
//! lookback = 30
//!
//! [fields]
//! price = "PX_LAST"
//! reference_rate = "USGG12M"
//!
//! [reference_rates]
//! TPX = "GTJPY1Y"
//!
//! [policies.tpx]
//! scale = 2.0
//! offset = 0.2
//!
//! [gauge]
//! buy_below = 0.3
//! sell_above = 0.7
//! ```
//!
//! Every key is optional; missing keys take the defaults below.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::data::FieldMap;
use crate::signal::{GaugeThresholds, IndexKind, PolicyTable, SignalError};

pub const DEFAULT_LOOKBACK: usize = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Signal(#[from] SignalError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rolling window length for the smoother.
    pub lookback: usize,
    pub fields: FieldMap,
    pub policies: PolicyTable,
    pub gauge: GaugeThresholds,
    /// Per-index reference-rate column, keyed by ticker.
    pub reference_rates: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_LOOKBACK,
            fields: FieldMap::default(),
            policies: PolicyTable::default(),
            gauge: GaugeThresholds::default(),
            reference_rates: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback == 0 {
            return Err(SignalError::InvalidLookback(0).into());
        }
        for (name, policy) in [("spx", self.policies.spx), ("tpx", self.policies.tpx)] {
            if !policy.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "policies.{name} must have finite scale and offset"
                )));
            }
        }
        let gauge = self.gauge;
        if gauge.buy_below.is_nan() || gauge.sell_above.is_nan() || gauge.buy_below > gauge.sell_above {
            return Err(ConfigError::Invalid(format!(
                "gauge.buy_below ({}) must not exceed gauge.sell_above ({})",
                self.gauge.buy_below, self.gauge.sell_above
            )));
        }
        let mut seen = BTreeMap::new();
        for ticker in self.reference_rates.keys() {
            let index = ticker.parse::<IndexKind>()?;
            if let Some(previous) = seen.insert(index, ticker) {
                return Err(ConfigError::Invalid(format!(
                    "reference_rates: '{previous}' and '{ticker}' both name {index}"
                )));
            }
        }
        Ok(())
    }

    /// Column names for one index, with its reference-rate override applied.
    pub fn fields_for(&self, index: IndexKind) -> FieldMap {
        let override_col = self
            .reference_rates
            .iter()
            .find(|(ticker, _)| ticker.parse::<IndexKind>().ok() == Some(index))
            .map(|(_, col)| col.as_str());
        match override_col {
            Some(col) => self.fields.with_reference_rate(col),
            None => self.fields.clone(),
        }
    }
}
