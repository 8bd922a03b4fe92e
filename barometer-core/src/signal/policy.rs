//! Supported indices and their forward-Sharpe scaling policies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::SignalError;

/// The closed roster of indices the barometer knows how to scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndexKind {
    #[serde(rename = "SPX")]
    Spx,
    #[serde(rename = "TPX")]
    Tpx,
}

impl IndexKind {
    pub const ALL: [IndexKind; 2] = [IndexKind::Spx, IndexKind::Tpx];

    pub fn ticker(&self) -> &'static str {
        match self {
            IndexKind::Spx => "SPX",
            IndexKind::Tpx => "TPX",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ticker())
    }
}

impl FromStr for IndexKind {
    type Err = SignalError;

    /// Accepts `SPX`, `spx`, `SPX Index` and the same forms of `TPX`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();
        let ticker = upper.strip_suffix(" INDEX").unwrap_or(&upper).trim();
        match ticker {
            "SPX" => Ok(IndexKind::Spx),
            "TPX" => Ok(IndexKind::Tpx),
            _ => Err(SignalError::UnsupportedIndex(trimmed.to_string())),
        }
    }
}

/// Linear rescale then clip: `clamp(scale * raw - offset, 0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingPolicy {
    pub scale: f64,
    pub offset: f64,
}

impl ScalingPolicy {
    pub const fn new(scale: f64, offset: f64) -> Self {
        Self { scale, offset }
    }

    /// Bounded forward-Sharpe; `None` only when `raw` is NaN.
    pub fn apply(&self, raw: f64) -> Option<f64> {
        let scaled = self.scale * raw - self.offset;
        if scaled.is_nan() {
            return None;
        }
        Some(scaled.clamp(0.0, 1.0))
    }

    pub fn is_finite(&self) -> bool {
        self.scale.is_finite() && self.offset.is_finite()
    }
}

/// Per-index policies, tunable from configuration.
///
/// Any key left out of the TOML keeps that index's default, so
/// `[policies.tpx]` with only `scale` still offsets by 0.2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PolicyOverrides")]
pub struct PolicyTable {
    pub spx: ScalingPolicy,
    pub tpx: ScalingPolicy,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PolicyOverrides {
    spx: PartialPolicy,
    tpx: PartialPolicy,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PartialPolicy {
    scale: Option<f64>,
    offset: Option<f64>,
}

impl PartialPolicy {
    fn over(self, base: ScalingPolicy) -> ScalingPolicy {
        ScalingPolicy {
            scale: self.scale.unwrap_or(base.scale),
            offset: self.offset.unwrap_or(base.offset),
        }
    }
}

impl From<PolicyOverrides> for PolicyTable {
    fn from(overrides: PolicyOverrides) -> Self {
        let defaults = PolicyTable::default();
        Self {
            spx: overrides.spx.over(defaults.spx),
            tpx: overrides.tpx.over(defaults.tpx),
        }
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            spx: ScalingPolicy::new(1.0, 0.1),
            tpx: ScalingPolicy::new(2.0, 0.2),
        }
    }
}

impl PolicyTable {
    pub fn for_index(&self, index: IndexKind) -> ScalingPolicy {
        match index {
            IndexKind::Spx => self.spx,
            IndexKind::Tpx => self.tpx,
        }
    }
}
