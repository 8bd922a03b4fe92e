//! Forward-Sharpe signal derivation.
//!
//! Raw → Cleaned → Smoothed → Derived → Result. Every stage takes its input
//! by reference and allocates a new output.

pub mod clean;
pub mod compose;
pub mod gauge;
pub mod policy;
pub mod rate;
pub mod series;
pub mod smooth;

pub use clean::clean;
pub use compose::{compose, derive_row, to_signal_series, DerivedRow, SignalPoint, SignalSeries};
pub use gauge::{read_gauge, GaugeReading, GaugeThresholds, Zone};
pub use policy::{IndexKind, PolicyTable, ScalingPolicy};
pub use rate::{required_return, required_return_broadcast, Operand};
pub use series::{CleanSeries, Observation};
pub use smooth::{rolling_mean, smooth};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("unsupported index '{0}' (supported: SPX, TPX)")]
    UnsupportedIndex(String),

    #[error("operand length mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("lookback must be at least 1, got {0}")]
    InvalidLookback(usize),
}
