//! Barometer Core: the forward-Sharpe signal engine.
//!
//! This crate contains:
//! - The raw observation table model and spreadsheet-export ingest
//! - The series cleaner (ordering, placeholder repair, coercion)
//! - The rolling smoother
//! - The valuation-rate solver (dividend-discount quadratic inversion)
//! - The signal composer and per-index scaling policies
//! - Gauge classification of the latest reading
//! - The batch interface over several indices

pub mod config;
pub mod data;
pub mod fingerprint;
pub mod pipeline;
pub mod signal;

pub use config::{ConfigError, EngineConfig, DEFAULT_LOOKBACK};
pub use data::{Cell, DataError, FieldMap, RawTable};
pub use fingerprint::{dataset_hash, DatasetHash};
pub use pipeline::{ResultSet, SignalEngine};
pub use signal::{IndexKind, SignalError, SignalPoint, SignalSeries};
