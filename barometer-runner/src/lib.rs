//! Barometer Runner: model orchestration, refresh loop, export.
//!
//! This crate builds on `barometer-core` to provide:
//! - The model registry (display name, input location, index roster, processor)
//! - Data sources: exported-workbook directories and a synthetic generator
//! - `run_all_models`, producing an explicit `Snapshot` per refresh cycle
//! - A background refresh loop that hands snapshots to a consumer
//! - CSV / JSON / Parquet export and a Markdown report

pub mod config;
pub mod export;
pub mod models;
pub mod refresh;
pub mod report;
pub mod snapshot;
pub mod source;

pub use config::{BarometerConfig, ConfigError, DEFAULT_REFRESH_SECS};
pub use export::{export_json, export_signal_csv, import_json, load_snapshot, save_artifacts};
pub use models::{ModelRegistry, ModelSpec, Processor, RegistryError, SPX_BAROMETER};
pub use refresh::{run_all_models, RefreshLoop};
pub use report::generate_report;
pub use snapshot::{ModelOutput, Snapshot, SCHEMA_VERSION};
pub use source::{CsvDirSource, DataSource, SourceError, SyntheticSource};
