//! Data sources: where a model's raw index tables come from.

use std::path::{Path, PathBuf};
use thiserror::Error;

use barometer_core::data::{read_table, synthetic_table, SyntheticSpec};
use barometer_core::{DataError, EngineConfig, IndexKind, RawTable};

use crate::models::ModelSpec;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no export for {index} under {dir} (expected {index}.csv or {index}.parquet)")]
    NotFound { index: IndexKind, dir: PathBuf },

    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: DataError },
}

/// Supplies one raw table per (model, index).
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    fn fetch(&self, model: &ModelSpec, index: IndexKind) -> Result<RawTable, SourceError>;
}

/// Reads `{root}/{model input}/{INDEX}.csv`, falling back to `.parquet`.
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    root: PathBuf,
}

impl CsvDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, model: &ModelSpec, index: IndexKind) -> Result<PathBuf, SourceError> {
        let dir = self.root.join(&model.input);
        ["csv", "parquet"]
            .iter()
            .map(|ext| dir.join(format!("{}.{ext}", index.ticker())))
            .find(|p| p.is_file())
            .ok_or(SourceError::NotFound { index, dir })
    }
}

impl DataSource for CsvDirSource {
    fn name(&self) -> &str {
        "csv-dir"
    }

    fn fetch(&self, model: &ModelSpec, index: IndexKind) -> Result<RawTable, SourceError> {
        let path = self.locate(model, index)?;
        read_table(&path).map_err(|source| SourceError::Read { path, source })
    }
}

/// Deterministic generated histories, shaped like the workbook export.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    config: EngineConfig,
    rows: usize,
    seed: u64,
}

impl SyntheticSource {
    /// Column names follow `config` (including reference-rate overrides).
    pub fn new(config: &EngineConfig, rows: usize, seed: u64) -> Self {
        Self {
            config: config.clone(),
            rows,
            seed,
        }
    }

    fn spec_for(&self, index: IndexKind) -> SyntheticSpec {
        let base = SyntheticSpec {
            rows: self.rows,
            seed: self.seed,
            ..Default::default()
        };
        match index {
            IndexKind::Spx => base,
            IndexKind::Tpx => SyntheticSpec {
                start_price: 2500.0,
                payout_ratio: 35.0,
                roe: 9.0,
                dividend_yield: 0.022,
                reference_rate: 0.3,
                volatility: 19.0,
                seed: self.seed.wrapping_add(1),
                ..base
            },
        }
    }
}

impl DataSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, _model: &ModelSpec, index: IndexKind) -> Result<RawTable, SourceError> {
        Ok(synthetic_table(
            &self.spec_for(index),
            &self.config.fields_for(index),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_is_not_found() {
        let source = CsvDirSource::new("/nonexistent/barometer-data");
        let err = source
            .fetch(&ModelSpec::barometer(), IndexKind::Spx)
            .unwrap_err();
        assert!(matches!(err, SourceError::NotFound { index: IndexKind::Spx, .. }));
        assert!(err.to_string().contains("SPX.csv"));
    }

    #[test]
    fn synthetic_is_deterministic_per_index() {
        let source = SyntheticSource::new(&EngineConfig::default(), 50, 7);
        let model = ModelSpec::barometer();
        let a = source.fetch(&model, IndexKind::Spx).unwrap();
        let b = source.fetch(&model, IndexKind::Spx).unwrap();
        let t = source.fetch(&model, IndexKind::Tpx).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, t);
        assert_eq!(a.height(), 50);
    }

    #[test]
    fn synthetic_uses_reference_rate_override() {
        let config = EngineConfig::from_toml("[reference_rates]\nTPX = \"GTJPY1Y\"").unwrap();
        let source = SyntheticSource::new(&config, 10, 1);
        let model = ModelSpec::barometer();
        assert!(source.fetch(&model, IndexKind::Tpx).unwrap().has_column("GTJPY1Y"));
        assert!(source.fetch(&model, IndexKind::Spx).unwrap().has_column("USGG12M"));
    }
}
