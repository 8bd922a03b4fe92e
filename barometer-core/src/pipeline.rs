//! The signal engine: per-index pipeline and the batch interface.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::{ConfigError, EngineConfig};
use crate::data::RawTable;
use crate::signal::{
    clean, compose, derive_row, read_gauge, smooth, to_signal_series, CleanSeries, DerivedRow,
    GaugeReading, IndexKind, Observation, SignalError, SignalSeries,
};

/// Output of one batch run: a series per processed index, plus the reason
/// each remaining index was left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub series: BTreeMap<IndexKind, SignalSeries>,
    pub skipped: BTreeMap<IndexKind, String>,
}

impl ResultSet {
    pub fn get(&self, index: IndexKind) -> Option<&SignalSeries> {
        self.series.get(&index)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Stateless apart from its configuration; safe to share across threads.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: EngineConfig,
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }
}

impl SignalEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clean(&self, index: IndexKind, raw: &RawTable) -> Result<CleanSeries, SignalError> {
        clean(raw, &self.config.fields_for(index))
    }

    /// Full derivation with every intermediate field.
    pub fn derive(&self, index: IndexKind, raw: &RawTable) -> Result<Vec<DerivedRow>, SignalError> {
        let cleaned = self.clean(index, raw)?;
        let smoothed = smooth(cleaned.observations(), self.config.lookback)?;
        let policy = self.config.policies.for_index(index);
        let rows = compose(&smoothed, &policy);
        debug!(
            %index,
            raw = raw.height(),
            cleaned = cleaned.len(),
            derived = rows.len(),
            "derived forward sharpe"
        );
        Ok(rows)
    }

    /// Derive one already-smoothed observation with the configured policy.
    pub fn derive_observation(&self, index: IndexKind, obs: &Observation) -> DerivedRow {
        derive_row(obs, &self.config.policies.for_index(index))
    }

    /// Chart-ready price / forward-Sharpe series for one index.
    pub fn run_index(&self, index: IndexKind, raw: &RawTable) -> Result<SignalSeries, SignalError> {
        let rows = self.derive(index, raw)?;
        Ok(to_signal_series(index, &rows))
    }

    /// Process every index independently. A malformed table never aborts
    /// the others; it is logged and recorded in `ResultSet::skipped`.
    pub fn run_batch(&self, inputs: &BTreeMap<IndexKind, RawTable>) -> ResultSet {
        let outcomes: Vec<(IndexKind, Result<SignalSeries, SignalError>)> = inputs
            .par_iter()
            .map(|(index, raw)| (*index, self.run_index(*index, raw)))
            .collect();

        let mut result = ResultSet::default();
        for (index, outcome) in outcomes {
            match outcome {
                Ok(series) => {
                    result.series.insert(index, series);
                }
                Err(SignalError::MissingColumn(column)) if column == self.config.fields.date => {
                    warn!(%index, "skipping index: no '{column}' column");
                    result
                        .skipped
                        .insert(index, format!("missing date column '{column}'"));
                }
                Err(e) => {
                    warn!(%index, error = %e, "skipping index");
                    result.skipped.insert(index, e.to_string());
                }
            }
        }
        result
    }

    pub fn gauge(&self, series: &SignalSeries) -> Option<GaugeReading> {
        read_gauge(series, &self.config.gauge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cell;
    use chrono::{Duration, NaiveDate};

    fn flat_table(rows: usize) -> RawTable {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..rows)
            .map(|i| Cell::Date(base + Duration::days(i as i64)))
            .collect();
        let constant = |v: f64| vec![Cell::Number(v); rows];
        RawTable::from_columns(vec![
            ("DATE", dates),
            ("PX_LAST", constant(100.0)),
            ("DVD_PAYOUT_RATIO", constant(50.0)),
            ("BEST_ROE", constant(10.0)),
            ("IDX_EST_DVD_CURR_YR", constant(4.0)),
            ("IDX_EST_DVD_NXT_YR", constant(4.2)),
            ("USGG12M", constant(2.0)),
            ("VOLATILITY_360D", constant(15.0)),
        ])
        .unwrap()
    }

    #[test]
    fn run_index_lengths() {
        let engine = SignalEngine::default();
        let series = engine.run_index(IndexKind::Spx, &flat_table(40)).unwrap();
        assert_eq!(series.len(), 11);
        assert!(series.points.iter().all(|p| p.price == 100.0));
    }

    #[test]
    fn short_input_gives_empty_series() {
        let engine = SignalEngine::default();
        let series = engine.run_index(IndexKind::Spx, &flat_table(10)).unwrap();
        assert!(series.is_empty());
        assert!(engine.gauge(&series).is_none());
    }

    #[test]
    fn batch_skips_table_without_dates() {
        let engine = SignalEngine::default();
        let no_dates = RawTable::from_columns(vec![("PX_LAST", vec![Cell::Number(1.0)])]).unwrap();
        let mut inputs = BTreeMap::new();
        inputs.insert(IndexKind::Spx, flat_table(40));
        inputs.insert(IndexKind::Tpx, no_dates);

        let result = engine.run_batch(&inputs);

        assert_eq!(result.len(), 1);
        assert!(result.get(IndexKind::Spx).is_some());
        assert!(result.get(IndexKind::Tpx).is_none());
        assert!(result.skipped[&IndexKind::Tpx].contains("DATE"));
    }

    #[test]
    fn policies_differ_per_index() {
        let engine = SignalEngine::default();
        let table = flat_table(35);
        let spx = engine.run_index(IndexKind::Spx, &table).unwrap();
        let tpx = engine.run_index(IndexKind::Tpx, &table).unwrap();
        let s = spx.points[0].forward_sharpe.unwrap();
        let t = tpx.points[0].forward_sharpe.unwrap();
        // raw ≈ 0.455: SPX → 0.355, TPX → clip(0.71) = 0.71
        assert!((t - (2.0 * (s + 0.1) - 0.2).clamp(0.0, 1.0)).abs() < 1e-12);
    }

    #[test]
    fn single_observation_uses_configured_policy() {
        let config = EngineConfig::from_toml("[policies.spx]\nscale = 0.5\noffset = 0.0").unwrap();
        let tuned = SignalEngine::new(config).unwrap();
        let obs = Observation::from_values(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            [100.0, 50.0, 10.0, 4.0, 4.2, 2.0, 15.0],
        );

        let row = tuned.derive_observation(IndexKind::Spx, &obs);
        let raw = row.raw_sharpe.unwrap();
        assert!((row.forward_sharpe.unwrap() - 0.5 * raw).abs() < 1e-12);

        let default_row = SignalEngine::default().derive_observation(IndexKind::Spx, &obs);
        assert!((default_row.forward_sharpe.unwrap() - (raw - 0.1)).abs() < 1e-12);
    }

    #[test]
    fn engine_rejects_invalid_config() {
        let config = EngineConfig {
            lookback: 0,
            ..Default::default()
        };
        assert!(SignalEngine::new(config).is_err());
    }
}
