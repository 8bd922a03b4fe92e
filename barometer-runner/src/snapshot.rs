//! The output of one refresh cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use barometer_core::signal::GaugeReading;
use barometer_core::{DatasetHash, IndexKind, ResultSet};

/// Bumped whenever the persisted snapshot layout changes.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub display_name: String,
    pub results: ResultSet,
    /// Latest reading per index; absent where the series has no defined value.
    pub gauges: BTreeMap<IndexKind, GaugeReading>,
    /// BLAKE3 of each fetched raw table.
    pub dataset_hashes: BTreeMap<IndexKind, DatasetHash>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub models: BTreeMap<String, ModelOutput>,
}

impl Snapshot {
    pub fn new(generated_at: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at,
            models: BTreeMap::new(),
        }
    }

    pub fn get(&self, model: &str) -> Option<&ModelOutput> {
        self.models.get(model)
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
