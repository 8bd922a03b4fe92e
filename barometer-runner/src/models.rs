//! Model registry.
//!
//! A model is a named bundle of index inputs plus the processor that turns
//! them into a `ResultSet`. The registry is an explicit value handed to
//! `run_all_models`; nothing is registered globally.

use std::collections::BTreeMap;
use thiserror::Error;

use barometer_core::{IndexKind, RawTable, ResultSet, SignalEngine};

pub const SPX_BAROMETER: &str = "spx_barometer";

/// Turns the fetched raw tables of one model into its results.
pub type Processor = fn(&SignalEngine, &BTreeMap<IndexKind, RawTable>) -> ResultSet;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown model '{0}' (registered: {1})")]
    UnknownModel(String, String),
}

#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub display_name: String,
    /// Sub-directory (or workbook stem) the data source reads from.
    pub input: String,
    pub indices: Vec<IndexKind>,
    pub processor: Processor,
}

/// Forward-Sharpe barometer over every configured index.
pub fn process_barometer(engine: &SignalEngine, inputs: &BTreeMap<IndexKind, RawTable>) -> ResultSet {
    engine.run_batch(inputs)
}

impl ModelSpec {
    pub fn barometer() -> Self {
        Self {
            display_name: "Equities Forward-Sharpe Barometer".into(),
            input: SPX_BAROMETER.into(),
            indices: IndexKind::ALL.to_vec(),
            processor: process_barometer,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, ModelSpec>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in models.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(SPX_BAROMETER, ModelSpec::barometer());
        registry
    }

    /// Insert or replace a model.
    pub fn register(&mut self, key: impl Into<String>, spec: ModelSpec) {
        self.models.insert(key.into(), spec);
    }

    pub fn get(&self, key: &str) -> Option<&ModelSpec> {
        self.models.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelSpec)> {
        self.models.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Sub-registry with only the named models. Unknown keys are an error.
    pub fn select(&self, keys: &[String]) -> Result<Self, RegistryError> {
        let mut selected = Self::new();
        for key in keys {
            let spec = self.get(key).ok_or_else(|| {
                let known: Vec<&str> = self.models.keys().map(String::as_str).collect();
                RegistryError::UnknownModel(key.clone(), known.join(", "))
            })?;
            selected.register(key.clone(), spec.clone());
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_barometer() {
        let registry = ModelRegistry::builtin();
        let spec = registry.get(SPX_BAROMETER).unwrap();
        assert_eq!(spec.display_name, "Equities Forward-Sharpe Barometer");
        assert_eq!(spec.indices, vec![IndexKind::Spx, IndexKind::Tpx]);
    }

    #[test]
    fn select_rejects_unknown() {
        let registry = ModelRegistry::builtin();
        let err = registry.select(&["credit_spread".to_string()]).unwrap_err();
        assert!(err.to_string().contains("spx_barometer"));
    }

    #[test]
    fn custom_processor_is_used() {
        fn nothing(_: &SignalEngine, _: &BTreeMap<IndexKind, RawTable>) -> ResultSet {
            ResultSet::default()
        }
        let mut registry = ModelRegistry::builtin();
        registry.register(
            "empty",
            ModelSpec {
                display_name: "Empty".into(),
                input: "empty".into(),
                indices: vec![IndexKind::Spx],
                processor: nothing,
            },
        );
        let spec = registry.get("empty").unwrap();
        let out = (spec.processor)(&SignalEngine::default(), &BTreeMap::new());
        assert!(out.is_empty());
        assert_eq!(registry.len(), 2);
    }
}
