//! Source-Kind Registry
//!
//! A thread-safe table of source kinds. Deployments without an upstream
//! registry serve completeness queries from it directly; others use it as
//! the fallback when a source type is missing from the cached catalog.

use std::collections::HashMap;
use std::sync::RwLock;

use sensorgate_core::SourceSpec;

use crate::kinds;
use crate::{SchemaError, SourceTypeRecord};

/// Thread-safe source kind table keyed by kind id
pub struct SourceKindRegistry {
    kinds: RwLock<HashMap<String, SourceTypeRecord>>,
}

impl SourceKindRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            kinds: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry holding the embedded default kinds
    pub fn with_defaults() -> Result<Self, SchemaError> {
        let registry = Self::new();
        registry.load_defaults()?;
        Ok(registry)
    }

    /// Add a new kind; an id already present is rejected
    pub fn register(&self, record: SourceTypeRecord) -> Result<(), SchemaError> {
        record.validate()?;

        let mut kinds = self.kinds.write().map_err(|_| SchemaError::LockPoisoned)?;
        if kinds.contains_key(&record.id) {
            return Err(SchemaError::ValidationError(format!(
                "source kind {} already registered",
                record.id
            )));
        }
        log::debug!("registered source kind {} ({} channels)", record.id, record.channels.len());
        kinds.insert(record.id.clone(), record);
        Ok(())
    }

    /// Add or overwrite a kind, returning the record it replaced
    pub fn upsert(&self, record: SourceTypeRecord) -> Result<Option<SourceTypeRecord>, SchemaError> {
        record.validate()?;

        let mut kinds = self.kinds.write().map_err(|_| SchemaError::LockPoisoned)?;
        Ok(kinds.insert(record.id.clone(), record))
    }

    /// Register one kind from its JSON document
    pub fn register_json(&self, origin: &str, text: &str) -> Result<(), SchemaError> {
        self.register(kinds::parse_kind(origin, text)?)
    }

    /// Copy of kind `id`
    pub fn get(&self, id: &str) -> Result<SourceTypeRecord, SchemaError> {
        let kinds = self.kinds.read().map_err(|_| SchemaError::LockPoisoned)?;

        kinds
            .get(id)
            .cloned()
            .ok_or_else(|| SchemaError::NotFound(id.to_string()))
    }

    /// Completeness specification of kind `id`
    pub fn spec(&self, id: &str) -> Result<SourceSpec, SchemaError> {
        self.get(id).map(SourceSpec::from)
    }

    /// Registered kind ids, sorted
    pub fn kinds(&self) -> Result<Vec<String>, SchemaError> {
        let kinds = self.kinds.read().map_err(|_| SchemaError::LockPoisoned)?;

        let mut ids: Vec<String> = kinds.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    pub fn len(&self) -> usize {
        self.kinds.read().map(|k| k.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load all embedded default kinds
    pub fn load_defaults(&self) -> Result<(), SchemaError> {
        for record in kinds::default_kinds()? {
            self.register(record)?;
        }
        Ok(())
    }
}

impl Default for SourceKindRegistry {
    fn default() -> Self {
        Self::new()
    }
}
