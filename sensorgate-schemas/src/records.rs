//! Catalog record types
//!
//! These are the values held by the serving layer's reference caches. Field
//! names follow the upstream registry's JSON.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sensorgate_core::{ChannelSpec, SourceSpec};

use crate::SchemaError;

/// A source type: a kind of device and the channels it delivers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTypeRecord {
    /// Registry identifier, the cache key
    pub id: String,

    /// Human readable name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Channels with their nominal frequencies
    #[serde(default)]
    pub channels: Vec<ChannelSpec>,
}

impl SourceTypeRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            channels: Vec::new(),
        }
    }

    pub fn with_channel(mut self, channel: ChannelSpec) -> Self {
        self.channels.push(channel);
        self
    }

    /// The completeness specification for sources of this type
    pub fn spec(&self) -> SourceSpec {
        SourceSpec {
            kind: self.id.clone(),
            channels: self.channels.clone(),
        }
    }

    /// Reject records the completeness monitor could not evaluate sensibly
    ///
    /// Requires a non-empty id, unique channel ids and finite positive
    /// frequencies.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.id.trim().is_empty() {
            return Err(SchemaError::ValidationError("source type id is empty".into()));
        }

        let mut seen = HashSet::with_capacity(self.channels.len());
        for channel in &self.channels {
            if !seen.insert(channel.id.as_str()) {
                return Err(SchemaError::ValidationError(format!(
                    "{}: duplicate channel {}",
                    self.id, channel.id
                )));
            }
            if !(channel.frequency_hz.is_finite() && channel.frequency_hz > 0.0) {
                return Err(SchemaError::ValidationError(format!(
                    "{}: channel {} has frequency {} Hz",
                    self.id, channel.id, channel.frequency_hz
                )));
            }
        }
        Ok(())
    }
}

impl From<&SourceTypeRecord> for SourceSpec {
    fn from(record: &SourceTypeRecord) -> Self {
        record.spec()
    }
}

impl From<SourceTypeRecord> for SourceSpec {
    fn from(record: SourceTypeRecord) -> Self {
        SourceSpec {
            kind: record.id,
            channels: record.channels,
        }
    }
}

/// A registered source (one physical device)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Registry identifier, the cache key
    pub id: String,

    pub name: String,

    /// Id of the [`SourceTypeRecord`] describing its channels
    #[serde(alias = "type")]
    pub source_type_id: String,
}

impl SourceRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        source_type_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source_type_id: source_type_id.into(),
        }
    }
}
