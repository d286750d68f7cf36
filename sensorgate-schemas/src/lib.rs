//! Catalog Records and Source-Kind Definitions for SensorGate
//!
//! ## Overview
//!
//! The upstream registry describes two catalogs the serving layer caches:
//!
//! - **Source types**: a kind of device and the channels it delivers, each
//!   with its nominal sampling frequency and unit
//! - **Sources**: individual registered devices, each pointing at a type
//!
//! This crate holds the record types for both catalogs, a set of default
//! source kinds shipped as embedded JSON, and a thread-safe
//! [`SourceKindRegistry`] for deployments that run without an upstream
//! registry or need a fallback table.
//!
//! ## Source Kind Format
//!
//! ```json
//! {
//!   "id": "weather_station",
//!   "name": "Weather station",
//!   "channels": [
//!     { "id": "temperature", "frequency_hz": 1.0, "unit": "celsius" },
//!     { "id": "wind_speed",  "frequency_hz": 4.0, "unit": "m/s" }
//!   ]
//! }
//! ```
//!
//! The same document shape is what the upstream registry returns per source
//! type, so records read from either place are interchangeable.
//!
//! ## Usage Example
//!
//! ```rust
//! use sensorgate_schemas::SourceKindRegistry;
//!
//! let registry = SourceKindRegistry::with_defaults()?;
//! let spec = registry.spec("weather_station")?;
//!
//! assert_eq!(spec.channels.len(), 7);
//! assert_eq!(spec.channel("wind_speed").unwrap().frequency_hz, 4.0);
//! # Ok::<(), sensorgate_schemas::SchemaError>(())
//! ```

pub mod kinds;
pub mod records;
pub mod registry;

pub use records::{SourceRecord, SourceTypeRecord};
pub use registry::SourceKindRegistry;

/// Catalog and registry errors
#[derive(Debug, thiserror_no_std::Error)]
pub enum SchemaError {
    #[error("Failed to parse {origin}: {message}")]
    ParseError { origin: String, message: String },

    #[error("Source kind not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Registry lock poisoned")]
    LockPoisoned,
}
