//! Upstream Catalog Sources for SensorGate
//!
//! ## Overview
//!
//! A [`ReferenceCache`](sensorgate_core::ReferenceCache) only knows how to ask
//! a [`CatalogLoader`](sensorgate_core::CatalogLoader) for the complete
//! catalog. This crate provides loaders for the places catalogs actually
//! live:
//!
//! | Source | Feature | Typical use |
//! |--------|---------|-------------|
//! | [`http::HttpCatalogSource`] | `http` | the upstream registry's REST API |
//! | [`file::FileCatalogSource`] | always | static deployments, fixtures, offline fallback |
//!
//! ## Document Shapes
//!
//! Both sources accept the two shapes registries commonly return:
//!
//! ```json
//! [ { "id": "weather_station", ... }, ... ]
//! ```
//!
//! ```json
//! { "items": [ { "id": "weather_station", ... }, ... ], "total": 2 }
//! ```
//!
//! Any other top-level value is a decode error. Extra envelope fields are
//! ignored.
//!
//! ## Failure Reporting
//!
//! Every source reports failures as [`ConnectorError`]. At the cache seam
//! they collapse into [`LoadError`], which the cache treats uniformly:
//! the previous snapshot keeps being served.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use sensorgate_connectors::http::{HttpCatalogSource, HttpConfig};
//! use sensorgate_core::{CacheConfig, ReferenceCache};
//! use sensorgate_schemas::SourceTypeRecord;
//!
//! let config = HttpConfig::new("https://registry.example.com")
//!     .bearer_token("token")
//!     .timeout_secs(10);
//! let source = HttpCatalogSource::<SourceTypeRecord>::new(config, "/api/v1/source-types")?;
//!
//! let source_types = ReferenceCache::new(
//!     "source-types",
//!     source,
//!     |t: &SourceTypeRecord| t.id.clone(),
//!     CacheConfig::default(),
//! );
//! let station = source_types.get(&"weather_station".to_string())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod envelope;
pub mod file;

#[cfg(feature = "http")]
pub mod http;

pub use envelope::decode_catalog;
pub use file::FileCatalogSource;

#[cfg(feature = "http")]
pub use http::{AuthMethod, HttpCatalogSource, HttpConfig};

use sensorgate_core::LoadError;
use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Network or transport failure
    #[error("Request failed: {0}")]
    Request(String),

    /// Registry answered with an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Document was not a catalog of the expected record type
    #[error("Failed to decode {origin}: {message}")]
    Decode { origin: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConnectorError {
    /// Whether a retry can be expected to succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ConnectorError::Request(_) => true,
            ConnectorError::ServerError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<ConnectorError> for LoadError {
    fn from(err: ConnectorError) -> Self {
        LoadError::new(err.to_string())
    }
}
