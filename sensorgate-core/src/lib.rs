//! Core policy engine for SensorGate
//!
//! Decides, on every request path of a sensor-data serving API:
//! - whether a cached catalog snapshot is fresh enough to answer without
//!   calling the upstream registry ([`ReferenceCache`])
//! - whether a source delivered enough samples in a recent window to be
//!   considered healthy ([`CompletenessMonitor`])
//! - which span and bucket size answer a range query within the result-size
//!   budget ([`WindowResolver`])
//!
//! The three components never call each other. HTTP routing, storage queries
//! and authentication live in the serving layer, which calls in here.
//!
//! ```no_run
//! use chrono::Utc;
//! use sensorgate_core::{WindowResolver, WindowRequest};
//!
//! let resolver = WindowResolver::default();
//! let request = WindowRequest::parse(None, None, Some("1min")).unwrap();
//!
//! match resolver.resolve_request(&request, Utc::now()) {
//!     Ok(resolution) => {}, // aggregate resolution.span by resolution.bucket
//!     Err(e) if e.kind().is_client_error() => {}, // reply 400
//!     Err(e) => {}, // misconfiguration
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod completeness;
pub mod config;
pub mod constants;
pub mod errors;
pub mod time;
pub mod traits;
pub mod window;

// Public API
pub use cache::{CacheStats, ReferenceCache};
pub use completeness::{
    ChannelReport, ChannelSpec, CompletenessMonitor, HealthState, SourceReport, SourceSpec,
};
pub use config::{CacheConfig, MonitorConfig, SensorGateConfig, WindowConfig};
pub use errors::{
    CacheError, CacheResult, ConfigError, ErrorKind, LoadError, WindowError, WindowResult,
};
pub use time::{MockTimeSource, MonotonicTime, SystemTime, TimeSpan, Timestamp};
pub use traits::{CatalogLoader, SampleCounter, TimeSource};
pub use window::{BucketSize, Resolution, WindowRequest, WindowResolver};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
