//! Core Traits and Seams for SensorGate
//!
//! The policy engines in this crate never talk to the network, a clock or a
//! database directly. Each collaborator sits behind a trait so the serving
//! layer decides what to plug in and tests can substitute deterministic
//! doubles.
//!
//! ## Module Organization
//!
//! - [`time`] - Time source abstraction used for staleness checks
//! - [`loader`] - Bulk catalog loading consumed by the reference cache
//! - [`storage`] - Windowed sample counting consumed by the completeness monitor
//!
//! ## Usage Example
//!
//! ```rust
//! use sensorgate_core::traits::CatalogLoader;
//! use sensorgate_core::LoadError;
//!
//! // Any closure returning a collection of records is a loader
//! let loader = || -> Result<Vec<String>, LoadError> {
//!     Ok(vec!["thermometer".to_string(), "barometer".to_string()])
//! };
//!
//! assert_eq!(loader.load().unwrap().len(), 2);
//! ```

pub mod loader;
pub mod storage;
pub mod time;

pub use loader::CatalogLoader;
pub use storage::SampleCounter;
pub use time::TimeSource;
