//! Constants for SensorGate Core
//!
//! This module provides centralized, documented constants used throughout
//! the SensorGate system.
//!
//! ## Organization
//!
//! Constants are grouped by domain:
//! - **Time**: Unit conversions
//! - **Quality**: Completeness thresholds and monitoring windows
//! - **Window**: Bucket budget and default spans
//! - **Cache**: Staleness and retry thresholds
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Use descriptive names that include units

/// Time unit conversions.
pub mod time;

/// Completeness thresholds for health classification.
pub mod quality;

/// Window resolution defaults.
pub mod window;

/// Reference cache thresholds.
pub mod cache;

pub use time::{
    MS_PER_SECOND, SECONDS_PER_MINUTE, SECONDS_PER_HOUR, SECONDS_PER_DAY, SECONDS_PER_WEEK,
};

pub use quality::{
    COMPLETENESS_DISCONNECTED, COMPLETENESS_FINE, COMPLETENESS_OK, MONITOR_GRID_S, MONITOR_WINDOW_S,
};

pub use window::{DEFAULT_SPAN_DAYS, DEFAULT_WINDOW_COUNT, MAX_BUCKETS, MAX_SPAN_DAYS};

pub use cache::{DEFAULT_INVALIDATE_AFTER_MS, DEFAULT_RETRY_AFTER_MS, DEFAULT_LOAD_TIMEOUT_MS};
