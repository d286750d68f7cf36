//! Time-Related Constants
//!
//! This module defines time unit conversions used throughout the SensorGate
//! system for bucket sizes, staleness thresholds and window spans.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: i64 = 60;

/// Seconds per hour.
pub const SECONDS_PER_HOUR: i64 = SECONDS_PER_MINUTE * 60;

/// Seconds per day.
pub const SECONDS_PER_DAY: i64 = SECONDS_PER_HOUR * 24;

/// Seconds per week.
pub const SECONDS_PER_WEEK: i64 = SECONDS_PER_DAY * 7;

/// Days in the default lookback span.
///
/// Leap days are ignored: a "year" is always 365 days.
pub const DAYS_PER_YEAR: i64 = 365;
