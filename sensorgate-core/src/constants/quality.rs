//! Completeness Thresholds and Monitoring Windows
//!
//! This module defines the percentage boundaries that turn a channel's
//! received/expected ratio into a discrete health state, and the default
//! evaluation window used by the reference deployment.

// ===== HEALTH STATE BOUNDARIES =====

/// Lower bound (exclusive) of the FINE state.
///
/// A channel that delivered more than 95% of its expected samples in the
/// window is considered fully healthy.
pub const COMPLETENESS_FINE: f64 = 0.95;

/// Lower bound (exclusive) of the OK state.
///
/// Between 80% and 95% the channel is usable but losing data.
/// At or below 80% (and above zero) the channel is in WARNING.
pub const COMPLETENESS_OK: f64 = 0.80;

/// Completeness at or below which a channel is DISCONNECTED.
pub const COMPLETENESS_DISCONNECTED: f64 = 0.0;

// ===== EVALUATION WINDOW =====

/// Length of the trailing health window (seconds).
pub const MONITOR_WINDOW_S: i64 = 60;

/// Grid the health window end is aligned to (seconds).
///
/// The window ends at the latest fully elapsed grid boundary, so the
/// bucket still being written is never counted.
pub const MONITOR_GRID_S: i64 = 10;
