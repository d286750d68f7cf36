//! Time Source Abstraction
//!
//! This module provides the `TimeSource` trait which abstracts the clock the
//! reference cache uses to age its snapshots.
//!
//! ## Design Goals
//!
//! - **Testability**: Staleness rules can be exercised without sleeping
//! - **Thread Safety**: A single source is read from every request thread
//! - **Flexibility**: Supports both wall clock and monotonic time
//!
//! ## Common Implementations
//!
//! - `MonotonicTime`: `Instant` based, immune to clock adjustments
//! - `SystemTime`: Wall clock time (may jump due to NTP)
//! - `MockTimeSource`: Controllable time for testing

use crate::time::Timestamp;

/// Source of time for the system
///
/// ## Implementation Requirements
///
/// - `now()` is called concurrently from request threads
/// - Timestamps must not overflow for the lifetime of the process
///
/// ## Example Implementation
///
/// ```rust
/// use sensorgate_core::traits::TimeSource;
/// use sensorgate_core::time::Timestamp;
///
/// struct FrozenClock(Timestamp);
///
/// impl TimeSource for FrozenClock {
///     fn now(&self) -> Timestamp {
///         self.0
///     }
///
///     fn is_wall_clock(&self) -> bool {
///         false
///     }
/// }
///
/// assert_eq!(FrozenClock(42).now(), 42);
/// ```
pub trait TimeSource: Send + Sync {
    /// Get current timestamp in milliseconds
    ///
    /// The epoch depends on the implementation:
    /// - Monotonic sources: milliseconds since the source was created
    /// - Wall clock sources: milliseconds since Unix epoch
    /// - Test sources: arbitrary starting point
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs monotonic)
    ///
    /// Wall clock time can be adjusted and may go backwards; the cache
    /// treats a backwards step as zero elapsed time and warns at
    /// construction when aged by a wall clock.
    fn is_wall_clock(&self) -> bool;
}
