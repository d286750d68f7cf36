//! Time management for the serving tier
//!
//! Provides clock abstraction for cache aging:
//! - Monotonic clock (for staleness intervals)
//! - System clock (wall time, may jump)
//! - Mock clock (for deterministic tests)
//!
//! and the half-open [`TimeSpan`] used for window queries.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MS_PER_SECOND;
use crate::errors::{WindowError, WindowResult};

pub use crate::traits::TimeSource;

/// Timestamp in milliseconds since epoch (or creation for monotonic sources)
pub type Timestamp = u64;

/// Monotonic time source backed by `std::time::Instant`
///
/// Starts at 0 on construction, always increases
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    /// Start a clock reading 0 now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> Timestamp {
        self.origin.elapsed().as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}

/// System wall clock time source
#[derive(Debug, Clone, Default)]
pub struct SystemTime;

impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Manually driven time source for testing
///
/// Clones share the same underlying counter, so a test can keep one handle
/// and hand another to the component under test.
#[derive(Debug, Clone, Default)]
pub struct MockTimeSource {
    timestamp: Arc<AtomicU64>,
}

impl MockTimeSource {
    /// Create a clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp: Arc::new(AtomicU64::new(timestamp)),
        }
    }

    /// Jump to `timestamp`, backwards included
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.store(timestamp, Ordering::SeqCst);
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.timestamp.fetch_add(ms, Ordering::SeqCst);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.timestamp.load(Ordering::SeqCst)
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}

/// Half-open instant interval `[start, end)` with `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSpan {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeSpan {
    /// Create a span, rejecting `start > end`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> WindowResult<Self> {
        if start > end {
            return Err(WindowError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Span of `length` ending at `end`
    ///
    /// Negative lengths are treated as zero. A start before the earliest
    /// representable instant saturates to it.
    pub fn ending_at(end: DateTime<Utc>, length: Duration) -> Self {
        let length = length.max(Duration::zero());
        Self {
            start: end.checked_sub_signed(length).unwrap_or(DateTime::<Utc>::MIN_UTC),
            end,
        }
    }

    /// Trailing window of `length` ending at the latest `grid` boundary not after `now`
    ///
    /// With a 60 s length on a 10 s grid, `now = 12:00:37` yields
    /// `[11:59:30, 12:00:30)`. A non-positive grid disables alignment.
    pub fn trailing(now: DateTime<Utc>, length: Duration, grid: Duration) -> Self {
        let grid_ms = grid.num_milliseconds();
        let end = if grid_ms > 0 {
            let aligned = now.timestamp_millis().div_euclid(grid_ms) * grid_ms;
            DateTime::from_timestamp_millis(aligned).unwrap_or(now)
        } else {
            now
        };
        Self::ending_at(end, length)
    }

    /// Inclusive start
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// `end - start`, never negative
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Length in (fractional) seconds
    pub fn duration_seconds(&self) -> f64 {
        self.duration().num_milliseconds() as f64 / MS_PER_SECOND as f64
    }

    /// Half-open membership test
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}
