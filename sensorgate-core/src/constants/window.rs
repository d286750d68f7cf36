//! Window Resolution Defaults

/// Number of buckets a derived resolution aims for.
///
/// Also the number of buckets used to build a span from a bucket size when
/// the caller gives no start.
pub const DEFAULT_WINDOW_COUNT: u32 = 100;

/// Upper bound on buckets in a single resolution.
pub const MAX_BUCKETS: u64 = 1000;

/// Lookback used when the caller gives neither start nor bucket (days).
pub const DEFAULT_SPAN_DAYS: i64 = super::time::DAYS_PER_YEAR;

/// Largest accepted `default_span_days` (a century).
pub const MAX_SPAN_DAYS: i64 = 100 * super::time::DAYS_PER_YEAR;
