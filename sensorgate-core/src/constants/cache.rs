//! Reference Cache Thresholds
//!
//! Defaults for catalog caches whose upstream registry changes rarely.

/// Age after which a bulk read reloads the snapshot (milliseconds).
pub const DEFAULT_INVALIDATE_AFTER_MS: u64 = 60 * 60 * 1000;

/// Age after which a keyed miss reloads the snapshot (milliseconds).
///
/// Newly registered entries become visible within a minute.
pub const DEFAULT_RETRY_AFTER_MS: u64 = 60 * 1000;

/// Maximum time a single catalog load may take (milliseconds).
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 30 * 1000;
