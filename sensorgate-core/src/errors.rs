//! Error Types for Cache, Window and Configuration Failures
//!
//! ## Error Categories
//!
//! Every failure this crate produces falls into one of four kinds, exposed
//! through [`ErrorKind`] so the serving layer can pick a response code
//! without reading message text:
//!
//! ### Client input
//! - `WindowError::InvalidRange`: requested start lies after the end
//! - `WindowError::ResolutionTooFine`: too many buckets over too long a span
//! - `WindowError::InvalidTimestamp` / `WindowError::UnknownBucket`: unparsable query values
//!
//! ### Not found
//! - `CacheError::NotFound`: keyed lookup missed, even after a retry reload.
//!   This is an expected outcome, not an incident.
//!
//! ### Upstream
//! - `CacheError::UpstreamUnavailable`: the catalog loader failed and no
//!   snapshot was available to fall back on
//! - `CacheError::Timeout`: the loader did not answer within the configured timeout
//!
//! ### Internal
//! - `CacheError::LockPoisoned`, `WindowError::EmptyBucketTable`, `ConfigError`
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use sensorgate_core::{CacheError, ErrorKind};
//!
//! fn status_for(err: &CacheError) -> u16 {
//!     match err.kind() {
//!         ErrorKind::ClientInput => 400,
//!         ErrorKind::NotFound => 404,
//!         ErrorKind::Upstream => 503,
//!         ErrorKind::Internal => 500,
//!     }
//! }
//!
//! assert_eq!(status_for(&CacheError::NotFound("sensor-7".into())), 404);
//! ```

use core::time::Duration;

use chrono::{DateTime, Utc};
use thiserror_no_std::Error;

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Result type for window resolution
pub type WindowResult<T> = Result<T, WindowError>;

/// Coarse classification of a failure, used to map errors to responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller supplied an invalid combination of parameters
    ClientInput,
    /// Requested entry does not exist
    NotFound,
    /// Upstream collaborator failed or timed out
    Upstream,
    /// Misconfiguration or broken internal state
    Internal,
}

impl ErrorKind {
    /// True for failures caused by the request rather than the server
    pub fn is_client_error(self) -> bool {
        matches!(self, ErrorKind::ClientInput | ErrorKind::NotFound)
    }

    /// HTTP-equivalent status code for this kind
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::ClientInput => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Upstream => 503,
            ErrorKind::Internal => 500,
        }
    }
}

/// Failure reported by a catalog loader.
///
/// Network, parse and I/O failures from the various catalog sources all
/// collapse into a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct LoadError {
    message: String,
}

impl LoadError {
    /// Create a load error from any message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Human readable description of the failure
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Reference cache errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Loader failed and there was no previous snapshot to serve
    #[error("Upstream catalog unavailable: {0}")]
    UpstreamUnavailable(LoadError),

    /// Loader did not complete within the configured timeout
    #[error("Catalog load timed out after {0:?}")]
    Timeout(Duration),

    /// Key absent from the current snapshot
    #[error("Key not found: {0}")]
    NotFound(String),

    /// A thread panicked while holding the snapshot lock
    #[error("Cache lock poisoned")]
    LockPoisoned,
}

impl CacheError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CacheError::UpstreamUnavailable(_) | CacheError::Timeout(_) => ErrorKind::Upstream,
            CacheError::NotFound(_) => ErrorKind::NotFound,
            CacheError::LockPoisoned => ErrorKind::Internal,
        }
    }
}

impl From<LoadError> for CacheError {
    fn from(err: LoadError) -> Self {
        CacheError::UpstreamUnavailable(err)
    }
}

/// Window resolution errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WindowError {
    /// Start instant lies after the end instant
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange {
        /// Requested start
        start: DateTime<Utc>,
        /// Requested (or defaulted) end
        end: DateTime<Utc>,
    },

    /// Span divided by bucket size exceeds the bucket budget
    #[error("Resolution too fine: {buckets} buckets requested, at most {max} allowed")]
    ResolutionTooFine {
        /// Number of buckets the request would produce (rounded up)
        buckets: u64,
        /// Configured maximum
        max: u64,
    },

    /// Timestamp parameter is not ISO-8601
    #[error("Invalid timestamp '{0}': expected ISO-8601 / RFC 3339")]
    InvalidTimestamp(String),

    /// Bucket token is not one of the enumerated sizes
    #[error("Unknown bucket size '{0}'")]
    UnknownBucket(String),

    /// Resolver configured without any bucket sizes
    #[error("No bucket sizes configured")]
    EmptyBucketTable,

    /// Resolver configuration rejected by validation
    #[error("Invalid window config: {0}")]
    InvalidConfig(String),
}

impl WindowError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            WindowError::EmptyBucketTable | WindowError::InvalidConfig(_) => ErrorKind::Internal,
            _ => ErrorKind::ClientInput,
        }
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config document is malformed
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Config values are inconsistent
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Configuration problems are always internal
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Internal
    }
}
