//! Bulk catalog loading
//!
//! A loader fetches the complete catalog from the upstream registry in one
//! call. It may block on network I/O and it may fail; the reference cache
//! decides what to do about either.

use crate::errors::LoadError;

/// Bulk fetch of every record in an upstream catalog
///
/// Implemented for any `Fn() -> Result<Vec<V>, LoadError>` closure, which
/// keeps test doubles to one line. Connector crates implement it for real
/// transports.
pub trait CatalogLoader<V>: Send + Sync {
    /// Fetch every record currently registered upstream
    fn load(&self) -> Result<Vec<V>, LoadError>;

    /// Short label used in log lines
    fn describe(&self) -> String {
        "catalog".to_string()
    }
}

impl<V, F> CatalogLoader<V> for F
where
    F: Fn() -> Result<Vec<V>, LoadError> + Send + Sync,
{
    fn load(&self) -> Result<Vec<V>, LoadError> {
        self()
    }
}
