//! JSON file catalog source
//!
//! Reads the whole file on every load, so edits on disk become visible on
//! the cache's next reload.

use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use sensorgate_core::{CatalogLoader, LoadError};

use crate::{envelope, ConnectorError};

/// Catalog stored as a JSON document on disk
pub struct FileCatalogSource<V> {
    path: PathBuf,
    _record: PhantomData<fn() -> V>,
}

impl<V: DeserializeOwned> FileCatalogSource<V> {
    /// Source reading `path`; the file need not exist yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the file
    pub fn fetch(&self) -> Result<Vec<V>, ConnectorError> {
        let text = std::fs::read_to_string(&self.path)?;
        let records = envelope::decode_catalog(&self.path.display().to_string(), &text)?;
        log::trace!("read {} records from {}", records.len(), self.path.display());
        Ok(records)
    }
}

impl<V: DeserializeOwned> CatalogLoader<V> for FileCatalogSource<V> {
    fn load(&self) -> Result<Vec<V>, LoadError> {
        self.fetch().map_err(LoadError::from)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

impl<V> fmt::Debug for FileCatalogSource<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileCatalogSource").field("path", &self.path).finish()
    }
}
