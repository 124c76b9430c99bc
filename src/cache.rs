//! Cache storage module
//!
//! This module provides the on-disk store for series detail records. Each
//! record lives in its own `{identifier}.json` file inside one directory, and
//! the existence of that file is the only validity signal: entries never
//! expire and are never rewritten in place.

use crate::series::SeriesId;
use crate::temp::create_temp_file_in;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to create or access cache directory
    #[error("Failed to create cache directory at {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write cached data
    #[error("Failed to write cache file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A directory of raw JSON documents keyed by series identifier
#[derive(Debug, Clone)]
pub(crate) struct CacheStorage {
    /// The directory where cached data is stored
    cache_dir: PathBuf,
}

impl CacheStorage {
    /// Opens the cache rooted at `cache_dir`, creating the directory if needed
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let cache = CacheStorage::open("data/tmdb/details_by_ids")?;
    /// ```
    pub fn open(cache_dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let cache_dir = cache_dir.into();

        fs::create_dir_all(&cache_dir).map_err(|e| CacheError::DirectoryCreationFailed {
            path: cache_dir.clone(),
            source: e,
        })?;

        Ok(Self { cache_dir })
    }

    /// Returns the file path used for the given identifier
    ///
    /// [`SeriesId`] only admits characters that are safe in file names, so
    /// the identifier is used as the file stem unchanged.
    pub fn path_for(&self, identifier: &SeriesId) -> PathBuf {
        self.cache_dir.join(format!("{}.json", identifier))
    }

    /// Checks whether a record for the identifier is already stored
    pub fn contains(&self, identifier: &SeriesId) -> bool {
        self.path_for(identifier).is_file()
    }

    /// Stores a document under the given identifier and returns its path
    ///
    /// The content is written to a temporary file in the cache directory and
    /// renamed into place, so an interrupted run never leaves a truncated
    /// record behind that later runs would mistake for a cache hit.
    pub fn store(&self, identifier: &SeriesId, content: &str) -> Result<PathBuf, CacheError> {
        let file_path = self.path_for(identifier);
        let write_failed = |source| CacheError::WriteFailed {
            path: file_path.clone(),
            source,
        };

        let temp = create_temp_file_in(&self.cache_dir, identifier.as_str(), "tmp")
            .map_err(write_failed)?;
        fs::write(temp.path(), content).map_err(write_failed)?;
        temp.persist(&file_path).map_err(write_failed)?;

        Ok(file_path)
    }
}
