//! Cached series detail retrieval
//!
//! This module ensures an expanded detail record exists on disk for a
//! series. Records already present are never requested again; fresh
//! payloads are checked for an `id` field before they are written, so error
//! documents from the provider do not end up posing as cache hits.

use crate::cache::{CacheError, CacheStorage};
use crate::catalog::{CatalogError, CatalogProvider};
use crate::series::SeriesId;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while fetching or caching a detail record
#[derive(Debug, Error)]
pub enum DetailFetchError {
    /// The provider request itself failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The record could not be written to the cache
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// What [`DetailFetcher::ensure_cached`] did for one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A record was already on disk; no request was made
    CacheHit { path: PathBuf },
    /// The record was downloaded and written
    Stored { path: PathBuf },
    /// The provider answered with something that is not a detail record
    SkippedMalformed { reason: String },
}

/// A caching wrapper around a catalog provider's detail endpoint
pub(crate) struct DetailFetcher<'a, P>
where
    P: CatalogProvider + ?Sized,
{
    /// The underlying catalog provider
    provider: &'a P,
    /// Cache storage for detail records
    cache: &'a CacheStorage,
}

impl<'a, P> DetailFetcher<'a, P>
where
    P: CatalogProvider + ?Sized,
{
    pub fn new(provider: &'a P, cache: &'a CacheStorage) -> Self {
        Self { provider, cache }
    }

    /// Makes sure a detail record for `id` is on disk
    ///
    /// Existence of the cache file is the only check; its content is never
    /// inspected. On a miss, the detail document is requested and written
    /// verbatim if it passes [`validate_detail`].
    pub fn ensure_cached(&self, id: &SeriesId) -> Result<FetchOutcome, DetailFetchError> {
        if self.cache.contains(id) {
            debug!(%id, "Detail record already cached");
            return Ok(FetchOutcome::CacheHit {
                path: self.cache.path_for(id),
            });
        }

        let body = self.provider.series_details(id)?;

        if let Err(reason) = validate_detail(&body) {
            warn!(%id, %reason, "Not caching malformed detail response");
            return Ok(FetchOutcome::SkippedMalformed { reason });
        }

        let path = self.cache.store(id, &body)?;
        info!(%id, path = %path.display(), "Downloaded and saved details");

        Ok(FetchOutcome::Stored { path })
    }
}

/// Checks that a payload looks like a series detail document
///
/// The document must be a JSON object with a non-null `id`. TMDB error
/// bodies such as `{"success": false, "status_code": 34, ...}` fail this.
pub(crate) fn validate_detail(body: &str) -> Result<(), String> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| format!("response is not valid JSON: {}", e))?;

    let object = value
        .as_object()
        .ok_or_else(|| "response is not a JSON object".to_string())?;

    match object.get("id") {
        Some(id) if !id.is_null() => Ok(()),
        _ => match object.get("status_message").and_then(|m| m.as_str()) {
            Some(message) => Err(format!("provider error: {}", message)),
            None => Err("response has no id field".to_string()),
        },
    }
}
