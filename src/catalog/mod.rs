//! Metadata provider catalog access.
//!
//! This module defines the [`CatalogProvider`] seam used by the pipeline to
//! read the provider's genre taxonomy, page through discovery results and
//! download expanded series details, plus the TMDB implementation of it.
mod discovery;
mod tmdb;
mod tmdb_types;

pub use discovery::{DiscoveryProfile, DiscoveryQuery, EXCLUDED_GENRES, MAX_DISCOVER_PAGES};
pub(crate) use discovery::discover_all;
pub(crate) use tmdb::TmdbClient;

use crate::series::SeriesId;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur while talking to the metadata provider.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Request to the metadata provider failed
    #[error("Request failed: {0}")]
    RequestError(String),

    /// The provider answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// Failed to parse the provider's JSON response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// A genre of the exclusion list is absent from the provider taxonomy
    #[error("Genre '{0}' is not part of the provider's genre list")]
    UnknownGenre(String),
}

/// One entry of the provider's genre taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// A single page of discovery results.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverPage {
    /// Series on this page, in provider order
    pub results: Vec<(SeriesId, String)>,
    /// Total number of pages the query spans
    pub total_pages: u32,
}

/// Series found by a discovery query, keyed by identifier.
///
/// Insertion follows a last-write-wins policy: a repeated identifier keeps the
/// position of its first arrival but takes the most recent name. Iteration
/// yields first-arrival order, which is not a ranking consumers may rely on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveredSeries {
    order: Vec<SeriesId>,
    names: HashMap<SeriesId, String>,
}

impl DiscoveredSeries {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a series, returning `true` if the identifier was not present yet
    pub fn insert(&mut self, id: SeriesId, name: String) -> bool {
        if self.names.insert(id.clone(), name).is_some() {
            return false;
        }
        self.order.push(id);
        true
    }

    /// Number of distinct identifiers
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Display name recorded for the identifier
    pub fn name(&self, id: &SeriesId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Identifiers in first-arrival order
    pub fn ids(&self) -> impl Iterator<Item = &SeriesId> {
        self.order.iter()
    }

    /// Identifier and name pairs in first-arrival order
    pub fn iter(&self) -> impl Iterator<Item = (&SeriesId, &str)> {
        self.order
            .iter()
            .map(|id| (id, self.names.get(id).map(String::as_str).unwrap_or_default()))
    }
}

/// Trait for metadata providers offering a TV catalog.
///
/// Implementors issue one request per call; pagination and caching are
/// layered on top by the callers.
pub(crate) trait CatalogProvider {
    /// Fetches the complete TV genre taxonomy.
    fn genres(&self) -> Result<Vec<Genre>, CatalogError>;

    /// Fetches one page of discovery results for the given query.
    ///
    /// Pages are 1-based.
    fn discover_page(&self, query: &DiscoveryQuery, page: u32)
    -> Result<DiscoverPage, CatalogError>;

    /// Fetches the expanded detail document of a series.
    ///
    /// The response body is returned verbatim regardless of HTTP status, so
    /// that the caller decides whether the payload is worth keeping. Only
    /// transport failures are errors.
    fn series_details(&self, id: &SeriesId) -> Result<String, CatalogError>;
}
