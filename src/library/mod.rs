//! Media server library access.
//!
//! This module reads the user's series from the media server and resolves
//! each of them to the metadata provider's identifier. The [`MediaServer`]
//! trait is the seam the pipeline talks to; [`JellyfinClient`] is the real
//! implementation.
mod jellyfin;
mod jellyfin_types;

pub(crate) use jellyfin::{ClientIdentity, JellyfinClient};

use crate::series::SeriesId;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Key of the metadata provider inside an item's `ProviderIds`
pub const PROVIDER_KEY: &str = "Tmdb";

/// Item type the library listing is restricted to
pub const SERIES_ITEM_TYPE: &str = "Series";

/// Errors that can occur while reading the media server library.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The server rejected the credentials
    #[error("Authentication as '{username}' failed: {reason}")]
    AuthenticationFailed { username: String, reason: String },

    /// Request to the media server failed
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Failed to parse the server's JSON response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),
}

/// A media server item, reduced to the fields the pipeline reads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LibraryItem {
    /// Server-internal item identifier
    pub id: String,
    pub name: String,
    /// Item type such as `Series` or `Movie`
    pub item_type: String,
    /// Linked external identifiers, keyed by provider name
    pub provider_ids: HashMap<String, String>,
}

impl LibraryItem {
    /// Looks up the provider identifier under `provider_key`
    ///
    /// An exact key match wins. Otherwise provider names are compared
    /// case-insensitively since servers are not consistent about `Tmdb`
    /// versus `TMDB`. Blank or malformed values count as missing.
    pub fn provider_id(&self, provider_key: &str) -> Option<SeriesId> {
        let value = match self.provider_ids.get(provider_key) {
            Some(value) => value,
            None => {
                let mut candidates: Vec<(&String, &String)> = self
                    .provider_ids
                    .iter()
                    .filter(|(key, _)| key.eq_ignore_ascii_case(provider_key))
                    .collect();
                // Deterministic pick when several spellings are present
                candidates.sort();
                candidates.first()?.1
            }
        };

        SeriesId::parse(value)
    }
}

/// A library series resolved to the metadata provider
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSeries {
    pub item_id: String,
    pub name: String,
    pub series_id: SeriesId,
}

/// The user's series, split into resolved and unresolvable entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchedSeries {
    /// Series with a provider link, in server listing order
    pub resolved: Vec<ResolvedSeries>,
    /// Series lacking a provider link
    pub skipped: Vec<LibraryItem>,
}

impl WatchedSeries {
    /// Provider identifiers of the resolved series, in listing order
    pub fn series_ids(&self) -> impl Iterator<Item = &SeriesId> {
        self.resolved.iter().map(|series| &series.series_id)
    }
}

/// Trait for media servers exposing a searchable library.
pub(crate) trait MediaServer {
    /// Lists every item of type `Series` in the user's library.
    fn list_series(&self) -> Result<Vec<LibraryItem>, LibraryError>;

    /// Fetches a single item with its full metadata, including provider ids.
    fn get_item(&self, item_id: &str) -> Result<LibraryItem, LibraryError>;
}

/// Collects the user's series and resolves them to provider identifiers
///
/// The listing endpoint does not reliably include provider ids, so each
/// series is fetched individually. Series without a link under
/// `provider_key` are not fatal: they are logged and returned in
/// [`WatchedSeries::skipped`].
pub(crate) fn collect_watched_series<S>(
    server: &S,
    provider_key: &str,
) -> Result<WatchedSeries, LibraryError>
where
    S: MediaServer + ?Sized,
{
    let mut watched = WatchedSeries::default();

    let listed = server.list_series()?;
    debug!(count = listed.len(), "Listed library series");

    for listed_item in listed
        .into_iter()
        .filter(|item| item.item_type == SERIES_ITEM_TYPE)
    {
        let item = server.get_item(&listed_item.id)?;

        match item.provider_id(provider_key) {
            Some(series_id) => watched.resolved.push(ResolvedSeries {
                item_id: item.id,
                name: item.name,
                series_id,
            }),
            None => {
                warn!(
                    item_id = %item.id,
                    name = %item.name,
                    provider = provider_key,
                    "Skipping series without usable provider id"
                );
                watched.skipped.push(item);
            }
        }
    }

    Ok(watched)
}
