//! series_recom - Collect TMDB detail records for watched and newly aired series
//!
//! This library reads the series in a Jellyfin library, discovers recently
//! aired series through TMDB's catalog search, and makes sure an expanded
//! TMDB detail record for every one of them is cached on disk.

mod cache;
mod catalog;
pub mod config;
mod details;
mod library;
mod series;
mod temp;

#[cfg(test)]
mod testing;

use cache::CacheStorage;
use catalog::{CatalogProvider, TmdbClient, discover_all};
use details::DetailFetcher;
use library::{ClientIdentity, JellyfinClient, MediaServer, PROVIDER_KEY, collect_watched_series};
use std::collections::HashSet;
use tracing::info;

// Re-export error types
pub use cache::CacheError;
pub use catalog::CatalogError;
pub use config::ConfigError;
pub use details::DetailFetchError;
pub use library::LibraryError;

// Re-export domain types
pub use catalog::{
    DiscoveredSeries, DiscoveryProfile, DiscoveryQuery, EXCLUDED_GENRES, MAX_DISCOVER_PAGES,
};
pub use config::Config;
pub use details::FetchOutcome;
pub use library::{LibraryItem, ResolvedSeries, WatchedSeries};
pub use series::SeriesId;

use thiserror::Error;

/// Progress event emitted during a harvest run
///
/// These events allow library users to track progress and provide feedback
/// while the run is under way.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Reading the media server library
    LoadingLibrary { server_url: String },

    /// A library series has no provider link and will not be fetched
    SeriesSkipped { item_id: String, name: String },

    /// Library series resolved to provider identifiers
    LibraryLoaded { resolved: usize, skipped: usize },

    /// Querying the provider catalog
    DiscoveringSeries { profile: DiscoveryProfile },

    /// A discovery page arrived
    DiscoveryPage { page: u32, total_pages: u32 },

    /// Discovery finished
    DiscoveryComplete { count: usize },

    /// The combined fetch list is ready
    FetchPlanned { total: usize, duplicates: usize },

    /// A detail record was handled
    DetailProcessed {
        index: usize,
        total: usize,
        series_id: SeriesId,
        outcome: FetchOutcome,
    },

    /// Run complete
    Complete { summary: HarvestSummary },
}

/// Counters describing a finished harvest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    /// Library series resolved to a provider identifier
    pub watched: usize,
    /// Library series skipped for lack of a provider identifier
    pub skipped_library_items: usize,
    /// Distinct series returned by discovery
    pub discovered: usize,
    /// Identifiers left after combining both sources
    pub fetch_candidates: usize,
    /// Records already present before the run
    pub cache_hits: usize,
    /// Records downloaded and written in this run
    pub stored: usize,
    /// Provider responses rejected as malformed
    pub malformed: usize,
}

/// Top-level error type for harvest runs
#[derive(Debug, Error)]
pub enum SeriesRecomError {
    /// Error in the configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error while reading the media server library
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    /// Error while querying the provider catalog
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Error while fetching a detail record
    #[error("Detail fetch error: {0}")]
    DetailFetch(#[from] DetailFetchError),

    /// Error during cache operations
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Combines watched and discovered identifiers into one fetch list
///
/// Watched series come first, followed by discovered ones. An identifier
/// present in both sources, or repeated within one, is kept only at its first
/// occurrence. Returns the list and the number of dropped duplicates.
pub fn combine_series_ids<'a, W, D>(watched: W, discovered: D) -> (Vec<SeriesId>, usize)
where
    W: IntoIterator<Item = &'a SeriesId>,
    D: IntoIterator<Item = &'a SeriesId>,
{
    let mut seen = HashSet::new();
    let mut combined = Vec::new();
    let mut duplicates = 0;

    for id in watched.into_iter().chain(discovered) {
        if seen.insert(id) {
            combined.push(id.clone());
        } else {
            duplicates += 1;
        }
    }

    (combined, duplicates)
}

/// Runs a complete harvest
///
/// Logs into the media server, resolves the user's series, runs the
/// discovery query described by `profile`, and ensures a detail record is
/// cached for every identifier from both sources.
///
/// Progress events are emitted through the provided callback, allowing
/// library users to track progress, display status, or remain silent.
///
/// # Arguments
///
/// * `config` - Credentials, endpoints and cache location
/// * `profile` - Discovery filters
/// * `progress_callback` - Closure called with progress events
///
/// # Examples
///
/// ```no_run
/// use series_recom::{harvest, Config, DiscoveryProfile, ProgressEvent};
///
/// let config = Config::from_env().unwrap();
/// let summary = harvest(&config, &DiscoveryProfile::default(), |event| {
///     if let ProgressEvent::DetailProcessed { index, total, series_id, .. } = event {
///         println!("[{}/{}] {}", index + 1, total, series_id);
///     }
/// })
/// .unwrap();
///
/// println!("Stored {} new record(s)", summary.stored);
/// ```
pub fn harvest<F>(
    config: &Config,
    profile: &DiscoveryProfile,
    mut progress_callback: F,
) -> Result<HarvestSummary, SeriesRecomError>
where
    F: FnMut(ProgressEvent),
{
    let cache = CacheStorage::open(&config.cache_dir)?;
    let catalog = TmdbClient::new(&config.provider)?;

    progress_callback(ProgressEvent::LoadingLibrary {
        server_url: config.library.url.clone(),
    });
    let server = JellyfinClient::login(&config.library, ClientIdentity::default())?;

    harvest_with(&server, &catalog, &cache, profile, progress_callback)
}

/// Runs the pipeline against the given services
pub(crate) fn harvest_with<S, P, F>(
    server: &S,
    catalog: &P,
    cache: &CacheStorage,
    profile: &DiscoveryProfile,
    mut progress_callback: F,
) -> Result<HarvestSummary, SeriesRecomError>
where
    S: MediaServer + ?Sized,
    P: CatalogProvider + ?Sized,
    F: FnMut(ProgressEvent),
{
    let mut summary = HarvestSummary::default();

    let watched = collect_watched_series(server, PROVIDER_KEY)?;
    for item in &watched.skipped {
        progress_callback(ProgressEvent::SeriesSkipped {
            item_id: item.id.clone(),
            name: item.name.clone(),
        });
    }
    summary.watched = watched.resolved.len();
    summary.skipped_library_items = watched.skipped.len();
    progress_callback(ProgressEvent::LibraryLoaded {
        resolved: summary.watched,
        skipped: summary.skipped_library_items,
    });

    progress_callback(ProgressEvent::DiscoveringSeries {
        profile: profile.clone(),
    });
    let discovered = discover_all(catalog, profile, |page, total_pages| {
        progress_callback(ProgressEvent::DiscoveryPage { page, total_pages })
    })?;
    summary.discovered = discovered.len();
    progress_callback(ProgressEvent::DiscoveryComplete {
        count: summary.discovered,
    });

    let (to_fetch, duplicates) = combine_series_ids(watched.series_ids(), discovered.ids());
    summary.fetch_candidates = to_fetch.len();
    progress_callback(ProgressEvent::FetchPlanned {
        total: to_fetch.len(),
        duplicates,
    });

    let fetcher = DetailFetcher::new(catalog, cache);
    for (index, series_id) in to_fetch.iter().enumerate() {
        let outcome = fetcher.ensure_cached(series_id)?;

        match outcome {
            FetchOutcome::CacheHit { .. } => summary.cache_hits += 1,
            FetchOutcome::Stored { .. } => summary.stored += 1,
            FetchOutcome::SkippedMalformed { .. } => summary.malformed += 1,
        }

        progress_callback(ProgressEvent::DetailProcessed {
            index,
            total: to_fetch.len(),
            series_id: series_id.clone(),
            outcome,
        });
    }

    info!(
        watched = summary.watched,
        discovered = summary.discovered,
        stored = summary.stored,
        cache_hits = summary.cache_hits,
        malformed = summary.malformed,
        "Harvest complete"
    );

    progress_callback(ProgressEvent::Complete {
        summary: summary.clone(),
    });

    Ok(summary)
}
