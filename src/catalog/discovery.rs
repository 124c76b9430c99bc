//! Discovery of recent series through the provider's filtered catalog search.

use super::{CatalogError, CatalogProvider, DiscoveredSeries, Genre};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Genres whose series are excluded from discovery
pub const EXCLUDED_GENRES: &[&str] = &[
    "Animation",
    "Family",
    "Kids",
    "News",
    "Reality",
    "Sci-Fi & Fantasy",
    "Soap",
    "Talk",
    "Western",
];

/// Highest page the provider's discovery endpoint serves
pub const MAX_DISCOVER_PAGES: u32 = 500;

/// Filter profile of a discovery run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryProfile {
    /// ISO 3166-1 country code series must originate from
    pub origin_country: String,
    /// Earliest first air date to include
    pub min_first_air_date: NaiveDate,
    /// Provider sort expression
    pub sort_by: String,
    /// Genre names to exclude, translated to provider ids at run time
    pub excluded_genres: Vec<String>,
}

impl Default for DiscoveryProfile {
    fn default() -> Self {
        Self {
            origin_country: "US".to_string(),
            min_first_air_date: NaiveDate::from_ymd_opt(2025, 5, 1)
                .expect("2025-05-01 is a valid calendar date"),
            sort_by: "popularity.desc".to_string(),
            excluded_genres: EXCLUDED_GENRES.iter().map(|g| g.to_string()).collect(),
        }
    }
}

/// A discovery query with genre names already resolved to provider ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryQuery {
    pub origin_country: String,
    pub min_first_air_date: NaiveDate,
    pub sort_by: String,
    /// Excluded genre ids, in exclusion list order
    pub without_genres: Vec<u32>,
}

impl DiscoveryQuery {
    /// Combines a profile with the translated exclusion ids
    pub fn new(profile: &DiscoveryProfile, without_genres: Vec<u32>) -> Self {
        Self {
            origin_country: profile.origin_country.clone(),
            min_first_air_date: profile.min_first_air_date,
            sort_by: profile.sort_by.clone(),
            without_genres,
        }
    }

    /// Comma separated genre ids as expected by `without_genres`
    pub fn without_genres_param(&self) -> String {
        self.without_genres
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Query string parameters for the given page
    pub fn params(&self, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("with_origin_country", self.origin_country.clone()),
            (
                "first_air_date.gte",
                self.min_first_air_date.format("%Y-%m-%d").to_string(),
            ),
            ("sort_by", self.sort_by.clone()),
            ("without_genres", self.without_genres_param()),
            ("page", page.to_string()),
        ]
    }
}

/// Translates genre names into provider ids, preserving the order of `names`
///
/// Fails with [`CatalogError::UnknownGenre`] on the first name the taxonomy
/// does not contain, since silently dropping it would widen the discovery.
pub(crate) fn exclusion_ids<S: AsRef<str>>(
    taxonomy: &[Genre],
    names: &[S],
) -> Result<Vec<u32>, CatalogError> {
    let id_by_name: HashMap<&str, u32> = taxonomy
        .iter()
        .map(|genre| (genre.name.as_str(), genre.id))
        .collect();

    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            id_by_name
                .get(name)
                .copied()
                .ok_or_else(|| CatalogError::UnknownGenre(name.to_string()))
        })
        .collect()
}

/// Runs the discovery query across all result pages
///
/// The genre taxonomy is fetched once, the profile's exclusion list is
/// translated, and pages are then requested sequentially until the total page
/// count reported by the first page is reached. Results past
/// [`MAX_DISCOVER_PAGES`] are unreachable and dropped with a warning.
/// `on_page` is called after every page with the page number and the number
/// of pages that will be requested.
pub(crate) fn discover_all<P, F>(
    provider: &P,
    profile: &DiscoveryProfile,
    mut on_page: F,
) -> Result<DiscoveredSeries, CatalogError>
where
    P: CatalogProvider + ?Sized,
    F: FnMut(u32, u32),
{
    let taxonomy = provider.genres()?;
    let without_genres = exclusion_ids(&taxonomy, &profile.excluded_genres)?;
    let query = DiscoveryQuery::new(profile, without_genres);

    debug!(
        without_genres = %query.without_genres_param(),
        origin_country = %query.origin_country,
        "Resolved discovery query"
    );

    let mut discovered = DiscoveredSeries::new();

    let first = provider.discover_page(&query, 1)?;
    let reported_pages = first.total_pages.max(1);
    let total_pages = reported_pages.min(MAX_DISCOVER_PAGES);
    if reported_pages > total_pages {
        warn!(
            reported_pages,
            limit = MAX_DISCOVER_PAGES,
            "Discovery spans more pages than the provider serves, truncating"
        );
    }
    for (id, name) in first.results {
        discovered.insert(id, name);
    }
    on_page(1, total_pages);

    for page in 2..=total_pages {
        let next = provider.discover_page(&query, page)?;
        for (id, name) in next.results {
            if !discovered.insert(id.clone(), name) {
                debug!(%id, page, "Series repeated across discovery pages");
            }
        }
        on_page(page, total_pages);
    }

    info!(
        count = discovered.len(),
        pages = total_pages,
        "Discovery finished"
    );

    Ok(discovered)
}
