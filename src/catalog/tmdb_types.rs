/// TMDB API response types for deserialization.
///
/// These structures mirror the JSON response format of the TMDB v3 API,
/// limited to the fields the pipeline reads.
use crate::series::SeriesId;
use serde::Deserialize;

/// Response of `GET /genre/tv/list`.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbGenreList {
    pub genres: Vec<TmdbGenre>,
}

/// One genre of the TV taxonomy.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbGenre {
    pub id: u32,
    pub name: String,
}

/// Response envelope of `GET /discover/tv`.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbDiscoverResponse {
    #[serde(default)]
    pub results: Vec<TmdbDiscoverResult>,
    /// Missing on some error-shaped answers, treated as a single page
    #[serde(default = "default_total_pages")]
    pub total_pages: u32,
}

/// A single series in a discovery result page.
#[derive(Debug, Deserialize)]
pub(super) struct TmdbDiscoverResult {
    pub id: SeriesId,
    /// Name in the original language (may be absent for sparse entries)
    #[serde(default)]
    pub original_name: String,
}

fn default_total_pages() -> u32 {
    1
}
