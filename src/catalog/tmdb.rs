/// TMDB catalog provider implementation.
use super::tmdb_types::{TmdbDiscoverResponse, TmdbGenreList};
use super::{CatalogError, CatalogProvider, DiscoverPage, DiscoveryQuery, Genre};
use crate::config::ProviderConfig;
use crate::series::SeriesId;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

/// Sub-resources appended to every detail request
pub(crate) const DETAIL_APPENDS: &[&str] = &[
    "credits",
    "keywords",
    "recommendations",
    "similar",
    "content_ratings",
    "videos",
    "images",
    "aggregate_credits",
    "reviews",
];

/// Catalog provider for the TMDB v3 API.
///
/// Every request carries the configured bearer token and asks for JSON.
pub(crate) struct TmdbClient {
    client: reqwest::blocking::Client,
    base_url: String,
    bearer_token: String,
}

impl TmdbClient {
    /// Creates a new TMDB client from the provider settings.
    pub fn new(config: &ProviderConfig) -> Result<Self, CatalogError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::RequestError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            bearer_token: config.bearer_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends an authenticated GET request.
    fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::blocking::Response, CatalogError> {
        trace!(url, ?query, "TMDB request");

        self.client
            .get(url)
            .bearer_auth(&self.bearer_token)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .map_err(|e| CatalogError::RequestError(e.to_string()))
    }

    /// Sends a GET request and decodes a successful JSON response.
    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let url = self.url(path);
        let response = self.get(&url, query)?;

        if !response.status().is_success() {
            return Err(CatalogError::HttpStatus {
                status: response.status().as_u16(),
                url,
            });
        }

        response
            .json()
            .map_err(|e| CatalogError::ParseError(e.to_string()))
    }
}

impl CatalogProvider for TmdbClient {
    fn genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let list: TmdbGenreList = self.get_json("/genre/tv/list", &[])?;

        debug!(count = list.genres.len(), "Fetched TV genre list");

        Ok(list
            .genres
            .into_iter()
            .map(|genre| Genre {
                id: genre.id,
                name: genre.name,
            })
            .collect())
    }

    fn discover_page(
        &self,
        query: &DiscoveryQuery,
        page: u32,
    ) -> Result<DiscoverPage, CatalogError> {
        let response: TmdbDiscoverResponse = self.get_json("/discover/tv", &query.params(page))?;

        debug!(
            page,
            total_pages = response.total_pages,
            results = response.results.len(),
            "Fetched discovery page"
        );

        Ok(DiscoverPage {
            results: response
                .results
                .into_iter()
                .map(|result| (result.id, result.original_name))
                .collect(),
            total_pages: response.total_pages,
        })
    }

    fn series_details(&self, id: &SeriesId) -> Result<String, CatalogError> {
        let url = self.url(&format!("/tv/{}", id));
        let response = self.get(&url, &[("append_to_response", DETAIL_APPENDS.join(","))])?;

        if !response.status().is_success() {
            debug!(%id, status = response.status().as_u16(), "Detail request was not successful");
        }

        response
            .text()
            .map_err(|e| CatalogError::RequestError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DiscoveryProfile;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "secret-token";

    fn provider_config(server: &MockServer) -> ProviderConfig {
        ProviderConfig {
            base_url: format!("{}/3", server.uri()),
            bearer_token: TOKEN.to_string(),
        }
    }

    fn authenticated_get(endpoint: &str) -> wiremock::MockBuilder {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .and(header("Authorization", format!("Bearer {}", TOKEN).as_str()))
            .and(header("Accept", "application/json"))
    }

    #[test]
    fn test_detail_appends() {
        assert_eq!(
            DETAIL_APPENDS.join(","),
            "credits,keywords,recommendations,similar,content_ratings,videos,images,aggregate_credits,reviews"
        );
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let client = TmdbClient::new(&ProviderConfig {
            base_url: "https://api.themoviedb.org/3".to_string(),
            bearer_token: "token".to_string(),
        })
        .unwrap();

        assert_eq!(
            client.url("/genre/tv/list"),
            "https://api.themoviedb.org/3/genre/tv/list"
        );
    }

    #[test]
    fn test_parse_discover_response() {
        let body = r#"{
            "page": 1,
            "results": [
                {"id": 250307, "name": "The Pitt", "original_name": "The Pitt", "popularity": 812.3},
                {"id": 95396, "original_name": "Severance"}
            ],
            "total_pages": 7,
            "total_results": 131
        }"#;

        let response: TmdbDiscoverResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.total_pages, 7);
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].id.as_str(), "250307");
        assert_eq!(response.results[1].original_name, "Severance");
    }

    #[test]
    fn test_parse_genre_list() {
        let body = r#"{"genres":[{"id":16,"name":"Animation"},{"id":10762,"name":"Kids"}]}"#;

        let list: TmdbGenreList = serde_json::from_str(body).unwrap();

        assert_eq!(list.genres.len(), 2);
        assert_eq!(list.genres[1].id, 10762);
        assert_eq!(list.genres[1].name, "Kids");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_genres_request_is_authenticated() {
        let server = MockServer::start().await;
        authenticated_get("/3/genre/tv/list")
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "genres": [{"id": 16, "name": "Animation"}, {"id": 10762, "name": "Kids"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = provider_config(&server);
        let genres = tokio::task::spawn_blocking(move || TmdbClient::new(&config)?.genres())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            genres,
            vec![
                Genre {
                    id: 16,
                    name: "Animation".to_string()
                },
                Genre {
                    id: 10762,
                    name: "Kids".to_string()
                },
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_discover_page_sends_query() {
        let server = MockServer::start().await;
        authenticated_get("/3/discover/tv")
            .and(query_param("with_origin_country", "US"))
            .and(query_param("first_air_date.gte", "2025-05-01"))
            .and(query_param("sort_by", "popularity.desc"))
            .and(query_param("without_genres", "16,10762"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 2,
                "results": [{"id": 250307, "original_name": "The Pitt"}],
                "total_pages": 3
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = provider_config(&server);
        let page = tokio::task::spawn_blocking(move || {
            let query = DiscoveryQuery::new(&DiscoveryProfile::default(), vec![16, 10762]);
            TmdbClient::new(&config)?.discover_page(&query, 2)
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(page.total_pages, 3);
        assert_eq!(
            page.results,
            vec![(SeriesId::from(250307u64), "The Pitt".to_string())]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_error_status_on_discovery_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/discover/tv"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "success": false,
                "status_code": 7,
                "status_message": "Invalid API key: You must be granted a valid key."
            })))
            .mount(&server)
            .await;

        let config = provider_config(&server);
        let result = tokio::task::spawn_blocking(move || {
            let query = DiscoveryQuery::new(&DiscoveryProfile::default(), vec![]);
            TmdbClient::new(&config)?.discover_page(&query, 1)
        })
        .await
        .unwrap();

        match result {
            Err(CatalogError::HttpStatus { status, url }) => {
                assert_eq!(status, 401);
                assert!(url.ends_with("/3/discover/tv"));
            }
            other => panic!("expected HTTP status error, got {:?}", other),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_error_status_on_genres_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/genre/tv/list"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let config = provider_config(&server);
        let result = tokio::task::spawn_blocking(move || TmdbClient::new(&config)?.genres())
            .await
            .unwrap();

        assert!(matches!(
            result,
            Err(CatalogError::HttpStatus { status: 503, .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_series_details_returns_body_of_error_response() {
        let server = MockServer::start().await;
        let body = r#"{"success":false,"status_code":34,"status_message":"The resource you requested could not be found."}"#;
        authenticated_get("/3/tv/1")
            .and(query_param("append_to_response", DETAIL_APPENDS.join(",").as_str()))
            .respond_with(ResponseTemplate::new(404).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let config = provider_config(&server);
        let fetched = tokio::task::spawn_blocking(move || {
            TmdbClient::new(&config)?.series_details(&SeriesId::from(1u64))
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(fetched, body);
    }
}
