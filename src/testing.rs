//! In-memory stand-ins for the media server and the catalog provider.

use crate::catalog::{CatalogError, CatalogProvider, DiscoverPage, DiscoveryQuery, Genre};
use crate::library::{LibraryError, LibraryItem, MediaServer};
use crate::series::SeriesId;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Catalog serving canned genres, discovery pages and detail bodies
pub(crate) struct FakeCatalog {
    genres: Vec<Genre>,
    pages: Vec<DiscoverPage>,
    details: HashMap<SeriesId, String>,
    genre_requests: Cell<usize>,
    page_requests: RefCell<Vec<u32>>,
    last_query: RefCell<Option<DiscoveryQuery>>,
    detail_requests: RefCell<Vec<SeriesId>>,
}

impl FakeCatalog {
    pub fn new(genres: Vec<Genre>) -> Self {
        Self {
            genres,
            pages: Vec::new(),
            details: HashMap::new(),
            genre_requests: Cell::new(0),
            page_requests: RefCell::new(Vec::new()),
            last_query: RefCell::new(None),
            detail_requests: RefCell::new(Vec::new()),
        }
    }

    /// Adds the next discovery page
    pub fn with_page(mut self, results: Vec<(u64, &str)>, total_pages: u32) -> Self {
        self.pages.push(DiscoverPage {
            results: results
                .into_iter()
                .map(|(id, name)| (SeriesId::from(id), name.to_string()))
                .collect(),
            total_pages,
        });
        self
    }

    /// Registers the detail body returned for `id`
    pub fn with_details(mut self, id: u64, body: &str) -> Self {
        self.details.insert(SeriesId::from(id), body.to_string());
        self
    }

    pub fn genre_requests(&self) -> usize {
        self.genre_requests.get()
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.page_requests.borrow().clone()
    }

    pub fn last_query(&self) -> Option<DiscoveryQuery> {
        self.last_query.borrow().clone()
    }

    pub fn detail_requests(&self) -> Vec<SeriesId> {
        self.detail_requests.borrow().clone()
    }
}

impl CatalogProvider for FakeCatalog {
    fn genres(&self) -> Result<Vec<Genre>, CatalogError> {
        self.genre_requests.set(self.genre_requests.get() + 1);
        Ok(self.genres.clone())
    }

    fn discover_page(
        &self,
        query: &DiscoveryQuery,
        page: u32,
    ) -> Result<DiscoverPage, CatalogError> {
        self.page_requests.borrow_mut().push(page);
        *self.last_query.borrow_mut() = Some(query.clone());

        self.pages
            .get(page as usize - 1)
            .cloned()
            .ok_or_else(|| CatalogError::HttpStatus {
                status: 422,
                url: format!("/discover/tv?page={}", page),
            })
    }

    fn series_details(&self, id: &SeriesId) -> Result<String, CatalogError> {
        self.detail_requests.borrow_mut().push(id.clone());

        self.details
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::RequestError(format!("connection refused for {}", id)))
    }
}

/// Media server holding a fixed list of items
pub(crate) struct FakeServer {
    items: Vec<LibraryItem>,
    item_requests: RefCell<Vec<String>>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            item_requests: RefCell::new(Vec::new()),
        }
    }

    /// Adds a series, optionally linked to a TMDB id
    pub fn with_series(self, id: &str, name: &str, tmdb: Option<&str>) -> Self {
        self.with_item(id, name, "Series", tmdb)
    }

    pub fn with_item(mut self, id: &str, name: &str, item_type: &str, tmdb: Option<&str>) -> Self {
        let mut provider_ids = HashMap::new();
        if let Some(tmdb) = tmdb {
            provider_ids.insert("Tmdb".to_string(), tmdb.to_string());
        }
        self.items.push(LibraryItem {
            id: id.to_string(),
            name: name.to_string(),
            item_type: item_type.to_string(),
            provider_ids,
        });
        self
    }

    pub fn item_requests(&self) -> Vec<String> {
        self.item_requests.borrow().clone()
    }
}

impl MediaServer for FakeServer {
    /// Mirrors the server listing, which omits provider ids
    fn list_series(&self) -> Result<Vec<LibraryItem>, LibraryError> {
        Ok(self
            .items
            .iter()
            .map(|item| LibraryItem {
                provider_ids: HashMap::new(),
                ..item.clone()
            })
            .collect())
    }

    fn get_item(&self, item_id: &str) -> Result<LibraryItem, LibraryError> {
        self.item_requests.borrow_mut().push(item_id.to_string());

        self.items
            .iter()
            .find(|item| item.id == item_id)
            .cloned()
            .ok_or_else(|| LibraryError::RequestError(format!("HTTP 404 for item {}", item_id)))
    }
}
