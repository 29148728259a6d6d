//! Catalog search against the Google Books volumes API.

use reqwest::blocking::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{debug_enabled, with_trailing_slash, ReaderConfig};
use crate::error::{ReaderError, Result};
use crate::models::{CatalogItem, VolumeInfo};

pub trait SearchGateway: Send + Sync {
    fn search(&self, query: &str) -> Result<Vec<CatalogItem>>;
    fn book_info(&self, book_id: &str) -> Result<CatalogItem>;
}

pub struct GoogleBooksGateway {
    client: Client,
    base_url: String,
}

impl GoogleBooksGateway {
    pub fn new(config: &ReaderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(config.books_api_url.clone()),
        })
    }

    fn get_json(&self, url: &str) -> Result<Value> {
        let response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(ReaderError::Message(format!(
                "catalog request returned {} for {}",
                response.status(),
                url
            )));
        }
        Ok(response.json()?)
    }
}

impl SearchGateway for GoogleBooksGateway {
    fn search(&self, query: &str) -> Result<Vec<CatalogItem>> {
        let url = format!("{}volumes?q={}", self.base_url, urlencoding::encode(query));
        if debug_enabled() {
            log::info!("[reader-debug] catalog search url={}", url);
        }
        let data = self.get_json(&url)?;
        Ok(parse_volumes(&data))
    }

    fn book_info(&self, book_id: &str) -> Result<CatalogItem> {
        let url = format!("{}volumes/{}", self.base_url, urlencoding::encode(book_id));
        let data = self.get_json(&url)?;
        parse_volume(&data).ok_or_else(|| ReaderError::NotFound(format!("catalog book {}", book_id)))
    }
}

/// Reads the `items` array of a volumes response. A missing array means no hits.
pub fn parse_volumes(data: &Value) -> Vec<CatalogItem> {
    data.get("items")
        .and_then(|value| value.as_array())
        .map(|items| items.iter().filter_map(parse_volume).collect())
        .unwrap_or_default()
}

pub fn parse_volume(item: &Value) -> Option<CatalogItem> {
    let id = item.get("id").and_then(|value| value.as_str())?.to_string();
    let info = item.get("volumeInfo").cloned().unwrap_or(Value::Null);

    Some(CatalogItem {
        id,
        volume_info: VolumeInfo {
            title: json_string(&info, "title"),
            authors: json_strings(&info, "authors"),
            description: json_string(&info, "description"),
            categories: json_strings(&info, "categories"),
            publisher: json_string(&info, "publisher"),
            published_date: json_string(&info, "publishedDate"),
            page_count: info.get("pageCount").and_then(|value| value.as_i64()),
            thumbnail: info
                .get("imageLinks")
                .and_then(|value| value.get("thumbnail").or_else(|| value.get("smallThumbnail")))
                .and_then(|value| value.as_str())
                .map(|value| value.replace("http://", "https://")),
        },
    })
}

fn json_string(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|value| value.as_str())
        .map(|value| value.to_string())
}

fn json_strings(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(|value| value.as_array())
        .map(|values| {
            values
                .iter()
                .filter_map(|entry| entry.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// Result list and spinner state for the search screen.
pub struct BookSearch {
    gateway: Arc<dyn SearchGateway>,
    pub items: Vec<CatalogItem>,
    pub loading: bool,
}

impl BookSearch {
    pub fn new(gateway: Arc<dyn SearchGateway>) -> Self {
        Self {
            gateway,
            items: vec![],
            loading: true,
        }
    }

    /// Runs the start-up query the search screen opens with.
    pub fn search_default(&mut self, config: &ReaderConfig) {
        self.search(&config.default_query);
    }

    /// An empty query is ignored. A failed search leaves an empty list and
    /// stops the spinner; the failure is only logged.
    pub fn search(&mut self, query: &str) {
        if query.is_empty() {
            return;
        }
        match self.gateway.search(query) {
            Ok(items) => {
                if !items.is_empty() {
                    self.loading = false;
                }
                self.items = items;
            }
            Err(err) => {
                log::error!("search for {:?} failed: {}", query, err);
                self.items.clear();
                self.loading = false;
            }
        }
    }
}

pub fn book_details(gateway: &dyn SearchGateway, book_id: &str) -> Result<CatalogItem> {
    gateway.book_info(book_id).map_err(|err| {
        log::warn!("details lookup for {} failed: {}", book_id, err);
        err
    })
}
