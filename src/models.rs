use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved library entry. Stored as one JSON document in the `books` collection.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct BookRecord {
    pub id: Option<String>, // assigned by the store
    pub google_book_id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub authors: Option<String>,
    pub description: Option<String>,
    pub categories: Option<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub photo_url: Option<String>,
    pub page_count: Option<String>,
    pub rating: Option<f64>,
    pub notes: Option<String>,
    #[serde(rename = "started_reading_at")]
    pub started_reading: Option<DateTime<Utc>>,
    #[serde(rename = "finished_reading_at")]
    pub finished_reading: Option<DateTime<Utc>>,
}

/// One result returned by the catalog search.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub description: Option<String>,
    pub categories: Vec<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub page_count: Option<i64>,
    pub thumbnail: Option<String>,
}

/// Profile document written to the `users` collection when an account is created.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserProfile {
    pub id: Option<String>,
    pub user_id: String,
    pub display_name: String,
    pub avatar_url: String,
    pub quote: String,
    pub profession: String,
}
