use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::Result;

pub const DEFAULT_BOOKS_API_URL: &str = "https://www.googleapis.com/books/v1/";
pub const DEFAULT_SEARCH_QUERY: &str = "android";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_USER_AGENT: &str = "Reader/0.1";
static READER_DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Runtime settings for the reader core.
///
/// Values come from defaults, optionally a JSON file, and finally `READER_*`
/// environment variables, which win over everything else.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReaderConfig {
    pub db_path: PathBuf,
    pub books_api_url: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub default_query: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("reader.db"),
            books_api_url: DEFAULT_BOOKS_API_URL.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_query: DEFAULT_SEARCH_QUERY.to_string(),
        }
    }
}

impl ReaderConfig {
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: ReaderConfig = serde_json::from_str(&raw)?;
        config.books_api_url = with_trailing_slash(config.books_api_url);
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Applies `READER_*` overrides through `lookup`; unparsable numbers are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = non_blank(lookup("READER_DB_PATH")) {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = non_blank(lookup("READER_BOOKS_API_URL")) {
            self.books_api_url = with_trailing_slash(value);
        }
        if let Some(secs) = non_blank(lookup("READER_HTTP_TIMEOUT_SECS"))
            .and_then(|value| value.parse::<u64>().ok())
        {
            self.http_timeout_secs = secs;
        }
        if let Some(value) = non_blank(lookup("READER_USER_AGENT")) {
            self.user_agent = value;
        }
        if let Some(value) = non_blank(lookup("READER_DEFAULT_QUERY")) {
            self.default_query = value;
        }
        self
    }
}

pub(crate) fn debug_enabled() -> bool {
    *READER_DEBUG_ENABLED.get_or_init(|| {
        std::env::var("READER_DEBUG")
            .map(|value| parse_flag(&value))
            .unwrap_or(false)
    })
}

fn parse_flag(value: &str) -> bool {
    let lowered = value.trim().to_ascii_lowercase();
    lowered == "1" || lowered == "true" || lowered == "yes" || lowered == "on"
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_point_at_google_books() {
        let config = ReaderConfig::default();
        assert_eq!(config.books_api_url, DEFAULT_BOOKS_API_URL);
        assert_eq!(config.default_query, "android");
    }

    #[test]
    fn overrides_replace_defaults() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("READER_DB_PATH", "/tmp/library.db"),
            ("READER_BOOKS_API_URL", "http://localhost:9000/books"),
            ("READER_HTTP_TIMEOUT_SECS", "3"),
            ("READER_USER_AGENT", "Shelfie/2.0"),
            ("READER_DEFAULT_QUERY", "  "),
        ]);
        let config =
            ReaderConfig::default().with_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.db_path, PathBuf::from("/tmp/library.db"));
        assert_eq!(config.books_api_url, "http://localhost:9000/books/");
        assert_eq!(config.http_timeout_secs, 3);
        assert_eq!(config.user_agent, "Shelfie/2.0");
        assert_eq!(config.default_query, DEFAULT_SEARCH_QUERY);
    }

    #[test]
    fn bad_timeout_is_ignored() {
        let config = ReaderConfig::default().with_overrides(|key| {
            (key == "READER_HTTP_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert_eq!(config.http_timeout_secs, DEFAULT_HTTP_TIMEOUT_SECS);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reader.json");
        std::fs::write(&path, r#"{ "defaultQuery": "rust" }"#).unwrap();

        let config = ReaderConfig::from_file(&path).unwrap();
        assert_eq!(config.default_query, "rust");
        assert_eq!(config.http_timeout_secs, DEFAULT_HTTP_TIMEOUT_SECS);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn file_api_url_gets_trailing_slash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reader.json");
        std::fs::write(
            &path,
            r#"{ "booksApiUrl": "http://localhost:9000/books/v1" }"#,
        )
        .unwrap();

        let config = ReaderConfig::from_file(&path).unwrap();
        assert_eq!(config.books_api_url, "http://localhost:9000/books/v1/");
    }

    #[test]
    fn flag_values() {
        assert!(parse_flag(" On "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("off"));
    }
}
