use regex::Regex;
use std::sync::OnceLock;

use crate::error::Result;
use crate::identity::Identity;
use crate::models::{BookRecord, CatalogItem};
use crate::store::{BookField, DocumentStore};

pub const PLACEHOLDER_COVER_URL: &str =
    "https://img.icons8.com/ios-filled/250/undefined/android-os.png";

static HTML_TAG_RE: OnceLock<Regex> = OnceLock::new();
static BREAK_RE: OnceLock<Regex> = OnceLock::new();
static BLOCK_END_RE: OnceLock<Regex> = OnceLock::new();
static LIST_ITEM_RE: OnceLock<Regex> = OnceLock::new();
static STRIP_RE: OnceLock<Regex> = OnceLock::new();

/// Builds the library record saved from the details screen.
pub fn new_library_book(item: &CatalogItem, user_id: &str) -> BookRecord {
    let info = &item.volume_info;
    BookRecord {
        id: None,
        google_book_id: item.id.clone(),
        user_id: user_id.to_string(),
        title: info.title.clone(),
        authors: join_non_empty(&info.authors),
        description: info.description.clone(),
        categories: join_non_empty(&info.categories),
        publisher: info.publisher.clone(),
        published_date: info.published_date.clone(),
        photo_url: Some(
            info.thumbnail
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_COVER_URL.to_string()),
        ),
        page_count: info.page_count.map(|count| count.to_string()),
        rating: Some(0.0),
        notes: Some(String::new()),
        started_reading: None,
        finished_reading: None,
    }
}

/// Inserts the catalog item for `identity`, then writes the generated id back
/// into the document. Returns the id.
pub fn save_to_library(
    store: &dyn DocumentStore,
    item: &CatalogItem,
    identity: &Identity,
) -> Result<String> {
    let book = new_library_book(item, &identity.uid);
    let id = store.insert(&book)?;
    if let Err(err) = store.update(&id, &[BookField::Id(id.clone())]) {
        log::warn!("saved book {} but could not record its id: {}", id, err);
        return Err(err);
    }
    log::info!("saved {} to library of {} as {}", item.id, identity.uid, id);
    Ok(id)
}

/// Turns the catalog's HTML description into plain text lines.
pub fn clean_description(raw: &str) -> String {
    let decoded = quick_xml::escape::unescape(raw)
        .map(|text| text.into_owned())
        .unwrap_or_else(|_| raw.to_string())
        .replace('\u{00a0}', " ");

    let html_tag_re = cached(&HTML_TAG_RE, r"(?is)<\s*/?\s*[a-z][^>]*>");
    let normalized = if html_tag_re.is_match(&decoded) {
        let with_breaks = cached(&BREAK_RE, r"(?is)<br\s*/?>").replace_all(&decoded, "\n");
        let with_block_breaks = cached(&BLOCK_END_RE, r"(?is)</(p|div|li|ul|ol|h[1-6])>")
            .replace_all(&with_breaks, "\n");
        let with_list_prefix =
            cached(&LIST_ITEM_RE, r"(?is)<li[^>]*>").replace_all(&with_block_breaks, "- ");
        cached(&STRIP_RE, r"(?is)<[^>]+>")
            .replace_all(&with_list_prefix, "")
            .into_owned()
    } else {
        decoded
    };

    normalized
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn cached<'a>(cell: &'a OnceLock<Regex>, pattern: &str) -> &'a Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid description regex"))
}

fn join_non_empty(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}
