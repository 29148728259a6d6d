use serde::Serialize;

use crate::identity::{display_name_of, Identity};
use crate::models::BookRecord;
use crate::views;

/// Counts shown on the stats screen. Recomputed on every call, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingStats {
    pub reading: usize,
    pub finished: usize,
}

impl ReadingStats {
    pub fn compute(books: &[BookRecord], user_id: &str) -> Self {
        Self {
            reading: views::reading_now(books, user_id).len(),
            finished: views::finished(books, user_id).len(),
        }
    }

    /// The finished list rendered under the counts.
    pub fn finished_books<'a>(books: &'a [BookRecord], user_id: &str) -> Vec<&'a BookRecord> {
        views::finished(books, user_id)
    }
}

/// Same name the home screen shows, uppercased.
pub fn greeting(identity: Option<&Identity>) -> String {
    format!("Hi, {}", display_name_of(identity).to_uppercase())
}
