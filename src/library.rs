//! The loaded book list shared by the home, update and stats screens.
//!
//! `Library` fetches the whole `books` collection in one call and keeps the
//! result in a shared snapshot. It is never patched after a write; callers
//! see committed changes only after the next `load`.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

use crate::config::debug_enabled;
use crate::models::BookRecord;
use crate::store::DocumentStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySnapshot {
    pub data: Vec<BookRecord>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for LibrarySnapshot {
    fn default() -> Self {
        Self {
            data: vec![],
            loading: true,
            error: None,
        }
    }
}

#[derive(Clone)]
pub struct Library {
    store: Arc<dyn DocumentStore>,
    state: Arc<Mutex<LibrarySnapshot>>,
}

impl Library {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(LibrarySnapshot::default())),
        }
    }

    /// Fetches every book once and applies the result to the snapshot.
    ///
    /// `loading` is only cleared when the fetch returns at least one book. A
    /// failed fetch records the error and keeps the previous `data`.
    pub fn load(&self) {
        self.state().loading = true;

        let result = self.store.fetch_all();

        let mut state = self.state();
        match result {
            Ok(books) => {
                if debug_enabled() {
                    log::info!("[reader-debug] library load fetched {} books", books.len());
                }
                if !books.is_empty() {
                    state.loading = false;
                }
                state.data = books;
                state.error = None;
            }
            Err(err) => {
                log::error!("library load failed: {}", err);
                state.error = Some(err.to_string());
            }
        }
    }

    /// Runs `load` on its own thread. Overlapping loads are not ordered; the
    /// last one to finish wins.
    pub fn spawn_load(&self) -> JoinHandle<()> {
        let library = self.clone();
        std::thread::spawn(move || library.load())
    }

    pub fn snapshot(&self) -> LibrarySnapshot {
        self.state().clone()
    }

    pub fn books(&self) -> Vec<BookRecord> {
        self.state().data.clone()
    }

    /// The user's copy of a catalog book, as opened from the home screen.
    pub fn find_book(&self, user_id: &str, google_book_id: &str) -> Option<BookRecord> {
        self.state()
            .data
            .iter()
            .find(|book| book.user_id == user_id && book.google_book_id == google_book_id)
            .cloned()
    }

    fn state(&self) -> MutexGuard<'_, LibrarySnapshot> {
        // Writers only ever assign whole fields.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
