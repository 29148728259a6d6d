use serde::Serialize;
use std::sync::Arc;

use crate::catalog;
use crate::config::ReaderConfig;
use crate::error::Result;
use crate::identity::{display_name_of, IdentityProvider, LocalAccounts};
use crate::library::Library;
use crate::models::{BookRecord, CatalogItem};
use crate::search::{BookSearch, GoogleBooksGateway, SearchGateway};
use crate::stats::{self, ReadingStats};
use crate::store::{DocumentStore, SqliteDocumentStore};
use crate::update::UpdateFlow;
use crate::views;

/// What the home screen renders for the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub user_name: String,
    pub reading_now: Vec<BookRecord>,
    pub unread: Vec<BookRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub greeting: String,
    pub stats: ReadingStats,
    pub finished: Vec<BookRecord>,
}

/// Wires the stores, the catalog gateway and the identity provider together.
pub struct ReaderApp {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub gateway: Arc<dyn SearchGateway>,
    pub library: Library,
    pub updates: UpdateFlow,
}

impl ReaderApp {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        gateway: Arc<dyn SearchGateway>,
    ) -> Self {
        Self {
            library: Library::new(store.clone()),
            updates: UpdateFlow::new(store.clone()),
            store,
            identity,
            gateway,
        }
    }

    /// Opens the on-disk stores and the Google Books client described by `config`.
    /// The accounts are returned separately so the login screen can drive them.
    pub fn open(config: &ReaderConfig) -> Result<(Self, Arc<LocalAccounts>)> {
        let store = Arc::new(SqliteDocumentStore::open(&config.db_path)?);
        let accounts = Arc::new(LocalAccounts::open(&config.db_path, store.clone())?);
        let gateway = Arc::new(GoogleBooksGateway::new(config)?);
        log::info!("reader opened at {}", config.db_path.display());
        Ok((Self::new(store, accounts.clone(), gateway), accounts))
    }

    pub fn search(&self) -> BookSearch {
        BookSearch::new(self.gateway.clone())
    }

    /// Saves a catalog item for the signed-in user. Returns `None` when nobody is signed in.
    pub fn save_book(&self, item: &CatalogItem) -> Result<Option<String>> {
        match self.identity.current_user() {
            Some(identity) => catalog::save_to_library(self.store.as_ref(), item, &identity).map(Some),
            None => Ok(None),
        }
    }

    pub fn home_view(&self) -> HomeView {
        let current = self.identity.current_user();
        let user_id = current.as_ref().map(|identity| identity.uid.clone()).unwrap_or_default();
        let books = self.library.books();
        HomeView {
            user_name: display_name_of(current.as_ref()),
            reading_now: views::reading_now(&books, &user_id).into_iter().cloned().collect(),
            unread: views::unread(&books, &user_id).into_iter().cloned().collect(),
        }
    }

    pub fn stats_view(&self) -> StatsView {
        let current = self.identity.current_user();
        let user_id = current.as_ref().map(|identity| identity.uid.clone()).unwrap_or_default();
        let books = self.library.books();
        StatsView {
            greeting: stats::greeting(current.as_ref()),
            stats: ReadingStats::compute(&books, &user_id),
            finished: ReadingStats::finished_books(&books, &user_id)
                .into_iter()
                .cloned()
                .collect(),
        }
    }

    /// The signed-in user's copy of a catalog book, for the update screen.
    pub fn book_for_update(&self, google_book_id: &str) -> Option<BookRecord> {
        let identity = self.identity.current_user()?;
        self.library.find_book(&identity.uid, google_book_id)
    }
}
