//! Library and reading-progress core for the Reader app.
//!
//! The UI layer searches the catalog through [`search`], saves results with
//! [`catalog`], reads shelves from a [`library::Library`] and commits edits
//! through [`update::UpdateFlow`]. Storage, catalog access and identity are
//! traits so a host can swap in its own backends.

pub mod app;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod library;
pub mod models;
pub mod search;
pub mod stats;
pub mod store;
pub mod update;
pub mod views;

pub use app::{HomeView, ReaderApp, StatsView};
pub use config::ReaderConfig;
pub use error::{ReaderError, Result};
pub use identity::{AccountService, Identity, IdentityProvider, LocalAccounts, LoginFlow, Notifier};
pub use library::{Library, LibrarySnapshot};
pub use models::{BookRecord, CatalogItem, UserProfile, VolumeInfo};
pub use search::{BookSearch, GoogleBooksGateway, SearchGateway};
pub use stats::ReadingStats;
pub use store::{BookField, DocumentStore, ProfileStore, SqliteDocumentStore};
pub use update::{BookEdit, BookPatch, CommitOutcome, UpdateFlow};
pub use views::Shelf;
