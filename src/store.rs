//! Document collections backing the library.
//!
//! `DocumentStore` is the narrow surface the rest of the crate talks to:
//! fetch everything, insert returning an id, partial update, delete. There is
//! no filter pushdown, no transactions across calls and no pagination.
//! `SqliteDocumentStore` keeps each record as a JSON body in the `documents`
//! table, grouped by collection name.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::db;
use crate::error::{ReaderError, Result};
use crate::models::{BookRecord, UserProfile};

pub const BOOKS_COLLECTION: &str = "books";
pub const USERS_COLLECTION: &str = "users";

/// A single field named in a partial update.
#[derive(Debug, Clone, PartialEq)]
pub enum BookField {
    Id(String),
    Notes(String),
    Rating(f64),
    StartedReading(Option<DateTime<Utc>>),
    FinishedReading(Option<DateTime<Utc>>),
}

impl BookField {
    pub fn key(&self) -> &'static str {
        match self {
            BookField::Id(_) => "id",
            BookField::Notes(_) => "notes",
            BookField::Rating(_) => "rating",
            BookField::StartedReading(_) => "started_reading_at",
            BookField::FinishedReading(_) => "finished_reading_at",
        }
    }

    fn to_value(&self) -> Result<Value> {
        let value = match self {
            BookField::Id(id) => Value::String(id.clone()),
            BookField::Notes(notes) => Value::String(notes.clone()),
            BookField::Rating(rating) => serde_json::to_value(rating)?,
            BookField::StartedReading(at) | BookField::FinishedReading(at) => {
                serde_json::to_value(at)?
            }
        };
        Ok(value)
    }
}

pub trait DocumentStore: Send + Sync {
    fn fetch_all(&self) -> Result<Vec<BookRecord>>;
    fn insert(&self, book: &BookRecord) -> Result<String>;
    fn update(&self, id: &str, fields: &[BookField]) -> Result<()>;
    fn delete(&self, id: &str) -> Result<()>;
}

pub trait ProfileStore: Send + Sync {
    fn add_profile(&self, profile: &UserProfile) -> Result<String>;
}

pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(Self::from_connection(db::init_db(db_path)?))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::from_connection(db::init_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ReaderError::Message("document store lock poisoned".to_string()))
    }

    fn insert_document(&self, collection: &str, body: &str) -> Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO documents (id, collection, body) VALUES (?1, ?2, ?3)",
            params![id, collection, body],
        )?;
        Ok(id)
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn fetch_all(&self) -> Result<Vec<BookRecord>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT body FROM documents WHERE collection = ?1 ORDER BY rowid")?;
        let rows = stmt.query_map(params![BOOKS_COLLECTION], |row| row.get::<_, String>(0))?;

        let mut books = Vec::new();
        for row in rows {
            // A single undecodable document fails the whole fetch.
            books.push(serde_json::from_str::<BookRecord>(&row?)?);
        }
        Ok(books)
    }

    fn insert(&self, book: &BookRecord) -> Result<String> {
        let body = serde_json::to_string(book)?;
        self.insert_document(BOOKS_COLLECTION, &body)
    }

    fn update(&self, id: &str, fields: &[BookField]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let body: Option<String> = tx
            .query_row(
                "SELECT body FROM documents WHERE id = ?1 AND collection = ?2",
                params![id, BOOKS_COLLECTION],
                |row| row.get(0),
            )
            .optional()?;
        let body = body.ok_or_else(|| ReaderError::NotFound(format!("book {}", id)))?;

        let mut document: Value = serde_json::from_str(&body)?;
        let object = document
            .as_object_mut()
            .ok_or_else(|| ReaderError::Message(format!("book {} is not an object", id)))?;
        for field in fields {
            object.insert(field.key().to_string(), field.to_value()?);
        }

        tx.execute(
            "UPDATE documents SET body = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![serde_json::to_string(&document)?, id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM documents WHERE id = ?1 AND collection = ?2",
            params![id, BOOKS_COLLECTION],
        )?;
        if removed == 0 {
            log::info!("delete of unknown book {} ignored", id);
        }
        Ok(())
    }
}

impl ProfileStore for SqliteDocumentStore {
    fn add_profile(&self, profile: &UserProfile) -> Result<String> {
        let body = serde_json::to_string(profile)?;
        self.insert_document(USERS_COLLECTION, &body)
    }
}
