use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed document: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("book has no store id")]
    MissingId,
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, ReaderError>;
