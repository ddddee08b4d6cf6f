use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StallError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Corrupt data in collection '{collection}': {reason}")]
    CorruptData { collection: String, reason: String },

    #[error("Unreadable file {}: {source}", path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image {} is {size} bytes, limit is {limit}", path.display())]
    ImageTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Write queue error: {0}")]
    Queue(String),
}

impl StallError {
    pub fn validation(message: impl Into<String>) -> Self {
        StallError::Validation(message.into())
    }

    pub fn corrupt(collection: impl Into<String>, reason: impl Into<String>) -> Self {
        StallError::CorruptData {
            collection: collection.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StallError>;
