use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackError {
    #[error("Malformed key: {0}")]
    MalformedKey(String),

    #[error("Missing _originalKey in {0}")]
    MissingKey(String),

    #[error("Pack source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Database file not found: {}", .0.display())]
    DatabaseNotFound(PathBuf),

    #[error("Key-value store not found: {}", .0.display())]
    StoreNotFound(PathBuf),

    #[error("Invalid pack name: {name}. Available packs: {available}")]
    InvalidPackName { name: String, available: String },

    #[error("Invalid store: {0}")]
    InvalidStore(String),

    #[error("Migration failed for {key}: {reason}")]
    Migration { key: String, reason: String },

    #[error("Failed to {verb} {count} pack(s)")]
    PacksFailed { verb: String, count: usize },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Key-value store error: {0}")]
    Kv(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, PackError>;
