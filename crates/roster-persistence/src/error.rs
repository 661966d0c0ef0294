//! Error types for the persistence layer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during persistence operations.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Failed to create or access a directory.
    #[error("directory error at {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("write error at {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a file.
    #[error("read error at {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
