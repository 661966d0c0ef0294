//! Error types for sync orchestration.

use thiserror::Error;

use roster_persistence::PersistenceError;
use roster_sheets::SheetsError;

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The channel has no persisted configuration for the feature.
    #[error("feature not configured for channel {guild_id}/{channel_id}")]
    NotConfigured { guild_id: u64, channel_id: u64 },

    /// Spreadsheet access error.
    #[error("sheets error: {0}")]
    Sheets(#[from] SheetsError),

    /// Config store error.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Lock poisoned (task panicked while touching the lock map).
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
