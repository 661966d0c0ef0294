//! Error types for spreadsheet access.

use thiserror::Error;

/// Errors that can occur during worksheet metadata or content operations.
#[derive(Error, Debug)]
pub enum SheetsError {
    /// Worksheet set has the wrong shape for its feature.
    #[error("structural error: {0}")]
    Structural(String),

    /// Spreadsheet not known to the backend.
    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    /// Worksheet id not present in the spreadsheet.
    #[error("worksheet {worksheet_id} not found in sheet {sheet_url}")]
    WorksheetNotFound {
        sheet_url: String,
        worksheet_id: i64,
    },

    /// Transport-level failure reported by a backend.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type alias for spreadsheet operations.
pub type Result<T> = std::result::Result<T, SheetsError>;
