//! Resolved remote-worksheet references.

use serde::{Deserialize, Serialize};

/// Owned snapshot of one remote worksheet, taken at listing time.
///
/// A handle proves the worksheet existed when the listing was fetched; it
/// carries no liveness guarantee beyond that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksheetHandle {
    /// Stable numeric id assigned by the spreadsheet.
    pub id: i64,

    /// Title at listing time.
    pub title: String,

    /// Grid height at listing time.
    pub row_count: usize,

    /// Grid width at listing time.
    pub column_count: usize,
}

impl WorksheetHandle {
    /// Creates a handle snapshot.
    pub fn new(id: i64, title: impl Into<String>, row_count: usize, column_count: usize) -> Self {
        Self {
            id,
            title: title.into(),
            row_count,
            column_count,
        }
    }
}
