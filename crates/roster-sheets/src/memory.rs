//! In-memory spreadsheet backend for tests and embedding.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::client::{SheetsClient, NEW_WORKSHEET_COLUMNS, NEW_WORKSHEET_ROWS};
use crate::error::{Result, SheetsError};
use crate::handle::WorksheetHandle;

#[derive(Debug, Clone)]
struct MemoryWorksheet {
    handle: WorksheetHandle,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Default)]
struct SheetState {
    next_id: i64,
    worksheets: Vec<MemoryWorksheet>,
}

/// In-memory [`SheetsClient`] backend.
///
/// Spreadsheets spring into existence on first worksheet creation; listing
/// an unknown spreadsheet returns an empty listing, while reads and writes
/// of unknown worksheets error.
#[derive(Debug, Default)]
pub struct MemorySheets {
    sheets: RwLock<HashMap<String, SheetState>>,
}

impl MemorySheets {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one worksheet with explicit rows, creating it if absent.
    /// Test helper.
    pub async fn seed_worksheet(
        &self,
        sheet_url: &str,
        title: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<WorksheetHandle> {
        let handle = self.create_worksheet(sheet_url, title).await?;
        self.write_rows(sheet_url, handle.id, rows).await?;
        Ok(handle)
    }
}

#[async_trait]
impl SheetsClient for MemorySheets {
    async fn list_worksheets(&self, sheet_url: &str) -> Result<Vec<WorksheetHandle>> {
        let sheets = self.sheets.read().await;
        Ok(sheets
            .get(sheet_url)
            .map(|s| s.worksheets.iter().map(|w| w.handle.clone()).collect())
            .unwrap_or_default())
    }

    async fn read_rows(&self, sheet_url: &str, worksheet_id: i64) -> Result<Vec<Vec<String>>> {
        let sheets = self.sheets.read().await;
        let state = sheets
            .get(sheet_url)
            .ok_or_else(|| SheetsError::SheetNotFound(sheet_url.to_string()))?;
        state
            .worksheets
            .iter()
            .find(|w| w.handle.id == worksheet_id)
            .map(|w| w.rows.clone())
            .ok_or_else(|| SheetsError::WorksheetNotFound {
                sheet_url: sheet_url.to_string(),
                worksheet_id,
            })
    }

    async fn write_rows(
        &self,
        sheet_url: &str,
        worksheet_id: i64,
        rows: Vec<Vec<String>>,
    ) -> Result<()> {
        let mut sheets = self.sheets.write().await;
        let state = sheets
            .get_mut(sheet_url)
            .ok_or_else(|| SheetsError::SheetNotFound(sheet_url.to_string()))?;
        let worksheet = state
            .worksheets
            .iter_mut()
            .find(|w| w.handle.id == worksheet_id)
            .ok_or_else(|| SheetsError::WorksheetNotFound {
                sheet_url: sheet_url.to_string(),
                worksheet_id,
            })?;
        worksheet.handle.row_count = worksheet.handle.row_count.max(rows.len());
        worksheet.rows = rows;
        Ok(())
    }

    async fn create_worksheet(&self, sheet_url: &str, title: &str) -> Result<WorksheetHandle> {
        let mut sheets = self.sheets.write().await;
        let state = sheets.entry(sheet_url.to_string()).or_default();
        state.next_id += 1;
        let handle = WorksheetHandle::new(
            state.next_id,
            title,
            NEW_WORKSHEET_ROWS,
            NEW_WORKSHEET_COLUMNS,
        );
        state.worksheets.push(MemoryWorksheet {
            handle: handle.clone(),
            rows: Vec::new(),
        });
        Ok(handle)
    }
}
