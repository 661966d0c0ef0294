//! Spreadsheet transport trait and derived read/write helpers.

use std::collections::HashMap;

use async_trait::async_trait;

use roster_models::{SheetPurpose, SheetSchema};

use crate::codec::RowRecord;
use crate::content::TabularContent;
use crate::error::Result;
use crate::handle::WorksheetHandle;
use crate::meta::WorksheetMeta;

/// Default grid size of a freshly created worksheet.
pub const NEW_WORKSHEET_ROWS: usize = 100;
pub const NEW_WORKSHEET_COLUMNS: usize = 20;

/// Raw transport to a remote spreadsheet.
///
/// Implementations must support listing worksheets, whole-grid reads and
/// writes, and title-addressed creation. Creation is not transactionally
/// reserved: concurrent callers racing on the same title can produce
/// duplicates, so provisioning flows re-list and merge after creating.
#[async_trait]
pub trait SheetsClient: Send + Sync {
    /// Lists all worksheets of a spreadsheet as handle snapshots.
    async fn list_worksheets(&self, sheet_url: &str) -> Result<Vec<WorksheetHandle>>;

    /// Reads the full grid of one worksheet, header row included.
    async fn read_rows(&self, sheet_url: &str, worksheet_id: i64) -> Result<Vec<Vec<String>>>;

    /// Replaces the full grid of one worksheet, header row included.
    async fn write_rows(
        &self,
        sheet_url: &str,
        worksheet_id: i64,
        rows: Vec<Vec<String>>,
    ) -> Result<()>;

    /// Creates a worksheet with the given title and default grid size.
    async fn create_worksheet(&self, sheet_url: &str, title: &str) -> Result<WorksheetHandle>;
}

/// Listing indexed by worksheet id.
pub fn listing_by_id(handles: &[WorksheetHandle]) -> HashMap<i64, WorksheetHandle> {
    handles.iter().map(|h| (h.id, h.clone())).collect()
}

/// Listing indexed by title. On duplicate titles the first listed worksheet
/// wins.
pub fn listing_by_title(handles: &[WorksheetHandle]) -> HashMap<String, WorksheetHandle> {
    let mut map = HashMap::new();
    for handle in handles {
        map.entry(handle.title.clone()).or_insert_with(|| handle.clone());
    }
    map
}

/// Fetches or creates one worksheet per requested title, in request order.
///
/// Only titles absent from the current listing are created; existing
/// worksheets are returned as-is. The result carries the given purposes so
/// it can be merged back into a set by title.
pub async fn get_or_create_worksheets(
    client: &dyn SheetsClient,
    sheet_url: &str,
    titles: &[(SheetPurpose, String)],
) -> Result<Vec<WorksheetMeta>> {
    let listing = listing_by_title(&client.list_worksheets(sheet_url).await?);

    let mut resolved = Vec::with_capacity(titles.len());
    for (purpose, title) in titles {
        let handle = match listing.get(title) {
            Some(handle) => handle.clone(),
            None => {
                tracing::info!(title = %title, "Creating worksheet");
                client.create_worksheet(sheet_url, title).await?
            }
        };
        resolved.push(WorksheetMeta::resolved(*purpose, handle));
    }
    Ok(resolved)
}

/// Reads one worksheet into a typed content store.
///
/// The first row is dropped as the header; it is not trusted to match the
/// declared layout, which applies by position.
pub async fn read_content<R: RowRecord>(
    client: &dyn SheetsClient,
    sheet_url: &str,
    worksheet_id: i64,
    schema: &SheetSchema,
) -> Result<TabularContent<R>> {
    let mut rows = client.read_rows(sheet_url, worksheet_id).await?;
    if !rows.is_empty() {
        rows.remove(0);
    }
    Ok(TabularContent::standardize(schema, rows))
}

/// Writes a content store back, prepending the declared header row.
pub async fn write_content<R: RowRecord>(
    client: &dyn SheetsClient,
    sheet_url: &str,
    worksheet_id: i64,
    schema: &SheetSchema,
    content: &TabularContent<R>,
) -> Result<()> {
    let mut rows = vec![schema.header_row()];
    rows.extend(content.to_rows(schema));
    client.write_rows(sheet_url, worksheet_id, rows).await
}
