//! Lossless tabular content store.
//!
//! One `TabularContent` is created from a worksheet's current data rows,
//! mutated in memory, serialized back, and discarded; it owns nothing beyond
//! one synchronization cycle. Rows that cannot be typed are never dropped:
//! they ride along in overflow and are written back verbatim.

use std::collections::HashSet;

use roster_models::SheetSchema;
use tracing::debug;

use crate::codec::RowRecord;

/// Typed, keyed view over one worksheet's data rows.
#[derive(Debug, Clone)]
pub struct TabularContent<R> {
    /// Typed records, insertion order = last-write order.
    typed: Vec<R>,

    /// Raw rows that failed coercion or duplicated an earlier identity.
    overflow: Vec<Vec<String>>,

    /// Data row count at read time; serialization never shrinks below it.
    original_row_count: usize,
}

impl<R: RowRecord> TabularContent<R> {
    /// Maps raw data rows onto the declared layout by position and coerces
    /// each to a typed record.
    ///
    /// Short rows are padded with blank cells before coercion. A row lands
    /// in overflow, verbatim and at its original length, when coercion fails
    /// or its identity duplicates an earlier row (first occurrence wins).
    pub fn standardize(schema: &SheetSchema, rows: Vec<Vec<String>>) -> Self {
        let original_row_count = rows.len();
        let mut typed: Vec<R> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut overflow = Vec::new();

        for row in rows {
            let mut padded = row.clone();
            if padded.len() < schema.len() {
                padded.resize(schema.len(), String::new());
            }

            match R::from_cells(schema, &padded) {
                Ok(record) => {
                    if seen.contains(record.identity()) {
                        debug!(identity = %record.identity(), "Duplicate identity, row kept in overflow");
                        overflow.push(row);
                    } else {
                        seen.insert(record.identity().to_string());
                        typed.push(record);
                    }
                }
                Err(err) => {
                    debug!(error = %err, "Row failed coercion, kept in overflow");
                    overflow.push(row);
                }
            }
        }

        Self {
            typed,
            overflow,
            original_row_count,
        }
    }

    /// Typed records in current order.
    pub fn typed(&self) -> &[R] {
        &self.typed
    }

    /// Overflow rows in read order.
    pub fn overflow(&self) -> &[Vec<String>] {
        &self.overflow
    }

    /// Data row count at read time.
    pub fn original_row_count(&self) -> usize {
        self.original_row_count
    }

    /// Typed record for an identity, if present.
    pub fn get(&self, identity: &str) -> Option<&R> {
        self.typed.iter().find(|r| r.identity() == identity)
    }

    /// Inserts or replaces the record for its identity.
    ///
    /// The affected identity always moves to the bottom; its prior position
    /// is not preserved. Users see this as their row jumping down after a
    /// resubmission.
    pub fn upsert(&mut self, record: R) {
        self.delete(record.identity());
        self.typed.push(record);
    }

    /// Removes the record for an identity; no-op when absent.
    pub fn delete(&mut self, identity: &str) {
        if let Some(pos) = self.typed.iter().position(|r| r.identity() == identity) {
            self.typed.remove(pos);
        }
    }

    /// Replaces the whole typed mapping, keeping overflow and the original
    /// row count. Used by full summary rebuilds.
    pub fn replace_typed(&mut self, rows: Vec<R>) {
        self.typed = rows;
    }

    /// Serializes back to data rows: typed rows in order, then blank padding
    /// up to the original row count, then overflow verbatim.
    ///
    /// Padding keeps the visible row count from shrinking after an edit, so
    /// formatting or formulas anchored below the data region stay in place.
    pub fn to_rows(&self, schema: &SheetSchema) -> Vec<Vec<String>> {
        let mut rows: Vec<Vec<String>> =
            self.typed.iter().map(|r| r.to_cells(schema)).collect();

        let filled = self.typed.len() + self.overflow.len();
        let padding = self.original_row_count.saturating_sub(filled);
        rows.extend((0..padding).map(|_| vec![String::new(); schema.len()]));

        rows.extend(self.overflow.iter().cloned());
        rows
    }
}
