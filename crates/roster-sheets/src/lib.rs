//! Spreadsheet access layer for the roster synchronization engine.
//!
//! This crate keeps declared worksheet references consistent with a live
//! remote spreadsheet and makes each worksheet's rectangular grid behave
//! like a typed, keyed record store:
//!
//! - [`meta`] — reconcile configured ids/titles against a remote listing,
//!   merge reconciliation passes, and assign collision-free default titles.
//! - [`sets`] — the fixed-arity shift worksheet set and the mixed-arity
//!   team worksheet set built on those primitives.
//! - [`content`] — the lossless tabular content store (standardize, upsert,
//!   delete, serialize with overflow preservation and row padding).
//! - [`client`] — the async [`SheetsClient`] transport trait and derived
//!   read/write helpers.
//! - [`memory`] — an in-memory backend for tests and embedding.

pub mod anchor;
pub mod client;
pub mod codec;
pub mod content;
pub mod error;
pub mod handle;
pub mod memory;
pub mod meta;
pub mod sets;

pub use anchor::normalize_anchor_cell;
pub use client::{read_content, write_content, SheetsClient};
pub use codec::{CoerceError, RowRecord};
pub use content::TabularContent;
pub use error::{Result, SheetsError};
pub use handle::WorksheetHandle;
pub use memory::MemorySheets;
pub use meta::WorksheetMeta;
pub use sets::{ShiftSheetSet, TeamSheetSet};
