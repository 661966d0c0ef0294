//! Core data models for Rosterbot.
//!
//! This crate provides the fundamental data types shared across the roster
//! synchronization engine: user identity, shift and team records, worksheet
//! purpose tags, and the declared column schemas for each worksheet kind.

pub mod purpose;
pub mod schema;
pub mod shift;
pub mod team;
pub mod user;

// Re-export main types
pub use purpose::{SheetPurpose, TitleSequence};
pub use schema::{Column, ColumnKind, SheetSchema};
pub use shift::{hour_label, hour_slots, Shift, HOURS_PER_DAY, SPLIT_HOUR};
pub use team::{roles_to_string, ClassifiedTeams, SummaryColumn, SummaryRow, Team};
pub use user::UserInfo;
