//! Declared column layouts for each worksheet kind.
//!
//! Raw rows read from a worksheet are mapped onto these layouts by position;
//! the remote header row is never trusted as authoritative.

use serde::{Deserialize, Serialize};

use crate::shift::{hour_label, hour_slots};

/// Declared cell type of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Free text, never fails coercion.
    Text,
    /// Whole number.
    Integer,
    /// Decimal number.
    Decimal,
    /// Decimal number, blank cell allowed.
    OptionalDecimal,
    /// Boolean stored as `1`/`0`.
    Flag,
}

/// One declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Header label the write path emits.
    pub name: String,

    /// Declared cell type used during row coercion.
    pub kind: ColumnKind,
}

impl Column {
    /// Creates a new column declaration.
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered column layout of one worksheet kind.
///
/// The first column is always the identity column (the submitter's username).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSchema {
    columns: Vec<Column>,
}

impl SheetSchema {
    /// Layout of a shift entry worksheet: identity, display name, one flag
    /// column per hour slot of the day, original message.
    pub fn entry() -> Self {
        let mut columns = vec![
            Column::new("username", ColumnKind::Text),
            Column::new("display_name", ColumnKind::Text),
        ];
        columns.extend(hour_slots().map(|slot| Column::new(hour_label(slot), ColumnKind::Flag)));
        columns.push(Column::new("original_message", ColumnKind::Text));
        Self { columns }
    }

    /// Layout of a team worksheet.
    pub fn team() -> Self {
        Self {
            columns: vec![
                Column::new("username", ColumnKind::Text),
                Column::new("display_name", ColumnKind::Text),
                Column::new("leader_skill_value", ColumnKind::Integer),
                Column::new("internal_skill_value", ColumnKind::Integer),
                Column::new("team_power", ColumnKind::Decimal),
                Column::new("original_message", ColumnKind::Text),
            ],
        }
    }

    /// Layout of the summary worksheet: one ISV/Power column pair per
    /// currently configured team worksheet title, in worksheet order.
    pub fn summary(team_titles: &[String]) -> Self {
        let mut columns = vec![
            Column::new("username", ColumnKind::Text),
            Column::new("display_name", ColumnKind::Text),
            Column::new("encore_roles", ColumnKind::Text),
        ];
        for title in team_titles {
            columns.push(Column::new(
                format!("{} ISV", title),
                ColumnKind::OptionalDecimal,
            ));
            columns.push(Column::new(
                format!("{} Power", title),
                ColumnKind::OptionalDecimal,
            ));
        }
        Self { columns }
    }

    /// Declared columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of declared columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the layout declares no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Header row the write path emits.
    pub fn header_row(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Team worksheet titles recovered from a summary layout's paired
    /// columns.
    pub fn summary_titles(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter_map(|c| c.name.strip_suffix(" ISV").map(str::to_string))
            .collect()
    }
}
