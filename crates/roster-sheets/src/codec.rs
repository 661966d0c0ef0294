//! Row codecs: typed records to and from positional worksheet cells.

use thiserror::Error;

use roster_models::{
    hour_slots, SheetSchema, Shift, SummaryColumn, SummaryRow, Team, UserInfo,
};

/// Why a raw row could not be coerced onto a declared layout.
///
/// Coercion failures are not fatal: the content store routes the offending
/// row to overflow and continues.
#[derive(Error, Debug)]
pub enum CoerceError {
    /// Identity column is blank.
    #[error("identity column is empty")]
    MissingIdentity,

    /// A cell does not read as its declared type.
    #[error("column '{column}': cannot read '{value}' as {kind}")]
    InvalidCell {
        column: String,
        value: String,
        kind: &'static str,
    },
}

/// A record that maps onto one worksheet row.
pub trait RowRecord: Sized + Send + Sync {
    /// Identity-column value keying this record.
    fn identity(&self) -> &str;

    /// Encodes the record onto the schema's column layout.
    fn to_cells(&self, schema: &SheetSchema) -> Vec<String>;

    /// Coerces one positional row onto the schema. Cells beyond the row's
    /// length read as blank.
    fn from_cells(schema: &SheetSchema, cells: &[String]) -> Result<Self, CoerceError>;
}

fn cell<'a>(cells: &'a [String], index: usize) -> &'a str {
    cells.get(index).map(String::as_str).unwrap_or("")
}

fn identity_cell(cells: &[String]) -> Result<String, CoerceError> {
    let value = cell(cells, 0).trim();
    if value.is_empty() {
        return Err(CoerceError::MissingIdentity);
    }
    Ok(value.to_string())
}

fn column_name(schema: &SheetSchema, index: usize) -> String {
    schema
        .columns()
        .get(index)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| format!("#{index}"))
}

fn parse_integer(schema: &SheetSchema, cells: &[String], index: usize) -> Result<i64, CoerceError> {
    let value = cell(cells, index).trim();
    value.parse().map_err(|_| CoerceError::InvalidCell {
        column: column_name(schema, index),
        value: value.to_string(),
        kind: "integer",
    })
}

fn parse_decimal(schema: &SheetSchema, cells: &[String], index: usize) -> Result<f64, CoerceError> {
    let value = cell(cells, index).trim();
    value.parse().map_err(|_| CoerceError::InvalidCell {
        column: column_name(schema, index),
        value: value.to_string(),
        kind: "decimal",
    })
}

fn parse_optional_decimal(
    schema: &SheetSchema,
    cells: &[String],
    index: usize,
) -> Result<Option<f64>, CoerceError> {
    let value = cell(cells, index).trim();
    if value.is_empty() {
        return Ok(None);
    }
    parse_decimal(schema, cells, index).map(Some)
}

fn parse_flag(schema: &SheetSchema, cells: &[String], index: usize) -> Result<bool, CoerceError> {
    match cell(cells, index).trim() {
        "" | "0" | "false" | "False" | "FALSE" => Ok(false),
        "1" | "true" | "True" | "TRUE" => Ok(true),
        other => Err(CoerceError::InvalidCell {
            column: column_name(schema, index),
            value: other.to_string(),
            kind: "flag",
        }),
    }
}

/// Renders a decimal the way a human-entered sheet holds it: no fractional
/// part when integral.
pub fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn format_optional_decimal(value: Option<f64>) -> String {
    value.map(format_decimal).unwrap_or_default()
}

impl RowRecord for Shift {
    fn identity(&self) -> &str {
        &self.user.username
    }

    fn to_cells(&self, _schema: &SheetSchema) -> Vec<String> {
        let mut cells = vec![self.user.username.clone(), self.user.display_name.clone()];
        cells.extend(
            self.hour_flags()
                .into_iter()
                .map(|(_, covered)| if covered { "1" } else { "0" }.to_string()),
        );
        cells.push(self.original_message.clone());
        cells
    }

    fn from_cells(schema: &SheetSchema, cells: &[String]) -> Result<Self, CoerceError> {
        let username = identity_cell(cells)?;
        let display_name = cell(cells, 1).to_string();

        let mut hours = std::collections::BTreeSet::new();
        for (offset, slot) in hour_slots().enumerate() {
            if parse_flag(schema, cells, 2 + offset)? {
                hours.insert(slot);
            }
        }

        let original = cell(cells, schema.len() - 1).to_string();
        Ok(Shift::new(
            UserInfo::new(username, display_name),
            hours,
            original,
        ))
    }
}

impl RowRecord for Team {
    fn identity(&self) -> &str {
        &self.user.username
    }

    fn to_cells(&self, _schema: &SheetSchema) -> Vec<String> {
        vec![
            self.user.username.clone(),
            self.user.display_name.clone(),
            self.leader_skill_value.to_string(),
            self.internal_skill_value.to_string(),
            format_decimal(self.team_power),
            self.original_message.clone(),
        ]
    }

    fn from_cells(schema: &SheetSchema, cells: &[String]) -> Result<Self, CoerceError> {
        let username = identity_cell(cells)?;
        let display_name = cell(cells, 1).to_string();
        let leader = parse_integer(schema, cells, 2)?;
        let internal = parse_integer(schema, cells, 3)?;
        let power = parse_decimal(schema, cells, 4)?;
        let original = cell(cells, 5).to_string();

        Ok(Team::new(
            UserInfo::new(username, display_name),
            leader,
            internal,
            power,
            original,
        ))
    }
}

impl RowRecord for SummaryRow {
    fn identity(&self) -> &str {
        &self.user.username
    }

    fn to_cells(&self, schema: &SheetSchema) -> Vec<String> {
        let mut cells = vec![
            self.user.username.clone(),
            self.user.display_name.clone(),
            self.encore_roles.clone(),
        ];
        for title in schema.summary_titles() {
            let column = self.columns.iter().find(|c| c.title == title);
            cells.push(format_optional_decimal(
                column.and_then(|c| c.effective_skill_value),
            ));
            cells.push(format_optional_decimal(column.and_then(|c| c.team_power)));
        }
        cells
    }

    fn from_cells(schema: &SheetSchema, cells: &[String]) -> Result<Self, CoerceError> {
        let username = identity_cell(cells)?;
        let display_name = cell(cells, 1).to_string();
        let encore_roles = cell(cells, 2).to_string();

        let mut columns = Vec::new();
        for (pair, title) in schema.summary_titles().into_iter().enumerate() {
            let isv = parse_optional_decimal(schema, cells, 3 + 2 * pair)?;
            let power = parse_optional_decimal(schema, cells, 4 + 2 * pair)?;
            columns.push(SummaryColumn {
                title,
                effective_skill_value: isv,
                team_power: power,
            });
        }

        Ok(SummaryRow::new(
            UserInfo::new(username, display_name),
            encore_roles,
            columns,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn user() -> UserInfo {
        UserInfo::new("alice", "Alice A.")
    }

    fn to_cells_vec(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_shift_roundtrip() {
        let schema = SheetSchema::entry();
        let hours: BTreeSet<u8> = [4, 26, 27].into_iter().collect();
        let shift = Shift::new(user(), hours, "4-5 / 2-4");

        let cells = shift.to_cells(&schema);
        assert_eq!(cells.len(), schema.len());
        assert_eq!(cells[2], "1");
        assert_eq!(cells[3], "0");

        let back = Shift::from_cells(&schema, &cells).unwrap();
        assert_eq!(back, shift);
    }

    #[test]
    fn test_shift_flag_accepts_spreadsheet_booleans() {
        let schema = SheetSchema::entry();
        let mut cells = vec!["alice".to_string(), "Alice A.".to_string()];
        cells.extend(std::iter::repeat(String::new()).take(24));
        cells.push(String::new());
        cells[2] = "TRUE".to_string();
        cells[3] = "FALSE".to_string();

        let shift = Shift::from_cells(&schema, &cells).unwrap();
        assert_eq!(shift.hours, [4].into_iter().collect());
    }

    #[test]
    fn test_shift_bad_flag_is_coerce_error() {
        let schema = SheetSchema::entry();
        let mut cells = vec!["alice".to_string(), "Alice A.".to_string()];
        cells.extend(std::iter::repeat(String::new()).take(25));
        cells[2] = "maybe".to_string();

        assert!(matches!(
            Shift::from_cells(&schema, &cells),
            Err(CoerceError::InvalidCell { .. })
        ));
    }

    #[test]
    fn test_team_roundtrip_and_decimal_rendering() {
        let schema = SheetSchema::team();
        let team = Team::new(user(), 150, 740, 33.0, "150/740/33");

        let cells = team.to_cells(&schema);
        assert_eq!(cells[4], "33");

        let back = Team::from_cells(&schema, &cells).unwrap();
        assert_eq!(back, team);
    }

    #[test]
    fn test_team_rejects_blank_identity() {
        let schema = SheetSchema::team();
        let cells = to_cells_vec(&["  ", "Alice", "1", "2", "3", ""]);
        assert!(matches!(
            Team::from_cells(&schema, &cells),
            Err(CoerceError::MissingIdentity)
        ));
    }

    #[test]
    fn test_team_rejects_non_numeric_skill() {
        let schema = SheetSchema::team();
        let cells = to_cells_vec(&["alice", "Alice", "high", "2", "3", ""]);
        let err = Team::from_cells(&schema, &cells).unwrap_err();
        assert!(err.to_string().contains("leader_skill_value"));
    }

    #[test]
    fn test_summary_roundtrip_with_blank_pairs() {
        let titles = vec!["Main Team".to_string(), "Encore Team".to_string()];
        let schema = SheetSchema::summary(&titles);
        let row = SummaryRow::new(
            user(),
            "Vocalist",
            vec![
                SummaryColumn::new("Main Team", 268.0, 33.4),
                SummaryColumn::empty("Encore Team"),
            ],
        );

        let cells = row.to_cells(&schema);
        assert_eq!(cells, to_cells_vec(&[
            "alice",
            "Alice A.",
            "Vocalist",
            "268",
            "33.4",
            "",
            "",
        ]));

        let back = SummaryRow::from_cells(&schema, &cells).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(33.0), "33");
        assert_eq!(format_decimal(33.4), "33.4");
        assert_eq!(format_decimal(0.4), "0.4");
    }
}
