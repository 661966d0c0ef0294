//! Worksheet purpose tags and their default-title sequences.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role a worksheet plays within a feature.
///
/// The purpose tag determines the default-title sequence used when
/// provisioning a missing worksheet and which persisted config field the
/// resolved worksheet id lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetPurpose {
    /// Shift submissions as they arrive.
    Entry,
    /// Working copy for schedule drafting.
    Draft,
    /// Published final schedule.
    FinalSchedule,
    /// One of N team worksheets.
    Team,
    /// Derived per-user team summary.
    Summary,
}

impl SheetPurpose {
    /// Stable string form, matching the persisted config field prefixes.
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetPurpose::Entry => "entry",
            SheetPurpose::Draft => "draft",
            SheetPurpose::FinalSchedule => "final_schedule",
            SheetPurpose::Team => "team",
            SheetPurpose::Summary => "summary",
        }
    }

    /// Whether the purpose maps to an ordered list of worksheet ids rather
    /// than a single scalar config field.
    pub fn is_collection(&self) -> bool {
        matches!(self, SheetPurpose::Team)
    }

    /// First default worksheet title for this purpose.
    pub fn base_title(&self) -> &'static str {
        match self {
            SheetPurpose::Entry => "Shift Entry",
            SheetPurpose::Draft => "Shift Draft",
            SheetPurpose::FinalSchedule => "Shift Final Schedule",
            SheetPurpose::Team => "Main Team",
            SheetPurpose::Summary => "Team Summary",
        }
    }

    /// Infinite default-title generator for this purpose.
    pub fn titles(&self) -> TitleSequence {
        TitleSequence::new(*self)
    }
}

impl fmt::Display for SheetPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Iterator over a purpose's default worksheet titles.
///
/// Most purposes yield a fixed first name followed by numbered variants
/// (`"Shift Entry"`, `"Shift Entry 1"`, ...). The team purpose names its
/// first three slots specially before falling back to `"Team 4"`,
/// `"Team 5"`, ...
#[derive(Debug, Clone)]
pub struct TitleSequence {
    purpose: SheetPurpose,
    next: usize,
}

impl TitleSequence {
    fn new(purpose: SheetPurpose) -> Self {
        Self { purpose, next: 0 }
    }
}

impl Iterator for TitleSequence {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let n = self.next;
        self.next += 1;
        let title = match (self.purpose, n) {
            (SheetPurpose::Team, 0) => "Main Team".to_string(),
            (SheetPurpose::Team, 1) => "Encore Team".to_string(),
            (SheetPurpose::Team, 2) => "Backup Team".to_string(),
            (SheetPurpose::Team, n) => format!("Team {}", n + 1),
            (purpose, 0) => purpose.base_title().to_string(),
            (purpose, n) => format!("{} {}", purpose.base_title(), n),
        };
        Some(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_purpose_titles_are_base_then_numbered() {
        let titles: Vec<String> = SheetPurpose::Entry.titles().take(3).collect();
        assert_eq!(titles, vec!["Shift Entry", "Shift Entry 1", "Shift Entry 2"]);

        let titles: Vec<String> = SheetPurpose::Summary.titles().take(2).collect();
        assert_eq!(titles, vec!["Team Summary", "Team Summary 1"]);
    }

    #[test]
    fn test_team_titles_named_then_numbered() {
        let titles: Vec<String> = SheetPurpose::Team.titles().take(5).collect();
        assert_eq!(
            titles,
            vec!["Main Team", "Encore Team", "Backup Team", "Team 4", "Team 5"]
        );
    }

    #[test]
    fn test_only_team_is_collection() {
        assert!(SheetPurpose::Team.is_collection());
        assert!(!SheetPurpose::Entry.is_collection());
        assert!(!SheetPurpose::Summary.is_collection());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&SheetPurpose::FinalSchedule).unwrap();
        assert_eq!(json, "\"final_schedule\"");
        let back: SheetPurpose = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SheetPurpose::FinalSchedule);
    }
}
