//! Per-channel feature configuration records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roster_models::SheetPurpose;

/// Default anchor cell for the final schedule.
pub const DEFAULT_ANCHOR_CELL: &str = "A1";

/// Key of one feature instance: a channel inside a guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelKey {
    pub guild_id: u64,
    pub channel_id: u64,
}

impl ChannelKey {
    /// Creates a channel key.
    pub fn new(guild_id: u64, channel_id: u64) -> Self {
        Self {
            guild_id,
            channel_id,
        }
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.guild_id, self.channel_id)
    }
}

/// Self-registration feature a channel can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    ShiftRegister,
    TeamRegister,
}

impl Feature {
    /// Stable string form used in file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::ShiftRegister => "shift-register",
            Feature::TeamRegister => "team-register",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Persisted configuration of the shift-register feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftRegisterConfig {
    /// Spreadsheet the channel synchronizes with.
    pub sheet_url: String,

    pub entry_worksheet_id: Option<i64>,
    pub draft_worksheet_id: Option<i64>,
    pub final_schedule_worksheet_id: Option<i64>,

    /// Cell anchoring the rendered final schedule, always a valid A1-style
    /// reference.
    pub final_schedule_anchor_cell: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShiftRegisterConfig {
    /// Fresh config with no resolved worksheets.
    pub fn new(sheet_url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            sheet_url: sheet_url.into(),
            entry_worksheet_id: None,
            draft_worksheet_id: None,
            final_schedule_worksheet_id: None,
            final_schedule_anchor_cell: DEFAULT_ANCHOR_CELL.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the config as modified.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Stores a resolved worksheet id into the field its purpose maps to.
    /// Purposes foreign to this feature are ignored.
    pub fn set_worksheet_id(&mut self, purpose: SheetPurpose, id: Option<i64>) {
        match purpose {
            SheetPurpose::Entry => self.entry_worksheet_id = id,
            SheetPurpose::Draft => self.draft_worksheet_id = id,
            SheetPurpose::FinalSchedule => self.final_schedule_worksheet_id = id,
            SheetPurpose::Team | SheetPurpose::Summary => {}
        }
    }
}

/// Persisted configuration of the team-register feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRegisterConfig {
    /// Spreadsheet the channel synchronizes with.
    pub sheet_url: String,

    /// Team worksheet ids in slot order.
    pub team_worksheet_ids: Vec<i64>,

    pub summary_worksheet_id: Option<i64>,

    /// Externally defined role ids counted as encore-capable during summary
    /// refresh.
    pub encore_role_ids: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamRegisterConfig {
    /// Fresh config with no resolved worksheets.
    pub fn new(sheet_url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            sheet_url: sheet_url.into(),
            team_worksheet_ids: Vec::new(),
            summary_worksheet_id: None,
            encore_role_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the config as modified.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Clears the resolved worksheet fields before an ensure pass re-applies
    /// them, so repeated passes cannot accumulate stale team ids.
    pub fn clear_worksheet_ids(&mut self) {
        self.team_worksheet_ids.clear();
        self.summary_worksheet_id = None;
    }

    /// Stores a resolved worksheet id into the field its purpose maps to:
    /// the team collection appends in slot order, the summary assigns.
    /// Purposes foreign to this feature are ignored.
    pub fn push_worksheet_id(&mut self, purpose: SheetPurpose, id: Option<i64>) {
        match purpose {
            SheetPurpose::Team => {
                if let Some(id) = id {
                    self.team_worksheet_ids.push(id);
                }
            }
            SheetPurpose::Summary => self.summary_worksheet_id = id,
            SheetPurpose::Entry | SheetPurpose::Draft | SheetPurpose::FinalSchedule => {}
        }
    }
}
