//! Team records, ranking, and the derived summary row.

use serde::{Deserialize, Serialize};

use crate::user::UserInfo;

/// One parsed team composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Who submitted the team.
    pub user: UserInfo,

    /// Skill value of the team leader.
    pub leader_skill_value: i64,

    /// Combined internal skill value of the team.
    pub internal_skill_value: i64,

    /// Raw power of the team.
    pub team_power: f64,

    /// The submitted line, trimmed.
    pub original_message: String,
}

impl Team {
    /// Creates a new team record.
    pub fn new(
        user: UserInfo,
        leader_skill_value: i64,
        internal_skill_value: i64,
        team_power: f64,
        original_message: impl Into<String>,
    ) -> Self {
        Self {
            user,
            leader_skill_value,
            internal_skill_value,
            team_power,
            original_message: original_message.into(),
        }
    }

    /// Ranking score combining leader and internal skill:
    /// `leader + (internal - leader) / 5`.
    pub fn effective_skill_value(&self) -> f64 {
        compute_effective_skill_value(self.leader_skill_value, self.internal_skill_value)
    }
}

/// Computes the effective skill value from its two components.
pub fn compute_effective_skill_value(leader_skill: i64, internal_skill: i64) -> f64 {
    leader_skill as f64 + (internal_skill - leader_skill) as f64 / 5.0
}

/// Teams ranked for one user: one main, an optional encore, and the
/// remaining backups in submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedTeams {
    /// Highest effective skill value.
    pub main: Team,

    /// Highest remaining power, absent when weaker than the main team.
    pub encore: Option<Team>,

    /// Everything else, submission order preserved.
    pub backup: Vec<Team>,
}

impl ClassifiedTeams {
    /// Slot view pairing with team worksheets positionally:
    /// `[Some(main), encore, backup...]`.
    ///
    /// The encore slot stays in place even when empty so that backup teams
    /// always land on the third worksheet onward.
    pub fn slots(&self) -> Vec<Option<&Team>> {
        let mut slots = vec![Some(&self.main), self.encore.as_ref()];
        slots.extend(self.backup.iter().map(Some));
        slots
    }

    /// Number of worksheet slots the classification occupies.
    pub fn slot_count(&self) -> usize {
        2 + self.backup.len()
    }
}

/// One ISV/Power column pair of a summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryColumn {
    /// Team worksheet title the pair belongs to.
    pub title: String,

    /// Effective skill value of the team on that worksheet, if any.
    pub effective_skill_value: Option<f64>,

    /// Power of the team on that worksheet, if any.
    pub team_power: Option<f64>,
}

impl SummaryColumn {
    /// Creates a filled column pair.
    pub fn new(title: impl Into<String>, effective_skill_value: f64, team_power: f64) -> Self {
        Self {
            title: title.into(),
            effective_skill_value: Some(effective_skill_value),
            team_power: Some(team_power),
        }
    }

    /// Creates an empty column pair for a slot the user has no team in.
    pub fn empty(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            effective_skill_value: None,
            team_power: None,
        }
    }
}

/// Derived summary of one user's teams across all team worksheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Who the summary describes.
    pub user: UserInfo,

    /// Encore-capable role names, joined with `", "`.
    pub encore_roles: String,

    /// One entry per configured team worksheet title, in worksheet order.
    pub columns: Vec<SummaryColumn>,
}

impl SummaryRow {
    /// Creates a summary row from explicit columns.
    pub fn new(
        user: UserInfo,
        encore_roles: impl Into<String>,
        columns: Vec<SummaryColumn>,
    ) -> Self {
        Self {
            user,
            encore_roles: encore_roles.into(),
            columns,
        }
    }

    /// Builds the summary row for one classification, pairing worksheet
    /// titles with the classification's slot view positionally.
    ///
    /// Titles beyond the user's slots yield empty column pairs; slots beyond
    /// the configured titles are dropped.
    pub fn from_classified(
        user: UserInfo,
        encore_roles: impl Into<String>,
        classified: &ClassifiedTeams,
        titles: &[String],
    ) -> Self {
        let slots = classified.slots();
        let columns = titles
            .iter()
            .enumerate()
            .map(|(i, title)| match slots.get(i).copied().flatten() {
                Some(team) => {
                    SummaryColumn::new(title, team.effective_skill_value(), team.team_power)
                }
                None => SummaryColumn::empty(title),
            })
            .collect();
        Self::new(user, encore_roles, columns)
    }
}

/// Joins role names the way summary rows store them.
pub fn roles_to_string(roles: &[String]) -> String {
    roles.join(", ")
}
