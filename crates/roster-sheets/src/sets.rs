//! Per-feature worksheet sets built on the reconciliation primitives.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use roster_models::SheetPurpose;

use crate::error::{Result, SheetsError};
use crate::handle::WorksheetHandle;
use crate::meta::{self, WorksheetMeta};

/// Purposes of the fixed shift worksheet set, in slot order.
const SHIFT_PURPOSES: [SheetPurpose; 3] = [
    SheetPurpose::Entry,
    SheetPurpose::Draft,
    SheetPurpose::FinalSchedule,
];

/// Fixed-arity worksheet set of the shift feature: exactly one entry, one
/// draft, and one final-schedule slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftSheetSet {
    slots: Vec<WorksheetMeta>,
}

impl ShiftSheetSet {
    /// Builds the set from loose slots, assigning entry/draft/final-schedule
    /// purposes positionally.
    ///
    /// Fails structurally with fewer than 3 slots; extra slots beyond the
    /// third are dropped.
    pub fn from_slots(mut slots: Vec<WorksheetMeta>) -> Result<Self> {
        if slots.len() < SHIFT_PURPOSES.len() {
            return Err(SheetsError::Structural(format!(
                "shift worksheet set needs {} slots, got {}",
                SHIFT_PURPOSES.len(),
                slots.len()
            )));
        }
        slots.truncate(SHIFT_PURPOSES.len());
        for (slot, purpose) in slots.iter_mut().zip(SHIFT_PURPOSES) {
            slot.purpose = purpose;
        }
        Ok(Self { slots })
    }

    /// Reconciles the three configured ids against a remote listing.
    pub fn reconcile_by_id(
        entry_id: Option<i64>,
        draft_id: Option<i64>,
        final_schedule_id: Option<i64>,
        listing: &HashMap<i64, WorksheetHandle>,
    ) -> Self {
        let specs = [
            (SheetPurpose::Entry, entry_id),
            (SheetPurpose::Draft, draft_id),
            (SheetPurpose::FinalSchedule, final_schedule_id),
        ];
        Self {
            slots: meta::reconcile_by_id(&specs, listing),
        }
    }

    /// Adopts handles from a title-keyed reconciliation pass.
    ///
    /// A fixed set has no room for appended slots, so only handle fills
    /// apply.
    pub fn merge_by_title(&mut self, theirs: &[WorksheetMeta]) {
        meta::merge_by_title(&mut self.slots, theirs);
        self.slots.truncate(SHIFT_PURPOSES.len());
    }

    /// Assigns a default title to every slot still lacking handle and title.
    pub fn assign_default_titles(&mut self) {
        let desired: Vec<(SheetPurpose, usize)> =
            SHIFT_PURPOSES.iter().map(|&p| (p, 1)).collect();
        meta::assign_default_titles(&mut self.slots, &desired);
    }

    /// Entry worksheet slot.
    pub fn entry(&self) -> &WorksheetMeta {
        &self.slots[0]
    }

    /// Draft worksheet slot.
    pub fn draft(&self) -> &WorksheetMeta {
        &self.slots[1]
    }

    /// Final-schedule worksheet slot.
    pub fn final_schedule(&self) -> &WorksheetMeta {
        &self.slots[2]
    }

    /// All slots in declaration order.
    pub fn slots(&self) -> &[WorksheetMeta] {
        &self.slots
    }

    /// Titles of slots that still need a remote worksheet.
    pub fn missing_titles(&self) -> Vec<String> {
        missing_titles(&self.slots)
    }
}

/// Mixed-arity worksheet set of the team feature: N team slots plus exactly
/// one summary slot.
///
/// The team group may be empty transiently between reconciling an
/// unprovisioned config and assigning default titles; every provisioning
/// pass pads it to at least one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSheetSet {
    teams: Vec<WorksheetMeta>,
    summary: WorksheetMeta,
}

impl TeamSheetSet {
    /// Builds the set from loose slots: the last slot is the summary, all
    /// earlier slots are team slots. Fails structurally on an empty input.
    pub fn from_slots(mut slots: Vec<WorksheetMeta>) -> Result<Self> {
        let Some(mut summary) = slots.pop() else {
            return Err(SheetsError::Structural(
                "team worksheet set needs at least a summary slot".to_string(),
            ));
        };
        summary.purpose = SheetPurpose::Summary;
        for slot in slots.iter_mut() {
            slot.purpose = SheetPurpose::Team;
        }
        Ok(Self {
            teams: slots,
            summary,
        })
    }

    /// Reconciles the configured team ids and summary id against a remote
    /// listing.
    pub fn reconcile_by_id(
        team_ids: &[i64],
        summary_id: Option<i64>,
        listing: &HashMap<i64, WorksheetHandle>,
    ) -> Self {
        let team_specs: Vec<(SheetPurpose, Option<i64>)> = team_ids
            .iter()
            .map(|&id| (SheetPurpose::Team, Some(id)))
            .collect();
        let summary_specs = [(SheetPurpose::Summary, summary_id)];
        let mut summary_slots = meta::reconcile_by_id(&summary_specs, listing);
        Self {
            teams: meta::reconcile_by_id(&team_specs, listing),
            summary: summary_slots.remove(0),
        }
    }

    /// Adopts handles from a title-keyed reconciliation pass, per purpose
    /// group. Unknown team titles are appended; the single summary slot only
    /// takes handle fills.
    pub fn merge_by_title(&mut self, theirs: &[WorksheetMeta]) {
        let team_slots: Vec<WorksheetMeta> = theirs
            .iter()
            .filter(|s| s.purpose == SheetPurpose::Team)
            .cloned()
            .collect();
        meta::merge_by_title(&mut self.teams, &team_slots);

        let summary_slots: Vec<WorksheetMeta> = theirs
            .iter()
            .filter(|s| s.purpose == SheetPurpose::Summary)
            .cloned()
            .collect();
        let mut mine = vec![self.summary.clone()];
        meta::merge_by_title(&mut mine, &summary_slots);
        // The set holds exactly one summary slot. Keep the declared one
        // unless it stayed unresolved and a merged-in slot has a handle.
        let declared = mine.remove(0);
        self.summary = if declared.is_missing() {
            mine.into_iter()
                .find(|s| !s.is_missing())
                .unwrap_or(declared)
        } else {
            declared
        };
    }

    /// Assigns default titles and pads the team group to `desired_team_count`
    /// slots.
    pub fn assign_default_titles(&mut self, desired_team_count: usize) {
        // One combined slot list so used-title bookkeeping spans both groups.
        let mut slots = self.teams.clone();
        slots.push(self.summary.clone());
        meta::assign_default_titles(
            &mut slots,
            &[
                (SheetPurpose::Team, desired_team_count),
                (SheetPurpose::Summary, 1),
            ],
        );
        self.summary = slots
            .iter()
            .position(|s| s.purpose == SheetPurpose::Summary)
            .map(|i| slots.remove(i))
            .unwrap_or_else(|| WorksheetMeta::declared_id(SheetPurpose::Summary, None));
        self.teams = slots;
    }

    /// Team slots in worksheet order.
    pub fn teams(&self) -> &[WorksheetMeta] {
        &self.teams
    }

    /// The summary slot.
    pub fn summary(&self) -> &WorksheetMeta {
        &self.summary
    }

    /// Best-known titles of the team slots, in order. Slots without any
    /// title are skipped.
    pub fn team_titles(&self) -> Vec<String> {
        self.teams
            .iter()
            .filter_map(|s| s.display_title().map(str::to_string))
            .collect()
    }

    /// Titles of slots (both groups) that still need a remote worksheet.
    pub fn missing_titles(&self) -> Vec<String> {
        let mut titles = missing_titles(&self.teams);
        titles.extend(missing_titles(std::slice::from_ref(&self.summary)));
        titles
    }
}

fn missing_titles(slots: &[WorksheetMeta]) -> Vec<String> {
    slots
        .iter()
        .filter(|s| s.handle.is_none())
        .filter_map(|s| s.title.clone())
        .collect()
}
