//! Worksheet metadata and the reconciliation primitives.
//!
//! Remote worksheet creation is title-addressed, not transactionally
//! reserved, so provisioning works in passes: reconcile declared ids or
//! titles against a listing, assign collision-free default titles to the
//! slots still missing, create those titles remotely, then merge the
//! freshly listed handles back. Collision avoidance is purely name-based
//! within the in-memory set; callers must re-fetch and re-merge after any
//! creation round-trip before trusting a title as free.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use roster_models::{SheetPurpose, TitleSequence};

use crate::handle::WorksheetHandle;

/// One declared worksheet slot, possibly resolved to a remote handle.
///
/// Once a reconciliation pass has run, a slot either carries at least one of
/// `id`/`title`, or its handle is `None` and the worksheet is considered
/// missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksheetMeta {
    /// Declared worksheet id, if configured.
    pub id: Option<i64>,

    /// Declared title, if configured or assigned.
    pub title: Option<String>,

    /// Remote handle attached by a reconciliation pass.
    pub handle: Option<WorksheetHandle>,

    /// Role the worksheet plays within its feature.
    pub purpose: SheetPurpose,
}

impl WorksheetMeta {
    /// Slot declared by id, not yet reconciled.
    pub fn declared_id(purpose: SheetPurpose, id: Option<i64>) -> Self {
        Self {
            id,
            title: None,
            handle: None,
            purpose,
        }
    }

    /// Slot declared by title, not yet reconciled.
    pub fn declared_title(purpose: SheetPurpose, title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: Some(title.into()),
            handle: None,
            purpose,
        }
    }

    /// Slot fully resolved from a remote handle.
    pub fn resolved(purpose: SheetPurpose, handle: WorksheetHandle) -> Self {
        Self {
            id: Some(handle.id),
            title: Some(handle.title.clone()),
            handle: Some(handle),
            purpose,
        }
    }

    /// Whether the slot has no attached remote handle.
    pub fn is_missing(&self) -> bool {
        self.handle.is_none()
    }

    /// Worksheet id usable for remote reads/writes.
    pub fn worksheet_id(&self) -> Option<i64> {
        self.handle.as_ref().map(|h| h.id).or(self.id)
    }

    /// Best-known title: declared, or from the attached handle.
    pub fn display_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or_else(|| self.handle.as_ref().map(|h| h.title.as_str()))
    }

    /// Attaches a handle, keeping the declared id and refreshing the title
    /// from the handle.
    fn attach_keep_id(&mut self, handle: WorksheetHandle) {
        self.title = Some(handle.title.clone());
        self.handle = Some(handle);
    }

    /// Attaches a handle, keeping the declared title and refreshing the id
    /// from the handle.
    fn attach_keep_title(&mut self, handle: WorksheetHandle) {
        self.id = Some(handle.id);
        self.handle = Some(handle);
    }
}

/// Reconciles configured ids against a remote listing keyed by id.
///
/// Unconfigured or unmatched ids yield slots with no handle.
pub fn reconcile_by_id(
    specs: &[(SheetPurpose, Option<i64>)],
    listing: &HashMap<i64, WorksheetHandle>,
) -> Vec<WorksheetMeta> {
    specs
        .iter()
        .map(|&(purpose, id)| {
            let mut slot = WorksheetMeta::declared_id(purpose, id);
            if let Some(handle) = id.and_then(|id| listing.get(&id)) {
                slot.attach_keep_id(handle.clone());
            }
            slot
        })
        .collect()
}

/// Reconciles configured titles against a remote listing keyed by title.
pub fn reconcile_by_title(
    specs: &[(SheetPurpose, String)],
    listing: &HashMap<String, WorksheetHandle>,
) -> Vec<WorksheetMeta> {
    specs
        .iter()
        .map(|(purpose, title)| {
            let mut slot = WorksheetMeta::declared_title(*purpose, title.clone());
            if let Some(handle) = listing.get(title) {
                slot.attach_keep_title(handle.clone());
            }
            slot
        })
        .collect()
}

/// Fills unresolved slots in `mine` from same-id slots in `theirs`, then
/// appends slots of `theirs` whose id is unknown to `mine`.
///
/// Slots without an id on both sides are never matched against each other,
/// so a merge cannot collapse two anonymous slots.
pub fn merge_by_id(mine: &mut Vec<WorksheetMeta>, theirs: &[WorksheetMeta]) {
    for slot in mine.iter_mut() {
        if slot.handle.is_some() {
            continue;
        }
        let Some(id) = slot.id else { continue };
        if let Some(other) = theirs
            .iter()
            .find(|o| o.id == Some(id) && o.handle.is_some())
        {
            if let Some(handle) = other.handle.clone() {
                slot.attach_keep_id(handle);
            }
        }
    }

    let known: HashSet<i64> = mine.iter().filter_map(|s| s.id).collect();
    for other in theirs {
        match other.id {
            Some(id) if known.contains(&id) => {}
            _ => mine.push(other.clone()),
        }
    }
}

/// Fills unresolved slots in `mine` from same-title slots in `theirs`, then
/// appends slots of `theirs` whose title is unknown to `mine`.
pub fn merge_by_title(mine: &mut Vec<WorksheetMeta>, theirs: &[WorksheetMeta]) {
    for slot in mine.iter_mut() {
        if slot.handle.is_some() {
            continue;
        }
        let Some(title) = slot.title.clone() else {
            continue;
        };
        if let Some(other) = theirs
            .iter()
            .find(|o| o.title.as_deref() == Some(title.as_str()) && o.handle.is_some())
        {
            if let Some(handle) = other.handle.clone() {
                slot.attach_keep_title(handle);
            }
        }
    }

    let known: HashSet<&str> = mine.iter().filter_map(|s| s.title.as_deref()).collect();
    let append: Vec<WorksheetMeta> = theirs
        .iter()
        .filter(|other| match other.title.as_deref() {
            Some(title) => !known.contains(title),
            None => true,
        })
        .cloned()
        .collect();
    mine.extend(append);
}

/// Assigns default titles to slots lacking both handle and title, and pads
/// each listed purpose to its desired slot count with fresh null-handle
/// slots.
///
/// One title generator per purpose serves the whole pass, and a title
/// already present anywhere in the set is never assigned, so a retried pass
/// cannot collide with titles it assigned earlier. Slots are never removed;
/// a purpose already at or above its desired count only gets titles for its
/// untitled slots.
pub fn assign_default_titles(
    slots: &mut Vec<WorksheetMeta>,
    desired_counts: &[(SheetPurpose, usize)],
) {
    let mut used: HashSet<String> = slots
        .iter()
        .filter_map(|s| s.display_title().map(str::to_string))
        .collect();

    for &(purpose, desired) in desired_counts {
        let mut titles = purpose.titles();

        for slot in slots
            .iter_mut()
            .filter(|s| s.purpose == purpose && s.handle.is_none() && s.title.is_none())
        {
            let title = next_unused(&mut titles, &used);
            slot.title = Some(title.clone());
            used.insert(title);
        }

        let mut count = slots.iter().filter(|s| s.purpose == purpose).count();
        while count < desired {
            let title = next_unused(&mut titles, &used);
            used.insert(title.clone());
            slots.push(WorksheetMeta::declared_title(purpose, title));
            count += 1;
        }
    }
}

/// Next title from the sequence not yet present in `used`.
fn next_unused(titles: &mut TitleSequence, used: &HashSet<String>) -> String {
    loop {
        // The sequence is infinite.
        if let Some(title) = titles.next() {
            if !used.contains(&title) {
                return title;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(id: i64, title: &str) -> WorksheetHandle {
        WorksheetHandle::new(id, title, 100, 20)
    }

    fn listing_by_id(handles: &[WorksheetHandle]) -> HashMap<i64, WorksheetHandle> {
        handles.iter().map(|h| (h.id, h.clone())).collect()
    }

    fn listing_by_title(handles: &[WorksheetHandle]) -> HashMap<String, WorksheetHandle> {
        handles.iter().map(|h| (h.title.clone(), h.clone())).collect()
    }

    #[test]
    fn test_reconcile_by_id_attaches_and_fills_title() {
        let listing = listing_by_id(&[handle(10, "Shift Entry")]);
        let slots = reconcile_by_id(
            &[
                (SheetPurpose::Entry, Some(10)),
                (SheetPurpose::Draft, Some(11)),
                (SheetPurpose::FinalSchedule, None),
            ],
            &listing,
        );

        assert!(!slots[0].is_missing());
        assert_eq!(slots[0].title.as_deref(), Some("Shift Entry"));
        assert!(slots[1].is_missing());
        assert_eq!(slots[1].id, Some(11));
        assert!(slots[2].is_missing());
        assert_eq!(slots[2].id, None);
    }

    #[test]
    fn test_reconcile_by_title_attaches_and_fills_id() {
        let listing = listing_by_title(&[handle(10, "Main Team")]);
        let slots = reconcile_by_title(
            &[
                (SheetPurpose::Team, "Main Team".to_string()),
                (SheetPurpose::Team, "Encore Team".to_string()),
            ],
            &listing,
        );

        assert_eq!(slots[0].id, Some(10));
        assert!(!slots[0].is_missing());
        assert!(slots[1].is_missing());
        assert_eq!(slots[1].title.as_deref(), Some("Encore Team"));
    }

    #[test]
    fn test_merge_by_title_fills_handle_and_refreshes_id() {
        let mut mine = vec![WorksheetMeta::declared_title(SheetPurpose::Entry, "Shift Entry")];
        let theirs = vec![WorksheetMeta::resolved(
            SheetPurpose::Entry,
            handle(42, "Shift Entry"),
        )];

        merge_by_title(&mut mine, &theirs);

        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, Some(42));
        assert!(!mine[0].is_missing());
        assert_eq!(mine[0].title.as_deref(), Some("Shift Entry"));
    }

    #[test]
    fn test_merge_by_id_keeps_declared_id_and_takes_title() {
        let mut mine = vec![WorksheetMeta::declared_id(SheetPurpose::Entry, Some(42))];
        let theirs = vec![WorksheetMeta::resolved(
            SheetPurpose::Entry,
            handle(42, "Renamed Entry"),
        )];

        merge_by_id(&mut mine, &theirs);

        assert_eq!(mine[0].id, Some(42));
        assert_eq!(mine[0].title.as_deref(), Some("Renamed Entry"));
        assert!(!mine[0].is_missing());
    }

    #[test]
    fn test_merge_appends_unknown_keys() {
        let mut mine = vec![WorksheetMeta::declared_title(SheetPurpose::Team, "Main Team")];
        let theirs = vec![
            WorksheetMeta::resolved(SheetPurpose::Team, handle(1, "Main Team")),
            WorksheetMeta::resolved(SheetPurpose::Summary, handle(2, "Team Summary")),
        ];

        merge_by_title(&mut mine, &theirs);

        assert_eq!(mine.len(), 2);
        assert_eq!(mine[1].purpose, SheetPurpose::Summary);
    }

    #[test]
    fn test_merge_never_collapses_anonymous_slots() {
        let mut mine = vec![WorksheetMeta::declared_id(SheetPurpose::Draft, None)];
        let theirs = vec![WorksheetMeta::declared_id(SheetPurpose::Draft, None)];

        merge_by_id(&mut mine, &theirs);

        assert_eq!(mine.len(), 2);
    }

    #[test]
    fn test_assign_default_titles_skips_used_and_pads() {
        let mut slots = vec![
            WorksheetMeta::resolved(SheetPurpose::Team, handle(1, "Main Team")),
            WorksheetMeta::declared_id(SheetPurpose::Team, None),
        ];

        assign_default_titles(&mut slots, &[(SheetPurpose::Team, 3)]);

        assert_eq!(slots.len(), 3);
        // "Main Team" is taken, so the untitled slot gets "Encore Team" and
        // the padding slot "Backup Team".
        assert_eq!(slots[1].title.as_deref(), Some("Encore Team"));
        assert_eq!(slots[2].title.as_deref(), Some("Backup Team"));
    }

    #[test]
    fn test_assign_default_titles_idempotent() {
        let mut slots = vec![WorksheetMeta::declared_id(SheetPurpose::Summary, None)];

        assign_default_titles(&mut slots, &[(SheetPurpose::Summary, 1)]);
        let first: Vec<Option<String>> = slots.iter().map(|s| s.title.clone()).collect();

        assign_default_titles(&mut slots, &[(SheetPurpose::Summary, 1)]);
        let second: Vec<Option<String>> = slots.iter().map(|s| s.title.clone()).collect();

        assert_eq!(first, second);
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn test_assign_default_titles_never_duplicates_within_pass() {
        let mut slots = Vec::new();
        assign_default_titles(&mut slots, &[(SheetPurpose::Team, 5)]);

        let titles: HashSet<String> = slots.iter().filter_map(|s| s.title.clone()).collect();
        assert_eq!(titles.len(), 5);
        assert!(titles.contains("Team 4"));
        assert!(titles.contains("Team 5"));
    }

    #[test]
    fn test_assign_default_titles_does_not_truncate() {
        let mut slots = vec![
            WorksheetMeta::resolved(SheetPurpose::Team, handle(1, "Main Team")),
            WorksheetMeta::resolved(SheetPurpose::Team, handle(2, "Encore Team")),
        ];

        assign_default_titles(&mut slots, &[(SheetPurpose::Team, 1)]);

        assert_eq!(slots.len(), 2);
    }
}
