//! Shift records and the shifted-day hour numbering.
//!
//! A roster day does not start at midnight: hours below [`SPLIT_HOUR`] count
//! as the previous day's late night, so one day spans `SPLIT_HOUR` to
//! `SPLIT_HOUR + 24` and an overnight range like 22-2 stays contiguous
//! (22, 23, 24, 25 in shifted numbering).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::user::UserInfo;

/// Hour boundary separating one roster day from the next.
pub const SPLIT_HOUR: u8 = 4;

/// Number of hour slots in one roster day.
pub const HOURS_PER_DAY: u8 = 24;

/// All hour slots of one roster day in shifted numbering (4 through 27).
pub fn hour_slots() -> impl Iterator<Item = u8> {
    SPLIT_HOUR..SPLIT_HOUR + HOURS_PER_DAY
}

/// Column label for one hour slot, e.g. `"4-5"` or `"27-28"`.
pub fn hour_label(slot: u8) -> String {
    format!("{}-{}", slot, slot + 1)
}

/// A user's registered shift: the set of covered hour slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Who registered the shift.
    pub user: UserInfo,

    /// Covered hour slots in shifted numbering.
    pub hours: BTreeSet<u8>,

    /// The submitted message lines, joined with `" / "`.
    pub original_message: String,
}

impl Shift {
    /// Creates a new shift record.
    pub fn new(user: UserInfo, hours: BTreeSet<u8>, original_message: impl Into<String>) -> Self {
        Self {
            user,
            hours,
            original_message: original_message.into(),
        }
    }

    /// Whether any hour slot is covered.
    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    /// Ordered `(label, covered)` pairs for every hour slot of the day.
    pub fn hour_flags(&self) -> Vec<(String, bool)> {
        hour_slots()
            .map(|slot| (hour_label(slot), self.hours.contains(&slot)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserInfo {
        UserInfo::new("alice", "Alice A.")
    }

    #[test]
    fn test_hour_slots_cover_one_day() {
        let slots: Vec<u8> = hour_slots().collect();
        assert_eq!(slots.len(), 24);
        assert_eq!(slots.first(), Some(&4));
        assert_eq!(slots.last(), Some(&27));
    }

    #[test]
    fn test_hour_labels() {
        assert_eq!(hour_label(4), "4-5");
        assert_eq!(hour_label(27), "27-28");
    }

    #[test]
    fn test_hour_flags_ordered_and_complete() {
        let hours: BTreeSet<u8> = [4, 5, 27].into_iter().collect();
        let shift = Shift::new(user(), hours, "4-6 / 3-4");

        let flags = shift.hour_flags();
        assert_eq!(flags.len(), 24);
        assert_eq!(flags[0], ("4-5".to_string(), true));
        assert_eq!(flags[1], ("5-6".to_string(), true));
        assert_eq!(flags[2], ("6-7".to_string(), false));
        assert_eq!(flags[23], ("27-28".to_string(), true));
    }

    #[test]
    fn test_empty_shift() {
        let shift = Shift::new(user(), BTreeSet::new(), "");
        assert!(shift.is_empty());
        assert!(shift.hour_flags().iter().all(|(_, covered)| !covered));
    }
}
