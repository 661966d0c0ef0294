//! Shift message parsing.
//!
//! Scans every line of a message for hour ranges like `22-2` or `9〜12` and
//! unions their expansions into one covered-hour set in shifted-day
//! numbering (see [`roster_models::shift`]).

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use roster_models::{Shift, UserInfo, HOURS_PER_DAY, SPLIT_HOUR};

/// Regex matching one hour range: two integers joined by a dash-like
/// separator (ASCII or full-width dash/tilde), anywhere in the line.
/// Endpoints take any digit run; they are reduced modulo 24 after parsing.
static RANGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*[-~－ー―～〜]\s*(\d+)").expect("Invalid range regex")
});

/// Expands one `[start, end)` range modulo 24, wrapping forward when
/// `end <= start`, into shifted-day hour slots.
fn expand_range(start: u32, end: u32, hours: &mut BTreeSet<u8>) {
    let start = start % u32::from(HOURS_PER_DAY);
    let mut end = end % u32::from(HOURS_PER_DAY);
    if end <= start {
        end += u32::from(HOURS_PER_DAY);
    }
    for h in start..end {
        let hour = (h % u32::from(HOURS_PER_DAY)) as u8;
        let slot = if hour < SPLIT_HOUR {
            hour + HOURS_PER_DAY
        } else {
            hour
        };
        hours.insert(slot);
    }
}

/// Parses a whole shift message into a record.
///
/// Returns `None` when no line contains an hour range. This is distinct from
/// a record with an empty hour set, which callers produce themselves to mean
/// "registered, covers nothing".
pub fn parse_shift_message(user: UserInfo, message: &str) -> Option<Shift> {
    let mut hours = BTreeSet::new();
    let mut matched = false;

    for line in message.lines() {
        for cap in RANGE_REGEX.captures_iter(line) {
            // A digit run too long for u64 is skipped, not a message error.
            let Ok(start) = cap[1].parse::<u64>() else {
                continue;
            };
            let Ok(end) = cap[2].parse::<u64>() else {
                continue;
            };
            expand_range(
                (start % u64::from(HOURS_PER_DAY)) as u32,
                (end % u64::from(HOURS_PER_DAY)) as u32,
                &mut hours,
            );
            matched = true;
        }
    }

    if !matched {
        return None;
    }

    let original = message.lines().collect::<Vec<_>>().join(" / ");
    Some(Shift::new(user, hours, original))
}
