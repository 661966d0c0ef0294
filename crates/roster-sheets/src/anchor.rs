//! Anchor-cell validation for the final-schedule placement setting.

use std::sync::LazyLock;

use regex::Regex;

/// A1-style cell reference: column letters then a 1-based row number.
static ANCHOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]+[1-9][0-9]*$").expect("Invalid anchor regex"));

/// Fallback when user input is not a valid cell reference.
pub const DEFAULT_ANCHOR_CELL: &str = "A1";

/// Validates a user-supplied anchor cell, silently falling back to
/// [`DEFAULT_ANCHOR_CELL`] on invalid input.
pub fn normalize_anchor_cell(input: &str) -> String {
    let trimmed = input.trim();
    if ANCHOR_REGEX.is_match(trimmed) {
        trimmed.to_string()
    } else {
        DEFAULT_ANCHOR_CELL.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_cells_pass_through() {
        assert_eq!(normalize_anchor_cell("B2"), "B2");
        assert_eq!(normalize_anchor_cell("AA10"), "AA10");
        assert_eq!(normalize_anchor_cell(" C3 "), "C3");
    }

    #[test]
    fn test_invalid_cells_fall_back() {
        assert_eq!(normalize_anchor_cell("invalid!"), "A1");
        assert_eq!(normalize_anchor_cell("b2"), "A1");
        assert_eq!(normalize_anchor_cell("A0"), "A1");
        assert_eq!(normalize_anchor_cell("12"), "A1");
        assert_eq!(normalize_anchor_cell(""), "A1");
    }
}
