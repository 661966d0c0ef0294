//! Free-text message parsing for the roster synchronization engine.
//!
//! Turns raw chat messages into typed records: shift messages become hour
//! ranges in shifted-day numbering, team messages become `Team` records which
//! the classifier ranks into main/encore/backup slots.

pub mod error;
pub mod shift;
pub mod team;

pub use error::{ParseError, Result};
pub use shift::parse_shift_message;
pub use team::{classify_teams, parse_team_line, parse_team_message};
