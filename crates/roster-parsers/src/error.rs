//! Error types for message parsing.

use thiserror::Error;

/// Errors that can occur during message parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Line does not match the `leader/internal/power` team format.
    #[error("not a team entry line: {0}")]
    TeamLineFormat(String),
}

/// Result type alias for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;
