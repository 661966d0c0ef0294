//! User identity shared by every roster record.

use serde::{Deserialize, Serialize};

/// Identity of a submitting user.
///
/// `username` is the stable handle that keys rows in every worksheet;
/// `display_name` is presentation-only and may change between submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserInfo {
    /// Stable unique handle.
    pub username: String,

    /// Human-facing name shown alongside the handle.
    pub display_name: String,
}

impl UserInfo {
    /// Creates a new user identity.
    pub fn new(username: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: display_name.into(),
        }
    }
}
