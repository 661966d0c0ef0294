//! Config store: one JSON file per channel and feature.

use std::path::PathBuf;

use crate::atomic::{atomic_write_json, read_json_optional, remove_if_exists};
use crate::config::{ChannelKey, Feature, ShiftRegisterConfig, TeamRegisterConfig};
use crate::error::Result;

/// Stores per-channel feature configuration as JSON files:
///
/// ```text
/// base_path/
/// └── configs/
///     └── {guild_id}/
///         └── {channel_id}/
///             ├── shift-register.json
///             └── team-register.json
/// ```
#[derive(Debug, Clone)]
pub struct ConfigStore {
    base_path: PathBuf,
}

impl ConfigStore {
    /// Creates a store rooted at the given directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn config_path(&self, key: ChannelKey, feature: Feature) -> PathBuf {
        self.base_path
            .join("configs")
            .join(key.guild_id.to_string())
            .join(key.channel_id.to_string())
            .join(format!("{}.json", feature.as_str()))
    }

    /// Loads the shift-register config, `None` when the channel has none.
    pub fn load_shift(&self, key: ChannelKey) -> Result<Option<ShiftRegisterConfig>> {
        read_json_optional(&self.config_path(key, Feature::ShiftRegister))
    }

    /// Saves the shift-register config.
    pub fn save_shift(&self, key: ChannelKey, config: &ShiftRegisterConfig) -> Result<()> {
        tracing::debug!(channel = %key, "Saving shift-register config");
        atomic_write_json(&self.config_path(key, Feature::ShiftRegister), config)
    }

    /// Loads the team-register config, `None` when the channel has none.
    pub fn load_team(&self, key: ChannelKey) -> Result<Option<TeamRegisterConfig>> {
        read_json_optional(&self.config_path(key, Feature::TeamRegister))
    }

    /// Saves the team-register config.
    pub fn save_team(&self, key: ChannelKey, config: &TeamRegisterConfig) -> Result<()> {
        tracing::debug!(channel = %key, "Saving team-register config");
        atomic_write_json(&self.config_path(key, Feature::TeamRegister), config)
    }

    /// Deletes a feature's config for a channel; no-op when absent.
    pub fn delete(&self, key: ChannelKey, feature: Feature) -> Result<()> {
        remove_if_exists(&self.config_path(key, feature))
    }
}
