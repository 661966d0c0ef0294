//! Feature-channel registry: which feature runs in which channel.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::atomic::{atomic_write_json, read_json_optional, remove_if_exists};
use crate::config::{ChannelKey, Feature};
use crate::error::Result;
use crate::store::ConfigStore;

#[derive(Debug, Serialize, Deserialize)]
struct RegistryEntry {
    enabled: bool,
    updated_at: DateTime<Utc>,
}

/// Records feature enablement per channel, next to the config store's files:
///
/// ```text
/// base_path/
/// └── registry/
///     └── {guild_id}/
///         └── {channel_id}/
///             └── {feature}.json
/// ```
///
/// Disabling keeps the feature's config so re-enabling restores it;
/// [`FeatureRegistry::disable_and_clear`] removes both.
#[derive(Debug, Clone)]
pub struct FeatureRegistry {
    base_path: PathBuf,
}

impl FeatureRegistry {
    /// Creates a registry rooted at the given directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn entry_path(&self, key: ChannelKey, feature: Feature) -> PathBuf {
        self.base_path
            .join("registry")
            .join(key.guild_id.to_string())
            .join(key.channel_id.to_string())
            .join(format!("{}.json", feature.as_str()))
    }

    /// Enables a feature in a channel.
    pub fn enable(&self, key: ChannelKey, feature: Feature) -> Result<()> {
        tracing::info!(channel = %key, feature = %feature, "Enabling feature");
        self.write_entry(key, feature, true)
    }

    /// Disables a feature in a channel, keeping its config.
    pub fn disable(&self, key: ChannelKey, feature: Feature) -> Result<()> {
        tracing::info!(channel = %key, feature = %feature, "Disabling feature");
        self.write_entry(key, feature, false)
    }

    /// Disables a feature and removes both its registry entry and its
    /// persisted config.
    pub fn disable_and_clear(
        &self,
        key: ChannelKey,
        feature: Feature,
        store: &ConfigStore,
    ) -> Result<()> {
        tracing::info!(channel = %key, feature = %feature, "Disabling feature and clearing config");
        remove_if_exists(&self.entry_path(key, feature))?;
        store.delete(key, feature)
    }

    /// Whether a feature is currently enabled in a channel.
    pub fn is_enabled(&self, key: ChannelKey, feature: Feature) -> Result<bool> {
        let entry: Option<RegistryEntry> = read_json_optional(&self.entry_path(key, feature))?;
        Ok(entry.map(|e| e.enabled).unwrap_or(false))
    }

    fn write_entry(&self, key: ChannelKey, feature: Feature, enabled: bool) -> Result<()> {
        let entry = RegistryEntry {
            enabled,
            updated_at: Utc::now(),
        };
        atomic_write_json(&self.entry_path(key, feature), &entry)
    }
}
