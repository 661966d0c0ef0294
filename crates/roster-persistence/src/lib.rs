//! Persistence layer for Rosterbot.
//!
//! Per-channel feature configuration lives as JSON files under one store
//! directory, written atomically (temp file, then rename). The feature
//! registry records which feature is enabled in which channel; command
//! routing itself lives elsewhere.

pub mod atomic;
pub mod config;
pub mod error;
pub mod registry;
pub mod store;

pub use config::{ChannelKey, Feature, ShiftRegisterConfig, TeamRegisterConfig};
pub use error::{PersistenceError, Result};
pub use registry::FeatureRegistry;
pub use store::ConfigStore;
