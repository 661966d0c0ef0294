//! Sync orchestration for Rosterbot.
//!
//! Composes the worksheet metadata reconciler, the tabular content store,
//! and the config store against one channel's feature configuration;
//! callers feed in records produced by the parsers. All mutating flows for one channel and feature run under
//! the per-key serialization lock; metadata fetches without a mutation do
//! not, so mutating callers re-fetch after acquiring the lock.

pub mod error;
pub mod lock;
pub mod shift;
pub mod team;

pub use error::{Result, SyncError};
pub use lock::{KeyedLock, KeyedLockGuard};
pub use shift::ShiftRegister;
pub use team::TeamRegister;

use roster_persistence::{ChannelKey, Feature};

/// Lock key of one feature instance in one channel.
pub type SyncKey = (ChannelKey, Feature);

/// Shared lock map over all feature instances.
pub type SyncLocks = KeyedLock<SyncKey>;
