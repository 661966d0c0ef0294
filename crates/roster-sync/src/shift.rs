//! Shift-register orchestrator.

use std::sync::Arc;

use tracing::{info, warn};

use roster_models::{SheetPurpose, SheetSchema, Shift, UserInfo};
use roster_persistence::{ChannelKey, ConfigStore, Feature, ShiftRegisterConfig};
use roster_sheets::client::{get_or_create_worksheets, listing_by_id};
use roster_sheets::{
    normalize_anchor_cell, read_content, write_content, SheetsClient, SheetsError, ShiftSheetSet,
    TabularContent,
};

use crate::error::{Result, SyncError};
use crate::{SyncKey, SyncLocks};

/// Slot purposes of the shift feature, in worksheet order.
const PURPOSES: [SheetPurpose; 3] = [
    SheetPurpose::Entry,
    SheetPurpose::Draft,
    SheetPurpose::FinalSchedule,
];

/// Orchestrates one channel's shift-register feature against the remote
/// spreadsheet and the config store.
///
/// Every mutating flow acquires the channel's lock first and re-fetches
/// metadata under it; unlocked [`ShiftRegister::fetch_metadata`] results may
/// be stale by the time a caller acts on them.
pub struct ShiftRegister {
    key: ChannelKey,
    client: Arc<dyn SheetsClient>,
    store: ConfigStore,
    locks: SyncLocks,
}

impl ShiftRegister {
    /// Creates the orchestrator for one channel.
    pub fn new(
        key: ChannelKey,
        client: Arc<dyn SheetsClient>,
        store: ConfigStore,
        locks: SyncLocks,
    ) -> Self {
        Self {
            key,
            client,
            store,
            locks,
        }
    }

    fn lock_key(&self) -> SyncKey {
        (self.key, Feature::ShiftRegister)
    }

    fn load_config(&self) -> Result<ShiftRegisterConfig> {
        self.store
            .load_shift(self.key)?
            .ok_or(SyncError::NotConfigured {
                guild_id: self.key.guild_id,
                channel_id: self.key.channel_id,
            })
    }

    /// Points the channel at a spreadsheet, creating the config on first
    /// use. Resolved worksheet ids are kept; a later ensure pass re-checks
    /// them against the new spreadsheet's listing.
    pub async fn configure(&self, sheet_url: &str) -> Result<()> {
        let _guard = self.locks.acquire(self.lock_key()).await?;
        let mut config = self
            .store
            .load_shift(self.key)?
            .unwrap_or_else(|| ShiftRegisterConfig::new(sheet_url));
        config.sheet_url = sheet_url.to_string();
        config.touch();
        self.store.save_shift(self.key, &config)?;
        Ok(())
    }

    /// Reconciles the configured worksheet ids against the remote listing.
    ///
    /// Not serialized; see the type-level note on staleness.
    pub async fn fetch_metadata(&self) -> Result<ShiftSheetSet> {
        let config = self.load_config()?;
        self.reconcile(&config).await
    }

    async fn reconcile(&self, config: &ShiftRegisterConfig) -> Result<ShiftSheetSet> {
        let listing = self.client.list_worksheets(&config.sheet_url).await?;
        Ok(ShiftSheetSet::reconcile_by_id(
            config.entry_worksheet_id,
            config.draft_worksheet_id,
            config.final_schedule_worksheet_id,
            &listing_by_id(&listing),
        ))
    }

    /// Ensures all three worksheets exist, creating missing ones under
    /// default titles, and persists the resolved ids.
    pub async fn ensure_worksheets(&self) -> Result<ShiftSheetSet> {
        let _guard = self.locks.acquire(self.lock_key()).await?;

        let mut config = self.load_config()?;
        let mut set = self.reconcile(&config).await?;
        set.assign_default_titles();

        let wanted: Vec<(SheetPurpose, String)> = set
            .slots()
            .iter()
            .filter(|s| s.is_missing())
            .filter_map(|s| s.title.clone().map(|t| (s.purpose, t)))
            .collect();
        if !wanted.is_empty() {
            let created =
                get_or_create_worksheets(self.client.as_ref(), &config.sheet_url, &wanted).await?;
            set.merge_by_title(&created);
        }

        for slot in set.slots() {
            if slot.is_missing() {
                warn!(channel = %self.key, purpose = %slot.purpose, "Worksheet still missing after ensure");
            }
            config.set_worksheet_id(slot.purpose, slot.worksheet_id());
        }
        config.touch();
        self.store.save_shift(self.key, &config)?;

        info!(channel = %self.key, "Shift worksheets ensured");
        Ok(set)
    }

    /// Admin setup path: binds the three slots to explicitly named
    /// worksheets, creating absent ones, and persists the resolved ids.
    ///
    /// Exactly three titles are required, in entry/draft/final-schedule
    /// order.
    pub async fn provision_from_titles(&self, titles: &[String]) -> Result<ShiftSheetSet> {
        if titles.len() != PURPOSES.len() {
            return Err(SheetsError::Structural(format!(
                "shift provisioning needs {} titles, got {}",
                PURPOSES.len(),
                titles.len()
            ))
            .into());
        }

        let _guard = self.locks.acquire(self.lock_key()).await?;
        let mut config = self.load_config()?;

        let wanted: Vec<(SheetPurpose, String)> = PURPOSES
            .into_iter()
            .zip(titles.iter().cloned())
            .collect();
        let created =
            get_or_create_worksheets(self.client.as_ref(), &config.sheet_url, &wanted).await?;
        let set = ShiftSheetSet::from_slots(created)?;

        for slot in set.slots() {
            config.set_worksheet_id(slot.purpose, slot.worksheet_id());
        }
        config.touch();
        self.store.save_shift(self.key, &config)?;
        Ok(set)
    }

    /// Upserts the user's row on the entry worksheet, or deletes it when
    /// `shift` is `None`.
    ///
    /// A missing entry worksheet is non-fatal: the write is skipped with a
    /// warning (silently, when there is nothing to write anyway).
    pub async fn upsert_or_delete_shift(
        &self,
        user: &UserInfo,
        shift: Option<Shift>,
    ) -> Result<()> {
        let _guard = self.locks.acquire(self.lock_key()).await?;

        let config = self.load_config()?;
        let set = self.reconcile(&config).await?;
        let entry = set.entry();

        let Some(worksheet_id) = entry.handle.as_ref().map(|h| h.id) else {
            if shift.is_some() {
                warn!(channel = %self.key, "Entry worksheet missing, skipping shift write");
            }
            return Ok(());
        };

        let schema = SheetSchema::entry();
        let mut content: TabularContent<Shift> = read_content(
            self.client.as_ref(),
            &config.sheet_url,
            worksheet_id,
            &schema,
        )
        .await?;

        match shift {
            Some(shift) => {
                content.upsert(shift);
                info!(channel = %self.key, username = %user.username, "Shift upserted");
            }
            None => {
                content.delete(&user.username);
                info!(channel = %self.key, username = %user.username, "Shift deleted");
            }
        }

        write_content(
            self.client.as_ref(),
            &config.sheet_url,
            worksheet_id,
            &schema,
            &content,
        )
        .await?;
        Ok(())
    }

    /// Removes the user's entry row.
    pub async fn delete_user_data(&self, user: &UserInfo) -> Result<()> {
        self.upsert_or_delete_shift(user, None).await
    }

    /// Validates and persists the final-schedule anchor cell, silently
    /// normalizing invalid input to `"A1"`. Returns the stored value.
    pub async fn update_anchor_cell(&self, input: &str) -> Result<String> {
        let _guard = self.locks.acquire(self.lock_key()).await?;

        let mut config = self.load_config()?;
        let cell = normalize_anchor_cell(input);
        config.final_schedule_anchor_cell = cell.clone();
        config.touch();
        self.store.save_shift(self.key, &config)?;
        Ok(cell)
    }

    /// Current persisted configuration, for display at the command surface.
    pub fn settings_snapshot(&self) -> Result<Option<ShiftRegisterConfig>> {
        Ok(self.store.load_shift(self.key)?)
    }
}
