//! Team-register orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{info, warn};

use roster_models::{
    roles_to_string, ClassifiedTeams, SheetPurpose, SheetSchema, SummaryColumn, SummaryRow, Team,
    UserInfo,
};
use roster_persistence::{ChannelKey, ConfigStore, Feature, TeamRegisterConfig};
use roster_sheets::client::{get_or_create_worksheets, listing_by_id};
use roster_sheets::meta::WorksheetMeta;
use roster_sheets::{
    read_content, write_content, SheetsClient, TabularContent, TeamSheetSet,
};

use crate::error::{Result, SyncError};
use crate::{SyncKey, SyncLocks};

/// Team slots provisioned when a channel has no worksheets yet.
const DEFAULT_TEAM_SLOTS: usize = 3;

/// Orchestrates one channel's team-register feature against the remote
/// spreadsheet and the config store.
///
/// Mutating flows lock the channel and re-fetch metadata under the lock;
/// per-slot writes within one flow run concurrently, the lock already
/// serializes whole flows.
pub struct TeamRegister {
    key: ChannelKey,
    client: Arc<dyn SheetsClient>,
    store: ConfigStore,
    locks: SyncLocks,
}

impl TeamRegister {
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
        (self.key, Feature::TeamRegister)
    }

    fn load_config(&self) -> Result<TeamRegisterConfig> {
        self.store
            .load_team(self.key)?
            .ok_or(SyncError::NotConfigured {
                guild_id: self.key.guild_id,
                channel_id: self.key.channel_id,
            })
    }

    /// Points the channel at a spreadsheet, creating the config on first
    /// use.
    pub async fn configure(&self, sheet_url: &str) -> Result<()> {
        let _guard = self.locks.acquire(self.lock_key()).await?;
        let mut config = self
            .store
            .load_team(self.key)?
            .unwrap_or_else(|| TeamRegisterConfig::new(sheet_url));
        config.sheet_url = sheet_url.to_string();
        config.touch();
        self.store.save_team(self.key, &config)?;
        Ok(())
    }

    /// Reconciles the configured worksheet ids against the remote listing.
    ///
    /// Not serialized; mutating callers re-fetch under the lock.
    pub async fn fetch_metadata(&self) -> Result<TeamSheetSet> {
        let config = self.load_config()?;
        self.reconcile(&config).await
    }

    async fn reconcile(&self, config: &TeamRegisterConfig) -> Result<TeamSheetSet> {
        let listing = self.client.list_worksheets(&config.sheet_url).await?;
        Ok(TeamSheetSet::reconcile_by_id(
            &config.team_worksheet_ids,
            config.summary_worksheet_id,
            &listing_by_id(&listing),
        ))
    }

    /// Ensures team and summary worksheets exist, creating missing ones
    /// under default titles, and persists the resolved ids in slot order.
    ///
    /// `desired_team_count` of zero keeps however many team slots the
    /// config currently has; a fresh config gets [`DEFAULT_TEAM_SLOTS`].
    pub async fn ensure_worksheets(&self, desired_team_count: usize) -> Result<TeamSheetSet> {
        let _guard = self.locks.acquire(self.lock_key()).await?;

        let mut config = self.load_config()?;
        let mut set = self.reconcile(&config).await?;

        let effective = if desired_team_count > 0 {
            desired_team_count
        } else if !set.teams().is_empty() {
            set.teams().len()
        } else {
            DEFAULT_TEAM_SLOTS
        };
        set.assign_default_titles(effective);

        let wanted: Vec<(SheetPurpose, String)> = set
            .teams()
            .iter()
            .chain(std::iter::once(set.summary()))
            .filter(|s| s.is_missing())
            .filter_map(|s| s.title.clone().map(|t| (s.purpose, t)))
            .collect();
        if !wanted.is_empty() {
            let created =
                get_or_create_worksheets(self.client.as_ref(), &config.sheet_url, &wanted).await?;
            set.merge_by_title(&created);
        }

        config.clear_worksheet_ids();
        for slot in set.teams() {
            if slot.is_missing() {
                warn!(channel = %self.key, title = ?slot.title, "Team worksheet still missing after ensure");
            }
            config.push_worksheet_id(SheetPurpose::Team, slot.worksheet_id());
        }
        config.push_worksheet_id(SheetPurpose::Summary, set.summary().worksheet_id());
        config.touch();
        self.store.save_team(self.key, &config)?;

        info!(channel = %self.key, teams = set.teams().len(), "Team worksheets ensured");
        Ok(set)
    }

    /// Writes a classification across the team worksheets: slot N of the
    /// classification goes to team worksheet N.
    ///
    /// Zipping runs to the longer side, so a worksheet beyond the user's
    /// slots gets their stale row deleted, and a slot beyond the configured
    /// worksheets is skipped with a warning. Slot writes run concurrently.
    pub async fn upsert_user_teams(
        &self,
        user: &UserInfo,
        classified: &ClassifiedTeams,
    ) -> Result<()> {
        let _guard = self.locks.acquire(self.lock_key()).await?;

        let config = self.load_config()?;
        let set = self.reconcile(&config).await?;

        let slots = classified.slots();
        let count = slots.len().max(set.teams().len());
        let writes = (0..count).map(|i| {
            let record = slots.get(i).copied().flatten();
            let worksheet = set.teams().get(i);
            let sheet_url = config.sheet_url.as_str();
            async move {
                match worksheet {
                    Some(worksheet) => {
                        self.write_team_slot(sheet_url, worksheet, user, record).await
                    }
                    None => {
                        if record.is_some() {
                            warn!(channel = %self.key, slot = i, "No team worksheet for slot, skipping write");
                        }
                        Ok(())
                    }
                }
            }
        });
        try_join_all(writes).await?;

        info!(channel = %self.key, username = %user.username, "User teams upserted");
        Ok(())
    }

    /// Removes the user's row from every team worksheet.
    pub async fn delete_user_teams(&self, user: &UserInfo) -> Result<()> {
        let _guard = self.locks.acquire(self.lock_key()).await?;

        let config = self.load_config()?;
        let set = self.reconcile(&config).await?;

        let deletes = set.teams().iter().map(|worksheet| {
            let sheet_url = config.sheet_url.as_str();
            async move { self.write_team_slot(sheet_url, worksheet, user, None).await }
        });
        try_join_all(deletes).await?;

        info!(channel = %self.key, username = %user.username, "User teams deleted");
        Ok(())
    }

    async fn write_team_slot(
        &self,
        sheet_url: &str,
        worksheet: &WorksheetMeta,
        user: &UserInfo,
        team: Option<&Team>,
    ) -> Result<()> {
        let Some(worksheet_id) = worksheet.handle.as_ref().map(|h| h.id) else {
            if team.is_some() {
                warn!(channel = %self.key, title = ?worksheet.title, "Team worksheet missing, skipping write");
            }
            return Ok(());
        };

        let schema = SheetSchema::team();
        let mut content: TabularContent<Team> =
            read_content(self.client.as_ref(), sheet_url, worksheet_id, &schema).await?;
        match team {
            Some(team) => content.upsert(team.clone()),
            None => content.delete(&user.username),
        }
        write_content(self.client.as_ref(), sheet_url, worksheet_id, &schema, &content).await?;
        Ok(())
    }

    /// Upserts the user's summary row from a classification, pairing team
    /// worksheet titles with the classification's slots positionally.
    ///
    /// `user_role_ids` is filtered against the configured encore-role ids
    /// before joining into the roles cell. A missing summary worksheet is
    /// skipped with a warning.
    pub async fn upsert_user_summary(
        &self,
        user: &UserInfo,
        classified: &ClassifiedTeams,
        user_role_ids: &[String],
    ) -> Result<()> {
        let _guard = self.locks.acquire(self.lock_key()).await?;

        let config = self.load_config()?;
        let set = self.reconcile(&config).await?;

        let Some(summary_id) = set.summary().handle.as_ref().map(|h| h.id) else {
            warn!(channel = %self.key, "Summary worksheet missing, skipping write");
            return Ok(());
        };

        let titles = set.team_titles();
        let schema = SheetSchema::summary(&titles);
        let roles = filter_encore_roles(user_role_ids, &config.encore_role_ids);
        let row = SummaryRow::from_classified(user.clone(), roles, classified, &titles);

        let mut content: TabularContent<SummaryRow> =
            read_content(self.client.as_ref(), &config.sheet_url, summary_id, &schema).await?;
        content.upsert(row);
        write_content(
            self.client.as_ref(),
            &config.sheet_url,
            summary_id,
            &schema,
            &content,
        )
        .await?;

        info!(channel = %self.key, username = %user.username, "User summary upserted");
        Ok(())
    }

    /// Rebuilds the summary worksheet from every team worksheet.
    ///
    /// Identities keep first-occurrence order across team worksheets.
    /// Display names and encore roles come from the supplied lookups and
    /// default to blank when absent, so rows of departed users survive with
    /// a blank display name. The summary's overflow rows and original row
    /// count are preserved.
    pub async fn refresh_summary(
        &self,
        display_names: &HashMap<String, String>,
        encore_roles_by_user: &HashMap<String, Vec<String>>,
    ) -> Result<()> {
        let _guard = self.locks.acquire(self.lock_key()).await?;

        let config = self.load_config()?;
        let set = self.reconcile(&config).await?;

        let Some(summary_id) = set.summary().handle.as_ref().map(|h| h.id) else {
            warn!(channel = %self.key, "Summary worksheet missing, skipping refresh");
            return Ok(());
        };

        // Column index per team slot; slots without any title get none and
        // contribute no column.
        let mut titles = Vec::new();
        let mut column_of_slot = Vec::with_capacity(set.teams().len());
        for worksheet in set.teams() {
            match worksheet.display_title() {
                Some(title) => {
                    column_of_slot.push(Some(titles.len()));
                    titles.push(title.to_string());
                }
                None => column_of_slot.push(None),
            }
        }

        let team_schema = SheetSchema::team();
        let reads = set.teams().iter().map(|worksheet| {
            let sheet_url = config.sheet_url.as_str();
            let schema = &team_schema;
            async move {
                match worksheet.handle.as_ref().map(|h| h.id) {
                    Some(id) => {
                        read_content::<Team>(self.client.as_ref(), sheet_url, id, schema)
                            .await
                            .map(Some)
                    }
                    None => {
                        warn!(channel = %self.key, title = ?worksheet.title, "Team worksheet missing, excluded from summary refresh");
                        Ok(None)
                    }
                }
            }
        });
        let contents = try_join_all(reads).await?;

        let mut order: Vec<String> = Vec::new();
        let mut values: HashMap<String, Vec<Option<(f64, f64)>>> = HashMap::new();
        for (slot, content) in contents.iter().enumerate() {
            let Some(content) = content else { continue };
            let Some(column) = column_of_slot[slot] else { continue };
            for team in content.typed() {
                let username = team.user.username.clone();
                let entry = values.entry(username.clone()).or_insert_with(|| {
                    order.push(username);
                    vec![None; titles.len()]
                });
                entry[column] = Some((team.effective_skill_value(), team.team_power));
            }
        }

        let rows: Vec<SummaryRow> = order
            .into_iter()
            .map(|username| {
                let display_name = display_names.get(&username).cloned().unwrap_or_default();
                let roles = encore_roles_by_user
                    .get(&username)
                    .map(|ids| filter_encore_roles(ids, &config.encore_role_ids))
                    .unwrap_or_default();
                let pairs = values.remove(&username).unwrap_or_default();
                let columns = titles
                    .iter()
                    .enumerate()
                    .map(|(i, title)| match pairs.get(i).copied().flatten() {
                        Some((isv, power)) => SummaryColumn::new(title, isv, power),
                        None => SummaryColumn::empty(title),
                    })
                    .collect();
                SummaryRow::new(UserInfo::new(username, display_name), roles, columns)
            })
            .collect();

        let schema = SheetSchema::summary(&titles);
        let mut content: TabularContent<SummaryRow> =
            read_content(self.client.as_ref(), &config.sheet_url, summary_id, &schema).await?;
        content.replace_typed(rows);
        write_content(
            self.client.as_ref(),
            &config.sheet_url,
            summary_id,
            &schema,
            &content,
        )
        .await?;

        info!(channel = %self.key, "Summary refreshed");
        Ok(())
    }

    /// Persists the configured encore-role id list.
    pub async fn update_encore_roles(&self, role_ids: Vec<String>) -> Result<()> {
        let _guard = self.locks.acquire(self.lock_key()).await?;

        let mut config = self.load_config()?;
        config.encore_role_ids = role_ids;
        config.touch();
        self.store.save_team(self.key, &config)?;
        Ok(())
    }

    /// Current persisted configuration, for display at the command surface.
    pub fn settings_snapshot(&self) -> Result<Option<TeamRegisterConfig>> {
        Ok(self.store.load_team(self.key)?)
    }
}

/// Keeps only role ids the feature counts as encore-capable, joined the way
/// summary rows store them.
fn filter_encore_roles(user_role_ids: &[String], configured: &[String]) -> String {
    let filtered: Vec<String> = user_role_ids
        .iter()
        .filter(|id| configured.contains(id))
        .cloned()
        .collect();
    roles_to_string(&filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_parsers::{classify_teams, parse_team_message};
    use roster_sheets::MemorySheets;
    use tempfile::tempdir;

    const URL: &str = "https://sheets.example/team";

    fn user() -> UserInfo {
        UserInfo::new("alice", "Alice A.")
    }

    fn classified(message: &str) -> ClassifiedTeams {
        classify_teams(parse_team_message(&user(), message)).unwrap()
    }

    async fn setup() -> (TeamRegister, Arc<MemorySheets>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let sheets = Arc::new(MemorySheets::new());
        let register = TeamRegister::new(
            ChannelKey::new(1, 2),
            sheets.clone(),
            ConfigStore::new(dir.path()),
            SyncLocks::new(),
        );
        register.configure(URL).await.unwrap();
        (register, sheets, dir)
    }

    #[tokio::test]
    async fn test_ensure_defaults_to_three_teams_plus_summary() {
        let (register, sheets, _dir) = setup().await;

        let set = register.ensure_worksheets(0).await.unwrap();
        assert_eq!(set.teams().len(), 3);
        assert!(!set.summary().is_missing());
        assert_eq!(
            set.team_titles(),
            vec!["Main Team", "Encore Team", "Backup Team"]
        );

        assert_eq!(sheets.list_worksheets(URL).await.unwrap().len(), 4);

        let config = register.settings_snapshot().unwrap().unwrap();
        assert_eq!(config.team_worksheet_ids.len(), 3);
        assert!(config.summary_worksheet_id.is_some());
    }

    #[tokio::test]
    async fn test_ensure_zero_keeps_current_count() {
        let (register, sheets, _dir) = setup().await;

        register.ensure_worksheets(2).await.unwrap();
        let set = register.ensure_worksheets(0).await.unwrap();

        assert_eq!(set.teams().len(), 2);
        assert_eq!(sheets.list_worksheets(URL).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_ensure_repeated_does_not_accumulate_ids() {
        let (register, _sheets, _dir) = setup().await;

        register.ensure_worksheets(3).await.unwrap();
        register.ensure_worksheets(3).await.unwrap();

        let config = register.settings_snapshot().unwrap().unwrap();
        assert_eq!(config.team_worksheet_ids.len(), 3);
    }

    #[tokio::test]
    async fn test_upsert_teams_fills_slots_and_clears_stale_rows() {
        let (register, sheets, _dir) = setup().await;
        let set = register.ensure_worksheets(3).await.unwrap();

        // Two teams: main and encore; backup worksheet stays empty.
        register
            .upsert_user_teams(&user(), &classified("150/740/33.4\n140/680/35.3"))
            .await
            .unwrap();

        let main_id = set.teams()[0].worksheet_id().unwrap();
        let rows = sheets.read_rows(URL, main_id).await.unwrap();
        assert_eq!(rows[1][0], "alice");
        assert_eq!(rows[1][2], "150");

        let encore_id = set.teams()[1].worksheet_id().unwrap();
        let rows = sheets.read_rows(URL, encore_id).await.unwrap();
        assert_eq!(rows[1][2], "140");

        // Resubmission with one team deletes the stale encore row.
        register
            .upsert_user_teams(&user(), &classified("160/700/30"))
            .await
            .unwrap();

        let rows = sheets.read_rows(URL, main_id).await.unwrap();
        assert_eq!(rows[1][2], "160");
        let rows = sheets.read_rows(URL, encore_id).await.unwrap();
        assert!(rows[1].iter().all(String::is_empty));
    }

    #[tokio::test]
    async fn test_classification_without_encore_skips_second_worksheet() {
        let (register, sheets, _dir) = setup().await;
        let set = register.ensure_worksheets(3).await.unwrap();

        // Second team is weaker in power than the main: no encore, it lands
        // on the backup worksheet.
        register
            .upsert_user_teams(&user(), &classified("150/740/33.4\n140/680/20"))
            .await
            .unwrap();

        let encore_id = set.teams()[1].worksheet_id().unwrap();
        let rows = sheets.read_rows(URL, encore_id).await.unwrap();
        assert_eq!(rows.len(), 1); // header only

        let backup_id = set.teams()[2].worksheet_id().unwrap();
        let rows = sheets.read_rows(URL, backup_id).await.unwrap();
        assert_eq!(rows[1][2], "140");
    }

    #[tokio::test]
    async fn test_delete_user_teams_clears_every_worksheet() {
        let (register, sheets, _dir) = setup().await;
        let set = register.ensure_worksheets(2).await.unwrap();

        register
            .upsert_user_teams(&user(), &classified("150/740/33.4\n140/680/35.3"))
            .await
            .unwrap();
        register.delete_user_teams(&user()).await.unwrap();

        for worksheet in set.teams() {
            let rows = sheets
                .read_rows(URL, worksheet.worksheet_id().unwrap())
                .await
                .unwrap();
            assert!(rows.iter().skip(1).all(|r| r.iter().all(String::is_empty)));
        }
    }

    #[tokio::test]
    async fn test_upsert_user_summary_filters_roles() {
        let (register, sheets, _dir) = setup().await;
        let set = register.ensure_worksheets(2).await.unwrap();
        register
            .update_encore_roles(vec!["Vocalist".to_string(), "Dancer".to_string()])
            .await
            .unwrap();

        register
            .upsert_user_summary(
                &user(),
                &classified("150/740/33.4\n140/680/35.3"),
                &["Vocalist".to_string(), "Admin".to_string()],
            )
            .await
            .unwrap();

        let summary_id = set.summary().worksheet_id().unwrap();
        let rows = sheets.read_rows(URL, summary_id).await.unwrap();
        assert_eq!(rows[1][0], "alice");
        assert_eq!(rows[1][2], "Vocalist");
        // Main Team ISV = 150 + (740-150)/5 = 268.
        assert_eq!(rows[1][3], "268");
        assert_eq!(rows[1][4], "33.4");
        // Encore Team pair.
        assert_eq!(rows[1][5], "248");
        assert_eq!(rows[1][6], "35.3");
    }

    #[tokio::test]
    async fn test_refresh_summary_rebuilds_from_team_worksheets() {
        let (register, sheets, _dir) = setup().await;
        let set = register.ensure_worksheets(2).await.unwrap();

        let bob = UserInfo::new("bob", "Bob B.");
        register
            .upsert_user_teams(&user(), &classified("150/740/33.4\n140/680/35.3"))
            .await
            .unwrap();
        register
            .upsert_user_teams(
                &bob,
                &classify_teams(parse_team_message(&bob, "100/500/20")).unwrap(),
            )
            .await
            .unwrap();

        let mut display_names = HashMap::new();
        display_names.insert("alice".to_string(), "Alice A.".to_string());
        // bob has left: no display name, no roles.
        let mut roles = HashMap::new();
        roles.insert("alice".to_string(), vec!["Vocalist".to_string()]);
        register
            .update_encore_roles(vec!["Vocalist".to_string()])
            .await
            .unwrap();

        register.refresh_summary(&display_names, &roles).await.unwrap();

        let summary_id = set.summary().worksheet_id().unwrap();
        let rows = sheets.read_rows(URL, summary_id).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][0], "alice");
        assert_eq!(rows[1][1], "Alice A.");
        assert_eq!(rows[1][2], "Vocalist");
        assert_eq!(rows[1][3], "268");
        // Departed user keeps a row with blank display name and roles.
        assert_eq!(rows[2][0], "bob");
        assert_eq!(rows[2][1], "");
        assert_eq!(rows[2][2], "");
        assert_eq!(rows[2][3], "180");
        assert_eq!(rows[2][4], "20");
        // bob has no encore team; the pair stays blank.
        assert_eq!(rows[2][5], "");
        assert_eq!(rows[2][6], "");
    }

    #[tokio::test]
    async fn test_refresh_summary_preserves_overflow() {
        let (register, sheets, _dir) = setup().await;
        let set = register.ensure_worksheets(1).await.unwrap();
        let summary_id = set.summary().worksheet_id().unwrap();

        // A manually added malformed row on the summary worksheet.
        let titles = set.team_titles();
        let schema = SheetSchema::summary(&titles);
        sheets
            .write_rows(
                URL,
                summary_id,
                vec![
                    schema.header_row(),
                    vec!["".to_string(), "note".to_string()],
                ],
            )
            .await
            .unwrap();

        register
            .refresh_summary(&HashMap::new(), &HashMap::new())
            .await
            .unwrap();

        let rows = sheets.read_rows(URL, summary_id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], "note");
    }
}
