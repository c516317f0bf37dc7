pub mod batch;
pub mod classification;
pub mod db;
pub mod engagement;
pub mod error;
pub mod models;
pub mod roster;
pub mod settings;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use classification::{classify, RuleTable};
use db::Database;
use engagement::EngagementStore;
use models::{CategoryIndex, RatedRecord, Record};
use roster::{FileSource, HttpSource, RosterCache, RosterSource};
use settings::{RosterSourceSettings, Settings, SettingsStore};

pub use error::{EngineError, EngineResult};
pub use utils::init_logging;

/// Everything a client session needs: the durable cache, the roster cache in
/// front of the configured source, the engagement log and the rule table.
pub struct AppState {
    pub db: Database,
    pub roster: RosterCache,
    pub engagement: EngagementStore,
    pub rules: RuleTable,
    pub settings: Settings,
}

impl AppState {
    /// Open the state described by a settings file. Relative paths in the
    /// settings resolve against the file's directory.
    pub fn open(store: &SettingsStore) -> Result<Self> {
        Self::with_settings(store.get(), &store.base_dir())
    }

    pub fn with_settings(settings: Settings, base_dir: &std::path::Path) -> Result<Self> {
        let rules = settings.rule_set.table();
        // A table without a fallback is a build defect; refuse to start.
        rules.validate()?;

        let db = Database::new(Settings::resolve(base_dir, &settings.database_file))?;

        let source: Arc<dyn RosterSource> = match &settings.roster_source {
            RosterSourceSettings::Files { dir, default_file } => Arc::new(FileSource::new(
                Settings::resolve(base_dir, dir),
                default_file.clone(),
            )),
            RosterSourceSettings::Http {
                base_url,
                default_path,
                timeout_secs,
            } => Arc::new(HttpSource::new(
                base_url,
                default_path,
                Duration::from_secs(*timeout_secs),
            )?),
        };

        log::info!(
            "rosterrank ready: {} rules, cache at {}",
            rules.len(),
            db.path().display()
        );

        Ok(Self {
            roster: RosterCache::new(db.clone(), source, settings.roster_schema_version),
            engagement: EngagementStore::new(db.clone()),
            db,
            rules,
            settings,
        })
    }

    /// Category label for one record under the configured rule table.
    pub fn category_of(&self, record: &Record) -> EngineResult<&str> {
        classify(record, &self.rules)
    }

    pub async fn categories(&self) -> Option<CategoryIndex> {
        self.roster.categories().await
    }

    /// Decorated roster slice for `category` (or everyone).
    pub async fn leaderboard(&self, category: Option<&str>) -> Vec<RatedRecord> {
        let records = self.roster.load(category).await;
        self.engagement.aggregate(&records).await
    }

    pub async fn trending(&self, category: Option<&str>) -> Vec<RatedRecord> {
        let records = self.roster.load(category).await;
        self.engagement
            .trending(&records, self.settings.trending_window_ms)
            .await
    }

    pub async fn top_rated(&self, category: Option<&str>) -> Vec<RatedRecord> {
        let records = self.roster.load(category).await;
        self.engagement
            .top_rated(&records, self.settings.ranking_size)
            .await
    }

    pub async fn bottom_rated(&self, category: Option<&str>) -> Vec<RatedRecord> {
        let records = self.roster.load(category).await;
        self.engagement
            .bottom_rated(&records, self.settings.ranking_size)
            .await
    }

    /// Search the whole roster and decorate the hits.
    pub async fn search(&self, query: &str) -> Vec<RatedRecord> {
        let records = self.roster.load(None).await;
        let hits = roster::search(&records, query);
        self.engagement.aggregate(&hits).await
    }
}
