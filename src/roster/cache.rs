use std::sync::Arc;

use crate::db::Database;
use crate::error::EngineError;
use crate::models::{CategoryIndex, Record, RosterPayload};
use crate::roster::source::RosterSource;
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

const CACHE_KEY_PREFIX: &str = "roster_cache_v";

/// Which tier produced a roster slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    CacheHit,
    /// The category bundle, or the default roster when no category was asked for.
    Primary,
    /// The default roster standing in for a missing or empty category bundle.
    Secondary,
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterLoad {
    pub records: Vec<Record>,
    pub outcome: LoadOutcome,
}

impl RosterLoad {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            outcome: LoadOutcome::Empty,
        }
    }
}

/// Memoizes roster slices in the durable cache.
///
/// Entries never expire. Bumping `schema_version` moves every key, which is
/// the only way to invalidate them.
#[derive(Clone)]
pub struct RosterCache {
    db: Database,
    source: Arc<dyn RosterSource>,
    schema_version: u32,
}

impl RosterCache {
    pub fn new(db: Database, source: Arc<dyn RosterSource>, schema_version: u32) -> Self {
        Self {
            db,
            source,
            schema_version,
        }
    }

    pub fn cache_key(&self, category: Option<&str>) -> String {
        match category {
            Some(category) => format!("{CACHE_KEY_PREFIX}{}_{category}", self.schema_version),
            None => format!("{CACHE_KEY_PREFIX}{}", self.schema_version),
        }
    }

    /// Records for `category` (or the whole default roster). Never fails;
    /// when every tier comes up empty the result is empty.
    pub async fn load(&self, category: Option<&str>) -> Vec<Record> {
        self.load_tiered(category).await.records
    }

    pub async fn load_tiered(&self, category: Option<&str>) -> RosterLoad {
        let key = self.cache_key(category);

        if let Some(records) = self.read_cached(&key).await {
            return RosterLoad {
                records,
                outcome: LoadOutcome::CacheHit,
            };
        }

        let primary = match category {
            Some(category) => self.source.fetch_category(category).await,
            None => self.source.fetch_default().await,
        };
        if let Some(records) = self.accept(&key, primary).await {
            return RosterLoad {
                records,
                outcome: LoadOutcome::Primary,
            };
        }

        if category.is_some() {
            let secondary = self.source.fetch_default().await;
            if let Some(records) = self.accept(&key, secondary).await {
                return RosterLoad {
                    records,
                    outcome: LoadOutcome::Secondary,
                };
            }
        }

        log_warn!("no roster data available for {key}");
        RosterLoad::empty()
    }

    /// The category index served next to the bundles, if any.
    pub async fn categories(&self) -> Option<CategoryIndex> {
        match self.source.fetch_index().await {
            Ok(index) => Some(index),
            Err(err) => {
                log_warn!("failed to load category index: {err}");
                None
            }
        }
    }

    async fn read_cached(&self, key: &str) -> Option<Vec<Record>> {
        let raw = match self.db.get_cache_entry(key).await {
            Ok(raw) => raw?,
            Err(err) => {
                log_warn!("roster cache read failed for {key}: {err:#}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => Some(records),
            Err(err) => {
                let corrupt = EngineError::CacheCorrupt {
                    key: key.to_string(),
                    reason: err.to_string(),
                };
                log_warn!("{corrupt}; refetching");
                None
            }
        }
    }

    /// Map a fetch result. Non-empty results are cached and returned; empty
    /// results and failures yield `None` so the next tier is tried.
    async fn accept(
        &self,
        key: &str,
        fetched: Result<RosterPayload, EngineError>,
    ) -> Option<Vec<Record>> {
        let payload = match fetched {
            Ok(payload) => payload,
            Err(err) => {
                log_warn!("{err}");
                return None;
            }
        };

        let (records, skipped) = payload.into_records();
        if skipped > 0 {
            log_warn!("skipped {skipped} roster entries that could not be mapped for {key}");
        }
        if records.is_empty() {
            return None;
        }

        match serde_json::to_string(&records) {
            Ok(serialized) => {
                if let Err(err) = self.db.put_cache_entry(key, serialized).await {
                    log_warn!("failed to cache roster slice {key}: {err:#}");
                }
            }
            Err(err) => log_warn!("failed to serialize roster slice {key}: {err}"),
        }

        log_info!("loaded {} records into {key} from {}", records.len(), self.source.name());
        Some(records)
    }
}
