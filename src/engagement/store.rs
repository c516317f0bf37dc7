use std::sync::Arc;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::db::Database;
use crate::engagement::aggregate;
use crate::engagement::arena::CommentArena;
use crate::error::{EngineError, EngineResult};
use crate::models::{CommentEvent, RatedRecord, RatingEvent, Record, VoteDirection};
use crate::{log_debug, log_warn};

const ENABLE_LOGS: bool = true;

pub const RATINGS_KEY: &str = "ra_ratings_v1";
pub const COMMENTS_KEY: &str = "ra_comments_v1";

const MIN_RATING: i64 = 1;
const MAX_RATING: i64 = 5;

/// Parse a stored log. Missing entries are empty; unparsable ones are logged
/// as corrupt and also read as empty.
fn decode_log<T: DeserializeOwned>(key: &str, raw: Option<String>) -> Vec<T> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(err) => {
            let corrupt = EngineError::CacheCorrupt {
                key: key.to_string(),
                reason: err.to_string(),
            };
            log_warn!("{corrupt}; reading as empty");
            Vec::new()
        }
    }
}

fn encode_log<T: Serialize>(items: &[T]) -> anyhow::Result<String> {
    Ok(serde_json::to_string(items)?)
}

fn clean_nickname(nickname: Option<String>) -> Option<String> {
    nickname
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Append-only log of ratings and comments kept in the durable cache.
///
/// Each write is a whole-sequence read-modify-write executed as a single
/// database task. After every successful write the revision published on
/// [`EngagementStore::subscribe`] increases by one.
#[derive(Clone)]
pub struct EngagementStore {
    db: Database,
    revision: Arc<watch::Sender<u64>>,
}

impl EngagementStore {
    pub fn new(db: Database) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            db,
            revision: Arc::new(revision),
        }
    }

    /// Change token for observers. Compare the received value with the last
    /// one seen, or await `changed()`.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    pub async fn add_rating(
        &self,
        subject_id: &str,
        score: i64,
        nickname: Option<String>,
    ) -> EngineResult<RatingEvent> {
        if !(MIN_RATING..=MAX_RATING).contains(&score) {
            return Err(EngineError::InvalidRating { score });
        }

        let event = RatingEvent {
            username: subject_id.to_string(),
            // Range checked above.
            rating: score as u8,
            nickname: clean_nickname(nickname),
            created_at: Utc::now().timestamp_millis(),
        };

        let stored = event.clone();
        self.db
            .update_cache_entry(RATINGS_KEY, move |raw| {
                let mut ratings: Vec<RatingEvent> = decode_log(RATINGS_KEY, raw);
                ratings.push(stored);
                Ok((Some(encode_log(&ratings)?), ()))
            })
            .await?;

        self.bump_revision();
        Ok(event)
    }

    pub async fn add_comment(
        &self,
        subject_id: &str,
        text: &str,
        nickname: Option<String>,
        parent_id: Option<String>,
    ) -> EngineResult<CommentEvent> {
        if text.trim().is_empty() {
            return Err(EngineError::EmptyComment);
        }

        let event = CommentEvent {
            id: format!("c_{}", Uuid::new_v4()),
            username: subject_id.to_string(),
            content: text.to_string(),
            nickname: clean_nickname(nickname),
            created_at: Utc::now().timestamp_millis(),
            parent_id,
            upvotes: 0,
            downvotes: 0,
        };

        let stored = event.clone();
        self.db
            .update_cache_entry(COMMENTS_KEY, move |raw| {
                let mut arena = CommentArena::from_log(decode_log(COMMENTS_KEY, raw));
                arena.push_front(stored);
                Ok((Some(encode_log(&arena.into_log())?), ()))
            })
            .await?;

        self.bump_revision();
        Ok(event)
    }

    /// Count one vote. An unknown comment id is ignored.
    pub async fn vote_comment(&self, comment_id: &str, direction: VoteDirection) -> EngineResult<()> {
        let id = comment_id.to_string();
        let applied = self
            .db
            .update_cache_entry(COMMENTS_KEY, move |raw| {
                let mut arena = CommentArena::from_log(decode_log(COMMENTS_KEY, raw));
                if !arena.vote(&id, direction) {
                    return Ok((None, false));
                }
                Ok((Some(encode_log(&arena.into_log())?), true))
            })
            .await?;

        if applied {
            self.bump_revision();
        } else {
            let stale = EngineError::StaleReference {
                kind: "comment",
                id: comment_id.to_string(),
            };
            log_debug!("ignoring vote: {stale}");
        }
        Ok(())
    }

    async fn read_log<T: DeserializeOwned>(&self, key: &'static str) -> Vec<T> {
        match self.db.get_cache_entry(key).await {
            Ok(raw) => decode_log(key, raw),
            Err(err) => {
                log_warn!("failed to read {key}: {err:#}; reading as empty");
                Vec::new()
            }
        }
    }

    /// All ratings in the order they were added.
    pub async fn list_ratings(&self) -> Vec<RatingEvent> {
        self.read_log(RATINGS_KEY).await
    }

    /// All comments, most recent first.
    pub async fn list_comments(&self) -> Vec<CommentEvent> {
        self.read_log(COMMENTS_KEY).await
    }

    /// One subject's comments, newest first.
    pub async fn comments_for(&self, subject_id: &str) -> Vec<CommentEvent> {
        let mut comments: Vec<CommentEvent> = self
            .list_comments()
            .await
            .into_iter()
            .filter(|comment| comment.username == subject_id)
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        comments
    }

    /// Direct replies to one comment, in stored order.
    pub async fn replies_to(&self, parent_id: &str) -> Vec<CommentEvent> {
        self.list_comments()
            .await
            .into_iter()
            .filter(|comment| comment.parent_id.as_deref() == Some(parent_id))
            .collect()
    }

    pub async fn aggregate(&self, records: &[Record]) -> Vec<RatedRecord> {
        let ratings = self.list_ratings().await;
        let comments = self.list_comments().await;
        aggregate::aggregate(records, &ratings, &comments)
    }

    /// Top [`aggregate::TRENDING_LIMIT`] subjects by comments in the last `window_ms`.
    pub async fn trending(&self, records: &[Record], window_ms: i64) -> Vec<RatedRecord> {
        let ratings = self.list_ratings().await;
        let comments = self.list_comments().await;
        let now = Utc::now().timestamp_millis();
        aggregate::trending(records, &ratings, &comments, window_ms, now)
    }

    pub async fn top_rated(&self, records: &[Record], limit: usize) -> Vec<RatedRecord> {
        aggregate::top_rated(&self.aggregate(records).await, limit)
    }

    pub async fn bottom_rated(&self, records: &[Record], limit: usize) -> Vec<RatedRecord> {
        aggregate::bottom_rated(&self.aggregate(records).await, limit)
    }
}
