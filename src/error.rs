//! Domain error taxonomy.
//!
//! Only rule-table problems are fatal. Retrieval problems (`SourceUnavailable`,
//! `CacheCorrupt`, `StaleReference`) are built so they can be logged, then
//! absorbed at the roster cache and engagement store boundaries.

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no category rule matched title {title:?} and the rule table has no fallback rule")]
    NoMatchingRule { title: String },

    #[error("invalid rule table: {reason}")]
    InvalidRuleTable { reason: String },

    #[error("rating {score} is outside the accepted range 1-5")]
    InvalidRating { score: i64 },

    #[error("comment text must not be blank")]
    EmptyComment,

    #[error("no {kind} with id {id}")]
    StaleReference { kind: &'static str, id: String },

    #[error("roster source {source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("cache entry {key} is unreadable: {reason}")]
    CacheCorrupt { key: String, reason: String },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
