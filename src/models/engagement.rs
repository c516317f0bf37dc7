//! Engagement events and the summaries derived from them.

use serde::{Deserialize, Serialize};

use crate::models::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEvent {
    /// Subject identifier (the rated record's `username`).
    pub username: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentEvent {
    pub id: String,
    /// Subject identifier (the commented record's `username`).
    pub username: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub downvotes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// `+1` is an upvote, `-1` a downvote; anything else is rejected.
    pub fn from_delta(delta: i8) -> Option<Self> {
        match delta {
            1 => Some(VoteDirection::Up),
            -1 => Some(VoteDirection::Down),
            _ => None,
        }
    }
}

/// Per-subject statistics. Recomputed for every query, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementSummary {
    pub subject_id: String,
    pub average_rating: f64,
    pub total_ratings: u64,
    pub total_comments: u64,
    pub total_likes: u64,
    pub total_dislikes: u64,
}

impl EngagementSummary {
    pub fn empty(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            average_rating: 0.0,
            total_ratings: 0,
            total_comments: 0,
            total_likes: 0,
            total_dislikes: 0,
        }
    }
}

/// A record decorated with its engagement summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedRecord {
    pub record: Record,
    pub summary: EngagementSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_direction_from_delta() {
        assert_eq!(VoteDirection::from_delta(1), Some(VoteDirection::Up));
        assert_eq!(VoteDirection::from_delta(-1), Some(VoteDirection::Down));
        for delta in [0, 2, -2, i8::MAX, i8::MIN] {
            assert_eq!(VoteDirection::from_delta(delta), None);
        }
    }
}
