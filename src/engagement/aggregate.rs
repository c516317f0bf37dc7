//! Folding engagement events into per-subject summaries and rankings.
//!
//! Everything here is pure: callers pass a snapshot of the event logs and the
//! roster slice, and get freshly computed values back.

use std::collections::HashMap;

use crate::models::{CommentEvent, EngagementSummary, RatedRecord, RatingEvent, Record};

/// Trending lists never grow beyond this many subjects.
pub const TRENDING_LIMIT: usize = 5;

#[derive(Debug, Default, Clone, Copy)]
struct RatingTotals {
    sum: u64,
    count: u64,
}

#[derive(Debug, Default, Clone, Copy)]
struct CommentTotals {
    count: u64,
    upvotes: u64,
    downvotes: u64,
}

fn group_ratings(ratings: &[RatingEvent]) -> HashMap<&str, RatingTotals> {
    let mut totals: HashMap<&str, RatingTotals> = HashMap::new();
    for rating in ratings {
        let entry = totals.entry(rating.username.as_str()).or_default();
        entry.sum += u64::from(rating.rating);
        entry.count += 1;
    }
    totals
}

fn group_comments(comments: &[CommentEvent]) -> HashMap<&str, CommentTotals> {
    let mut totals: HashMap<&str, CommentTotals> = HashMap::new();
    for comment in comments {
        let entry = totals.entry(comment.username.as_str()).or_default();
        entry.count += 1;
        entry.upvotes += comment.upvotes;
        entry.downvotes += comment.downvotes;
    }
    totals
}

/// Decorate every record with its engagement summary.
///
/// One grouping pass per log, then one lookup per record. Records are cloned,
/// never modified.
pub fn aggregate(
    records: &[Record],
    ratings: &[RatingEvent],
    comments: &[CommentEvent],
) -> Vec<RatedRecord> {
    let rating_totals = group_ratings(ratings);
    let comment_totals = group_comments(comments);

    records
        .iter()
        .map(|record| {
            let subject = record.username.as_str();
            let rated = rating_totals.get(subject).copied().unwrap_or_default();
            let commented = comment_totals.get(subject).copied().unwrap_or_default();

            let average_rating = if rated.count > 0 {
                rated.sum as f64 / rated.count as f64
            } else {
                0.0
            };

            RatedRecord {
                record: record.clone(),
                summary: EngagementSummary {
                    subject_id: record.username.clone(),
                    average_rating,
                    total_ratings: rated.count,
                    total_comments: commented.count,
                    total_likes: commented.upvotes,
                    total_dislikes: commented.downvotes,
                },
            }
        })
        .collect()
}

/// Whether a comment is recent enough to count towards trending.
///
/// Only the lower bound `now_ms - window_ms` is checked, and it is exclusive,
/// so a zero-length window never contains anything. Timestamps ahead of
/// `now_ms` (clock skew between writers) still count.
pub fn in_window(created_at: i64, window_ms: i64, now_ms: i64) -> bool {
    window_ms > 0 && created_at > now_ms.saturating_sub(window_ms)
}

/// Subjects with the most comments inside the window, at most
/// [`TRENDING_LIMIT`] of them. Ties keep roster order.
pub fn trending(
    records: &[Record],
    ratings: &[RatingEvent],
    comments: &[CommentEvent],
    window_ms: i64,
    now_ms: i64,
) -> Vec<RatedRecord> {
    let mut recent: HashMap<&str, usize> = HashMap::new();
    for comment in comments
        .iter()
        .filter(|comment| in_window(comment.created_at, window_ms, now_ms))
    {
        *recent.entry(comment.username.as_str()).or_insert(0) += 1;
    }

    if recent.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<(usize, RatedRecord)> = aggregate(records, ratings, comments)
        .into_iter()
        .filter_map(|rated| {
            recent
                .get(rated.record.username.as_str())
                .map(|&count| (count, rated))
        })
        .collect();

    // `sort_by` is stable, so equal counts keep their input order.
    ranked.sort_by(|(a, _), (b, _)| b.cmp(a));
    ranked.truncate(TRENDING_LIMIT);
    ranked.into_iter().map(|(_, rated)| rated).collect()
}

fn rated_only(rated: &[RatedRecord]) -> Vec<RatedRecord> {
    rated
        .iter()
        .filter(|entry| entry.summary.total_ratings > 0)
        .cloned()
        .collect()
}

/// Highest average first. Unrated subjects are skipped; ties keep input order.
pub fn top_rated(rated: &[RatedRecord], limit: usize) -> Vec<RatedRecord> {
    let mut ranked = rated_only(rated);
    ranked.sort_by(|a, b| b.summary.average_rating.total_cmp(&a.summary.average_rating));
    ranked.truncate(limit);
    ranked
}

/// Lowest average first. Unrated subjects are skipped; ties keep input order.
pub fn bottom_rated(rated: &[RatedRecord], limit: usize) -> Vec<RatedRecord> {
    let mut ranked = rated_only(rated);
    ranked.sort_by(|a, b| a.summary.average_rating.total_cmp(&b.summary.average_rating));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;
    const HOUR: i64 = 60 * 60 * 1000;

    fn people(ids: &[&str]) -> Vec<Record> {
        ids.iter().map(|id| Record::new(*id, id.to_uppercase(), "Engineer")).collect()
    }

    fn rating(subject: &str, score: u8) -> RatingEvent {
        RatingEvent {
            username: subject.into(),
            rating: score,
            nickname: None,
            created_at: NOW,
        }
    }

    fn comment(id: &str, subject: &str, created_at: i64, up: u64, down: u64) -> CommentEvent {
        CommentEvent {
            id: id.into(),
            username: subject.into(),
            content: "text".into(),
            nickname: None,
            created_at,
            parent_id: None,
            upvotes: up,
            downvotes: down,
        }
    }

    fn ids(rated: &[RatedRecord]) -> Vec<&str> {
        rated.iter().map(|r| r.record.username.as_str()).collect()
    }

    #[test]
    fn aggregate_folds_ratings_and_comments_per_subject() {
        let records = people(&["ann", "bob", "cy"]);
        let ratings = vec![rating("ann", 5), rating("ann", 1), rating("bob", 4), rating("ghost", 2)];
        let comments = vec![
            comment("c1", "ann", NOW, 3, 1),
            comment("c2", "ann", NOW, 0, 2),
            comment("c3", "cy", NOW, 1, 0),
        ];

        let rated = aggregate(&records, &ratings, &comments);
        assert_eq!(ids(&rated), vec!["ann", "bob", "cy"]);

        let ann = &rated[0].summary;
        assert_eq!(ann.average_rating, 3.0);
        assert_eq!(ann.total_ratings, 2);
        assert_eq!(ann.total_comments, 2);
        assert_eq!(ann.total_likes, 3);
        assert_eq!(ann.total_dislikes, 3);

        assert_eq!(rated[1].summary.average_rating, 4.0);
        assert_eq!(rated[1].summary.total_comments, 0);
        assert_eq!(rated[2].summary, {
            let mut expected = EngagementSummary::empty("cy");
            expected.total_comments = 1;
            expected.total_likes = 1;
            expected
        });
        assert_eq!(rated[0].record, records[0]);
    }

    #[test]
    fn aggregate_is_idempotent() {
        let records = people(&["ann", "bob"]);
        let ratings = vec![rating("ann", 3), rating("bob", 5)];
        let comments = vec![comment("c1", "bob", NOW, 2, 0)];

        let first = aggregate(&records, &ratings, &comments);
        let second = aggregate(&records, &ratings, &comments);
        assert_eq!(first, second);
    }

    #[test]
    fn trending_ranks_by_recent_comment_count() {
        let records = people(&["a", "b", "c", "d", "e", "f", "g"]);
        let mut comments = Vec::new();
        let per_subject = [("a", 1), ("b", 3), ("c", 2), ("d", 2), ("e", 1), ("f", 1), ("g", 0)];
        for (subject, count) in per_subject {
            for n in 0..count {
                comments.push(comment(&format!("{subject}{n}"), subject, NOW - HOUR, 0, 0));
            }
        }
        // Old activity does not count toward trending.
        for n in 0..10 {
            comments.push(comment(&format!("old{n}"), "g", NOW - 30 * 24 * HOUR, 0, 0));
        }

        let top = trending(&records, &[], &comments, 7 * 24 * HOUR, NOW);
        assert_eq!(ids(&top), vec!["b", "c", "d", "a", "e"]);
        assert_eq!(top[0].summary.total_comments, 3);
        assert_eq!(top.len(), TRENDING_LIMIT);
    }

    #[test]
    fn trending_window_bounds() {
        let records = people(&["edge", "inside", "now", "future"]);
        let window = HOUR;
        let comments = vec![
            comment("c1", "edge", NOW - window, 0, 0),
            comment("c2", "inside", NOW - window + 1, 0, 0),
            comment("c3", "now", NOW, 0, 0),
            comment("c4", "future", NOW + 1, 0, 0),
        ];

        let top = trending(&records, &[], &comments, window, NOW);
        assert_eq!(ids(&top), vec!["inside", "now", "future"]);

        assert!(trending(&records, &[], &comments, 0, NOW).is_empty());
        assert!(!in_window(NOW, 0, NOW));
        assert!(!in_window(NOW + 1, 0, NOW));
        assert!(in_window(NOW, 1, NOW));
    }

    #[test]
    fn comments_slightly_ahead_of_now_still_trend() {
        let records = people(&["ahead"]);
        let comments = vec![comment("c1", "ahead", 1_000_001, 0, 0)];

        let top = trending(&records, &[], &comments, 10_000, 1_000_000);
        assert_eq!(ids(&top), vec!["ahead"]);
        assert_eq!(top[0].summary.total_comments, 1);
    }

    #[test]
    fn trending_with_no_recent_comments_is_empty() {
        let records = people(&["a"]);
        assert!(trending(&records, &[], &[], HOUR, NOW).is_empty());

        let stale = vec![comment("c1", "a", NOW - 2 * HOUR, 0, 0)];
        assert!(trending(&records, &[], &stale, HOUR, NOW).is_empty());
    }

    #[test]
    fn trending_skips_subjects_outside_the_roster_slice() {
        let records = people(&["a"]);
        let comments = vec![comment("c1", "stranger", NOW, 0, 0)];
        assert!(trending(&records, &[], &comments, HOUR, NOW).is_empty());
    }

    #[test]
    fn top_rated_keeps_input_order_for_ties() {
        let records = people(&["first", "second", "third", "unrated"]);
        let ratings = vec![
            rating("first", 5),
            rating("first", 4),
            rating("second", 4),
            rating("second", 5),
            rating("third", 3),
        ];
        let rated = aggregate(&records, &ratings, &[]);

        let top = top_rated(&rated, 3);
        assert_eq!(ids(&top), vec!["first", "second", "third"]);
        assert_eq!(top[0].summary.average_rating, 4.5);

        let reversed: Vec<RatedRecord> = rated.iter().rev().cloned().collect();
        assert_eq!(ids(&top_rated(&reversed, 3)), vec!["second", "first", "third"]);
    }

    #[test]
    fn bottom_rated_sorts_ascending_and_truncates() {
        let records = people(&["a", "b", "c", "d"]);
        let ratings = vec![rating("a", 4), rating("b", 2), rating("c", 2), rating("d", 5)];
        let rated = aggregate(&records, &ratings, &[]);

        assert_eq!(ids(&bottom_rated(&rated, 3)), vec!["b", "c", "a"]);
        assert_eq!(ids(&top_rated(&rated, 1)), vec!["d"]);
        assert!(top_rated(&rated, 0).is_empty());
    }
}
