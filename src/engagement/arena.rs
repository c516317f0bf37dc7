use std::collections::HashMap;

use crate::models::{CommentEvent, VoteDirection};

/// Comment log held as slots addressed by comment id. Slot order is the
/// stored order (most recent first); vote counters are only ever changed
/// through [`CommentArena::vote`].
#[derive(Debug, Default, Clone)]
pub struct CommentArena {
    slots: Vec<CommentEvent>,
    by_id: HashMap<String, usize>,
}

impl CommentArena {
    pub fn from_log(slots: Vec<CommentEvent>) -> Self {
        let mut arena = Self {
            slots,
            by_id: HashMap::new(),
        };
        arena.reindex();
        arena
    }

    fn reindex(&mut self) {
        self.by_id.clear();
        for (slot, comment) in self.slots.iter().enumerate() {
            // Keep the first (most recent) slot if an id was ever duplicated.
            self.by_id.entry(comment.id.clone()).or_insert(slot);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CommentEvent> {
        self.by_id.get(id).map(|&slot| &self.slots[slot])
    }

    /// Insert as the most recent comment.
    pub fn push_front(&mut self, comment: CommentEvent) {
        self.slots.insert(0, comment);
        self.reindex();
    }

    /// Returns `false` when no comment has this id.
    pub fn vote(&mut self, id: &str, direction: VoteDirection) -> bool {
        let Some(&slot) = self.by_id.get(id) else {
            return false;
        };
        let comment = &mut self.slots[slot];
        match direction {
            VoteDirection::Up => comment.upvotes += 1,
            VoteDirection::Down => comment.downvotes += 1,
        }
        true
    }

    pub fn into_log(self) -> Vec<CommentEvent> {
        self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: &str) -> CommentEvent {
        CommentEvent {
            id: id.into(),
            username: "subject".into(),
            content: format!("comment {id}"),
            nickname: None,
            created_at: 0,
            parent_id: None,
            upvotes: 0,
            downvotes: 0,
        }
    }

    #[test]
    fn push_front_keeps_index_in_sync() {
        let mut arena = CommentArena::from_log(vec![comment("b"), comment("a")]);
        arena.push_front(comment("c"));

        assert!(arena.vote("a", VoteDirection::Up));
        assert!(arena.vote("c", VoteDirection::Down));
        assert_eq!(arena.get("a").unwrap().upvotes, 1);
        assert_eq!(arena.get("c").unwrap().downvotes, 1);

        let ids: Vec<String> = arena.into_log().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn vote_on_unknown_id_reports_false() {
        let mut arena = CommentArena::from_log(vec![comment("a")]);
        assert!(!arena.vote("missing", VoteDirection::Up));
        assert_eq!(arena.get("a").unwrap().upvotes, 0);
        assert_eq!(arena.len(), 1);
    }
}
