//! Delay Queue
//!
//! A single ordered queue of timed effects on the session's virtual clock.
//! Entries are tagged with the conversation and message they were scheduled
//! for, so switching conversations is one [`DelayQueue::cancel_conversation`]
//! call instead of per-timer handle bookkeeping.
//!
//! Time is plain milliseconds since the session started. The queue never
//! waits on its own: whoever owns it asks for [`DelayQueue::next_deadline`]
//! and drains entries with [`DelayQueue::pop_due`].

use std::collections::BTreeMap;

use crate::conversation::{ConversationId, MessageId};

/// Identifier of a scheduled entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

/// What a scheduled entry belongs to
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaskTag {
    /// Conversation that was open when the entry was scheduled
    pub conversation: ConversationId,
    /// Message whose pipeline produced the entry
    pub message: MessageId,
}

/// A due entry handed back by [`DelayQueue::pop_due`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheduled<E> {
    /// Entry identifier
    pub id: TaskId,
    /// Virtual time it was due at (ms)
    pub due_ms: u64,
    /// Owner tag
    pub tag: TaskTag,
    /// The effect to apply
    pub effect: E,
}

/// Ordered queue keyed by (due time, scheduling order)
#[derive(Clone, Debug)]
pub struct DelayQueue<E> {
    entries: BTreeMap<(u64, TaskId), (TaskTag, E)>,
    next_id: u64,
}

impl<E> Default for DelayQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> DelayQueue<E> {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Schedule `effect` at virtual time `due_ms`
    ///
    /// Entries with equal due times come out in scheduling order.
    pub fn schedule(&mut self, due_ms: u64, tag: TaskTag, effect: E) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.insert((due_ms, id), (tag, effect));
        id
    }

    /// Earliest due time, if anything is queued
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    /// Remove and return the earliest entry due at or before `now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Scheduled<E>> {
        let (&(due_ms, _), _) = self.entries.first_key_value()?;
        if due_ms > now_ms {
            return None;
        }
        let ((due_ms, id), (tag, effect)) = self.entries.pop_first()?;
        Some(Scheduled {
            id,
            due_ms,
            tag,
            effect,
        })
    }

    /// Drop every entry scheduled for `conversation`; returns how many
    pub fn cancel_conversation(&mut self, conversation: &ConversationId) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, (tag, _)| &tag.conversation != conversation);
        before - self.entries.len()
    }

    /// Drop everything; returns how many entries were queued
    pub fn cancel_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Number of queued entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(conversation: &str, message: u64) -> TaskTag {
        TaskTag {
            conversation: ConversationId::new(conversation),
            message: MessageId(message),
        }
    }

    #[test]
    fn test_pops_in_due_order() {
        let mut queue = DelayQueue::new();
        queue.schedule(3000, tag("c1", 1), "reply");
        queue.schedule(500, tag("c1", 1), "delivered");
        queue.schedule(1000, tag("c1", 1), "typing");

        assert_eq!(queue.next_deadline(), Some(500));
        assert!(queue.pop_due(499).is_none());

        let fired: Vec<_> = std::iter::from_fn(|| queue.pop_due(3000))
            .map(|s| s.effect)
            .collect();
        assert_eq!(fired, vec!["delivered", "typing", "reply"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_equal_deadlines_keep_scheduling_order() {
        let mut queue = DelayQueue::new();
        queue.schedule(100, tag("c1", 1), 1);
        queue.schedule(100, tag("c1", 2), 2);
        queue.schedule(100, tag("c1", 3), 3);

        let fired: Vec<_> = std::iter::from_fn(|| queue.pop_due(100))
            .map(|s| s.effect)
            .collect();
        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn test_cancel_conversation_only_drops_its_entries() {
        let mut queue = DelayQueue::new();
        queue.schedule(500, tag("c1", 1), "a");
        queue.schedule(1000, tag("c2", 2), "b");
        queue.schedule(3000, tag("c1", 1), "c");

        assert_eq!(queue.cancel_conversation(&ConversationId::new("c1")), 2);
        assert_eq!(queue.len(), 1);

        let remaining = queue.pop_due(u64::MAX).unwrap();
        assert_eq!(remaining.effect, "b");
        assert_eq!(remaining.tag, tag("c2", 2));
        assert_eq!(remaining.due_ms, 1000);
    }

    #[test]
    fn test_cancel_all() {
        let mut queue = DelayQueue::new();
        queue.schedule(1, tag("c1", 1), ());
        queue.schedule(2, tag("c2", 2), ());
        assert_eq!(queue.cancel_all(), 2);
        assert_eq!(queue.next_deadline(), None);
    }
}
