//! Conversation Engine
//!
//! Owns the open conversation's message list, the typing signal and the
//! timed reply pipeline that follows every outgoing message.
//!
//! # Reply Pipeline
//!
//! ```text
//! submit("hello") at t
//!   t + delivered_ms  MarkDelivered   pending -> delivered
//!   t + typing_ms     StartTyping     typing = true
//!   t + reply_ms      DeliverReply    typing = false, peer reply appended
//! ```
//!
//! Every step is tagged with the conversation it was scheduled against.
//! Opening another conversation or closing the current one cancels the
//! remaining steps, and a step that still comes due for a conversation that
//! is no longer open is dropped at fire time.
//!
//! The engine has no clock of its own. Callers pass the current virtual time
//! and drive [`ConversationEngine::fire_due`] from whatever loop owns time.

use thiserror::Error;

use crate::config::{PipelineTimings, SeedMessages, SessionConfig};
use crate::conversation::{Conversation, DeliveryState, Message, MessageId, MessageIds, Origin};
use crate::scheduler::{DelayQueue, TaskTag};
use crate::validation::{ValidationError, ValidationRules};

/// One step of the reply pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyEffect {
    /// Move the submitted message to [`DeliveryState::Delivered`]
    MarkDelivered,
    /// Raise the typing indicator
    StartTyping,
    /// Lower the typing indicator and append the peer reply
    DeliverReply,
}

/// Errors from engine operations
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Text did not pass validation
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Submit with nothing open
    #[error("No conversation is open")]
    NoOpenConversation,
}

/// The conversation currently shown, with its live state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenConversation {
    /// The conversation record, preview fields kept current
    pub conversation: Conversation,
    /// Ordered message list
    pub messages: Vec<Message>,
    /// Whether the peer is "typing"
    pub typing: bool,
}

impl OpenConversation {
    fn append(&mut self, message: Message) {
        self.conversation.last_message = message.text.clone();
        self.conversation.last_activity = message.time_label();
        self.messages.push(message);
    }

    fn message_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }
}

/// Single-writer owner of the open conversation
#[derive(Debug)]
pub struct ConversationEngine {
    timings: PipelineTimings,
    rules: ValidationRules,
    reply_text: String,
    seed: SeedMessages,
    open: Option<OpenConversation>,
    queue: DelayQueue<ReplyEffect>,
}

impl ConversationEngine {
    /// Create an engine with nothing open
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            timings: config.timings,
            rules: config.rules.clone(),
            reply_text: config.reply_text.clone(),
            seed: config.seed.clone(),
            open: None,
            queue: DelayQueue::new(),
        }
    }

    /// The open conversation, if any
    #[must_use]
    pub fn open_conversation(&self) -> Option<&OpenConversation> {
        self.open.as_ref()
    }

    /// Whether the typing indicator is up
    #[must_use]
    pub fn typing(&self) -> bool {
        self.open.as_ref().is_some_and(|o| o.typing)
    }

    /// Number of pipeline steps still queued
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.queue.len()
    }

    /// Virtual time of the next queued step
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.next_deadline()
    }

    /// Open `conversation`, replacing whatever was open
    ///
    /// Pending steps of the previous conversation are cancelled and the
    /// message list is replaced with the seed history.
    pub fn open(&mut self, mut conversation: Conversation, ids: &mut MessageIds) {
        if let Some(previous) = self.close() {
            tracing::debug!(
                from = %previous.id,
                to = %conversation.id,
                "Switching conversation"
            );
        }

        conversation.unread = 0;
        let messages = vec![
            Message::with_state(
                ids.next_id(),
                self.seed.peer.clone(),
                Origin::Peer,
                DeliveryState::Acknowledged,
            ),
            Message::with_state(
                ids.next_id(),
                self.seed.own.clone(),
                Origin::SelfUser,
                DeliveryState::Acknowledged,
            ),
        ];

        tracing::debug!(conversation = %conversation.id, "Conversation opened");
        self.open = Some(OpenConversation {
            conversation,
            messages,
            typing: false,
        });
    }

    /// Close the open conversation, cancelling its pending steps
    ///
    /// Returns the closed conversation record with its preview fields.
    pub fn close(&mut self) -> Option<Conversation> {
        let open = self.open.take()?;
        let cancelled = self.queue.cancel_conversation(&open.conversation.id);
        tracing::debug!(
            conversation = %open.conversation.id,
            cancelled,
            "Conversation closed"
        );
        Some(open.conversation)
    }

    /// Append an outgoing message and schedule its reply pipeline
    ///
    /// # Errors
    ///
    /// [`EngineError::NoOpenConversation`] when nothing is open, or
    /// [`EngineError::Invalid`] when the text is rejected. State is unchanged
    /// in both cases.
    pub fn submit(
        &mut self,
        text: &str,
        now_ms: u64,
        ids: &mut MessageIds,
    ) -> Result<MessageId, EngineError> {
        let open = self.open.as_mut().ok_or(EngineError::NoOpenConversation)?;
        self.rules.validate_message_text(text)?;

        let id = ids.next_id();
        open.append(Message::outgoing(id, text.to_string()));

        let tag = TaskTag {
            conversation: open.conversation.id.clone(),
            message: id,
        };
        // Late in a saturated clock every step collapses onto u64::MAX and
        // equal deadlines still fire in scheduling order
        let t = self.timings;
        let steps = [
            (t.delivered_ms, ReplyEffect::MarkDelivered),
            (t.typing_ms, ReplyEffect::StartTyping),
            (t.reply_ms, ReplyEffect::DeliverReply),
        ];
        for (offset_ms, effect) in steps {
            self.queue
                .schedule(now_ms.saturating_add(offset_ms), tag.clone(), effect);
        }

        tracing::debug!(
            conversation = %open.conversation.id,
            message = %id,
            len = text.len(),
            "Message submitted"
        );
        Ok(id)
    }

    /// Apply the next step due at or before `now_ms`
    ///
    /// Steps whose target is gone are dropped silently and do not count.
    /// Returns the applied step, or `None` once nothing else is due.
    pub fn fire_next(&mut self, now_ms: u64, ids: &mut MessageIds) -> Option<ReplyEffect> {
        while let Some(entry) = self.queue.pop_due(now_ms) {
            let Some(open) = self
                .open
                .as_mut()
                .filter(|o| o.conversation.id == entry.tag.conversation)
            else {
                tracing::trace!(
                    conversation = %entry.tag.conversation,
                    effect = ?entry.effect,
                    "Dropping step for a conversation that is no longer open"
                );
                continue;
            };

            match entry.effect {
                ReplyEffect::MarkDelivered => {
                    let Some(message) = open.message_mut(entry.tag.message) else {
                        tracing::trace!(message = %entry.tag.message, "Delivered target is gone");
                        continue;
                    };
                    message.advance_to(DeliveryState::Delivered);
                }
                ReplyEffect::StartTyping => open.typing = true,
                ReplyEffect::DeliverReply => {
                    open.typing = false;
                    open.append(Message::incoming(ids.next_id(), self.reply_text.clone()));
                }
            }

            tracing::trace!(
                message = %entry.tag.message,
                effect = ?entry.effect,
                due_ms = entry.due_ms,
                "Applied reply step"
            );
            return Some(entry.effect);
        }
        None
    }

    /// Apply every step due at or before `now_ms`; returns how many applied
    pub fn fire_due(&mut self, now_ms: u64, ids: &mut MessageIds) -> usize {
        std::iter::from_fn(|| self.fire_next(now_ms, ids)).count()
    }

    /// Tear down: cancel everything and close the open conversation
    pub fn shutdown(&mut self) {
        let cancelled = self.queue.cancel_all();
        self.open = None;
        tracing::debug!(cancelled, "Conversation engine shut down");
    }
}
