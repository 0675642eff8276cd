//! Conversation and Message Types
//!
//! Records for chat threads and the messages inside them. The engine owns
//! the open conversation's message list; everything here is plain data plus
//! the forward-only delivery lifecycle.

use serde::{Deserialize, Serialize};

/// Stable conversation identifier, assigned by the contact directory
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    /// Create an ID from a string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of thread
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationKind {
    /// One-to-one chat
    Direct,
    /// Group chat
    Group,
    /// Broadcast channel
    Broadcast,
}

/// A contact or group the user can exchange messages with
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Stable identifier
    pub id: ConversationId,
    /// Display name
    pub name: String,
    /// Avatar glyph
    pub avatar: String,
    /// Preview of the latest message
    pub last_message: String,
    /// Human-readable last activity ("now", "12:40", ...)
    pub last_activity: String,
    /// Unread message counter
    pub unread: u32,
    /// Thread kind
    pub kind: ConversationKind,
    /// Presence, only meaningful for direct conversations
    pub online: Option<bool>,
}

impl Conversation {
    /// Create a direct conversation
    pub fn direct(
        id: impl Into<String>,
        name: impl Into<String>,
        avatar: impl Into<String>,
        online: bool,
    ) -> Self {
        Self::with_kind(id, name, avatar, ConversationKind::Direct, Some(online))
    }

    /// Create a group conversation
    pub fn group(id: impl Into<String>, name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self::with_kind(id, name, avatar, ConversationKind::Group, None)
    }

    /// Create a broadcast channel
    pub fn broadcast(
        id: impl Into<String>,
        name: impl Into<String>,
        avatar: impl Into<String>,
    ) -> Self {
        Self::with_kind(id, name, avatar, ConversationKind::Broadcast, None)
    }

    fn with_kind(
        id: impl Into<String>,
        name: impl Into<String>,
        avatar: impl Into<String>,
        kind: ConversationKind,
        online: Option<bool>,
    ) -> Self {
        Self {
            id: ConversationId::new(id),
            name: name.into(),
            avatar: avatar.into(),
            last_message: String::new(),
            last_activity: "now".to_string(),
            unread: 0,
            kind,
            // Presence is tracked for direct chats only
            online: if kind == ConversationKind::Direct {
                online
            } else {
                None
            },
        }
    }
}

/// Message identifier, unique within a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "msg_{}", self.0)
    }
}

/// Hands out monotonically increasing message IDs
#[derive(Clone, Debug, Default)]
pub struct MessageIds {
    next: u64,
}

impl MessageIds {
    /// Create an allocator starting at 1
    #[must_use]
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate the next ID
    pub fn next_id(&mut self) -> MessageId {
        let id = MessageId(self.next.max(1));
        self.next = id.0 + 1;
        id
    }
}

/// Who wrote a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// The local user
    SelfUser,
    /// The counterpart
    Peer,
}

/// Delivery lifecycle, strictly forward-moving
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    /// Submitted, not yet delivered
    Pending,
    /// Delivered to the counterpart
    Delivered,
    /// Acknowledged (terminal)
    Acknowledged,
}

impl DeliveryState {
    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Delivered => "Delivered",
            Self::Acknowledged => "Acknowledged",
        }
    }

    /// Whether no further transition is possible
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Acknowledged)
    }
}

impl std::fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A message in a conversation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: MessageId,
    /// Message content
    pub text: String,
    /// Who wrote it
    pub origin: Origin,
    /// When the message was created (Unix timestamp ms)
    pub created_at_ms: u64,
    state: DeliveryState,
}

impl Message {
    /// Create an outgoing message in [`DeliveryState::Pending`]
    #[must_use]
    pub fn outgoing(id: MessageId, text: String) -> Self {
        Self::with_state(id, text, Origin::SelfUser, DeliveryState::Pending)
    }

    /// Create a peer message, already [`DeliveryState::Acknowledged`]
    #[must_use]
    pub fn incoming(id: MessageId, text: String) -> Self {
        Self::with_state(id, text, Origin::Peer, DeliveryState::Acknowledged)
    }

    /// Create a message with an explicit state (history seeding)
    #[must_use]
    pub fn with_state(id: MessageId, text: String, origin: Origin, state: DeliveryState) -> Self {
        Self {
            id,
            text,
            origin,
            created_at_ms: now_ms(),
            state,
        }
    }

    /// Current delivery state
    #[must_use]
    pub fn state(&self) -> DeliveryState {
        self.state
    }

    /// Move to `next` if that is a forward step; returns whether it moved
    pub fn advance_to(&mut self, next: DeliveryState) -> bool {
        if next > self.state {
            self.state = next;
            true
        } else {
            false
        }
    }

    /// Local `HH:MM` of creation
    #[must_use]
    pub fn time_label(&self) -> String {
        i64::try_from(self.created_at_ms)
            .ok()
            .and_then(chrono::DateTime::from_timestamp_millis)
            .map(|t| t.with_timezone(&chrono::Local).format("%H:%M").to_string())
            .unwrap_or_default()
    }

    /// Receipt marker for own messages (single or double check)
    #[must_use]
    pub fn receipt_icon(&self) -> Option<&'static str> {
        match (self.origin, self.state) {
            (Origin::Peer, _) => None,
            (Origin::SelfUser, DeliveryState::Acknowledged) => Some("✓✓"),
            (Origin::SelfUser, _) => Some("✓"),
        }
    }
}

/// Get current timestamp in milliseconds
pub(crate) fn now_ms() -> u64 {
    let elapsed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
