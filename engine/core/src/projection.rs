//! Session Messages
//!
//! What the session pushes back to surfaces. A surface holds no logic of its
//! own: it renders the latest [`Projection`] and shows rejections inline.
//!
//! A fresh snapshot is published after every state mutation, so a surface
//! that only keeps the most recent one is always current.

use serde::{Deserialize, Serialize};

use crate::conversation::{Conversation, Message};
use crate::identity::Identity;
use crate::onboarding::{OnboardingDraft, OnboardingStep};

/// Messages from the session to a surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionMessage {
    /// Complete read-only state after a mutation
    Snapshot(Projection),

    /// An intent was refused; state is unchanged
    Rejected {
        /// Intent name
        intent: String,
        /// Human-readable reason
        reason: String,
    },
}

impl SessionMessage {
    /// Serialize for line-oriented surfaces
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Read-only view of the session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Projection {
    /// Identity not active yet
    Onboarding {
        /// Current wizard step
        step: OnboardingStep,
        /// "step N of 3" for the data-entry steps
        progress: Option<(u8, u8)>,
        /// Fields collected so far
        draft: OnboardingDraft,
    },

    /// Signed in
    Chat {
        /// The active identity
        identity: Identity,
        /// Open conversation, if any
        conversation: Option<Conversation>,
        /// Its ordered message list (empty when nothing is open)
        messages: Vec<Message>,
        /// Peer typing indicator
        typing: bool,
    },
}

impl Projection {
    /// Whether this is the chat screen
    #[must_use]
    pub fn is_chat(&self) -> bool {
        matches!(self, Self::Chat { .. })
    }

    /// Message list (empty during onboarding)
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        match self {
            Self::Chat { messages, .. } => messages,
            Self::Onboarding { .. } => &[],
        }
    }

    /// Typing indicator (false during onboarding)
    #[must_use]
    pub fn typing(&self) -> bool {
        matches!(self, Self::Chat { typing: true, .. })
    }
}
