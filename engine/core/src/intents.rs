//! Surface Intents
//!
//! Everything a presentation layer can ask the session to do. Surfaces
//! translate raw input (key presses, taps, stdin lines) into these and never
//! touch session state directly.

use serde::{Deserialize, Serialize};

use crate::conversation::Conversation;
use crate::identity::AvatarChoice;

/// Intents from a surface to the [`Session`](crate::Session)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    // ============================================
    // Onboarding
    // ============================================
    /// "Register" pressed on the welcome screen
    BeginRegistration,

    /// "Log in" pressed on the welcome screen
    BeginLogin,

    /// Phone number submitted
    SubmitPhone {
        /// Raw input
        value: String,
    },

    /// Avatar picked
    SelectAvatar {
        /// Glyph or upload marker
        choice: AvatarChoice,
    },

    /// Profile form submitted
    SubmitProfile {
        /// Display name
        name: String,
        /// Handle
        handle: String,
    },

    /// Leave a half-finished registration
    AbandonRegistration,

    // ============================================
    // Chat
    // ============================================
    /// Open a conversation supplied by the directory
    OpenConversation {
        /// The directory record
        conversation: Conversation,
    },

    /// Close the open conversation
    CloseConversation,

    /// Send a message in the open conversation
    Submit {
        /// Message text as typed
        text: String,
    },

    /// End the signed-in session
    SignOut,
}

impl Intent {
    /// Short name for logs and rejection reports
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::BeginRegistration => "begin_registration",
            Self::BeginLogin => "begin_login",
            Self::SubmitPhone { .. } => "submit_phone",
            Self::SelectAvatar { .. } => "select_avatar",
            Self::SubmitProfile { .. } => "submit_profile",
            Self::AbandonRegistration => "abandon_registration",
            Self::OpenConversation { .. } => "open_conversation",
            Self::CloseConversation => "close_conversation",
            Self::Submit { .. } => "submit",
            Self::SignOut => "sign_out",
        }
    }

    /// Whether the intent needs a signed-in identity
    #[must_use]
    pub fn requires_identity(&self) -> bool {
        matches!(
            self,
            Self::OpenConversation { .. } | Self::CloseConversation | Self::Submit { .. }
        )
    }
}
