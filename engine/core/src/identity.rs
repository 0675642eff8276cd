//! Identity Types
//!
//! The local user's profile as produced by the onboarding wizard, plus the
//! avatar value types shared by the wizard draft and the finished identity.
//!
//! # Design Philosophy
//!
//! An [`Identity`] only exists once onboarding has completed. Everything about
//! it is fixed from then on except the premium flag, which belongs to the
//! billing collaborator. No image bytes are ever modelled: an uploaded photo
//! is represented by a placeholder marker.

use serde::{Deserialize, Serialize};

/// Glyph palette offered by the avatar step
pub const AVATAR_GLYPHS: [&str; 12] = [
    "😊", "🚀", "🎨", "🎮", "🎵", "⚡", "🌟", "🔥", "💎", "🎯", "🌈", "🦄",
];

/// Glyph shown in place of an uploaded photo
pub const UPLOAD_PLACEHOLDER_GLYPH: &str = "📷";

/// What the user picked on the avatar step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvatarChoice {
    /// A symbolic glyph (normally one of [`AVATAR_GLYPHS`])
    Glyph(String),
    /// "Upload photo" was pressed
    Upload,
}

/// Stored avatar representation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Avatar {
    /// A symbolic glyph
    Glyph(String),
    /// Stand-in for an uploaded image
    UploadPlaceholder,
}

impl Avatar {
    /// Glyph to render for this avatar
    #[must_use]
    pub fn glyph(&self) -> &str {
        match self {
            Self::Glyph(glyph) => glyph,
            Self::UploadPlaceholder => UPLOAD_PLACEHOLDER_GLYPH,
        }
    }
}

impl From<AvatarChoice> for Avatar {
    fn from(choice: AvatarChoice) -> Self {
        match choice {
            AvatarChoice::Glyph(glyph) => Self::Glyph(glyph),
            AvatarChoice::Upload => Self::UploadPlaceholder,
        }
    }
}

impl std::fmt::Display for Avatar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.glyph())
    }
}

/// The local user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Phone number as entered (trimmed)
    pub phone: String,
    /// Chosen avatar
    pub avatar: Avatar,
    /// Display name ("nickname")
    pub display_name: String,
    /// Unique handle, e.g. `@anna`
    pub handle: String,
    premium: bool,
}

impl Identity {
    /// Create a non-premium identity
    #[must_use]
    pub fn new(phone: String, avatar: Avatar, display_name: String, handle: String) -> Self {
        Self {
            phone,
            avatar,
            display_name,
            handle,
            premium: false,
        }
    }

    /// Whether the premium subscription is active
    #[must_use]
    pub fn is_premium(&self) -> bool {
        self.premium
    }

    /// Flip the premium flag (billing collaborator only)
    pub fn set_premium(&mut self, premium: bool) {
        self.premium = premium;
    }
}
