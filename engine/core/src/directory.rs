//! Contact Directory
//!
//! The collaborator that supplies [`Conversation`] records. The session never
//! fetches or caches contacts itself; a surface looks one up here and hands
//! the record over with [`Intent::OpenConversation`](crate::Intent::OpenConversation).

use serde::{Deserialize, Serialize};

use crate::conversation::Conversation;

/// A person the user can chat with
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Stable identifier, reused as the conversation ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Handle, e.g. `@anna_sm`
    pub handle: String,
    /// Avatar glyph
    pub avatar: String,
    /// Presence
    pub online: bool,
}

impl Contact {
    fn new(id: &str, name: &str, handle: &str, avatar: &str, online: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            handle: handle.to_string(),
            avatar: avatar.to_string(),
            online,
        }
    }
}

impl Conversation {
    /// Direct conversation for `contact`: empty preview, zero unread
    #[must_use]
    pub fn from_contact(contact: &Contact) -> Self {
        Self::direct(
            contact.id.clone(),
            contact.name.clone(),
            contact.avatar.clone(),
            contact.online,
        )
    }
}

/// Source of contacts
pub trait ContactDirectory: Send + Sync {
    /// All known contacts, in display order
    fn contacts(&self) -> &[Contact];

    /// Look a contact up by ID
    fn find(&self, id: &str) -> Option<&Contact> {
        self.contacts().iter().find(|c| c.id == id)
    }
}

/// Directory backed by a fixed list
#[derive(Clone, Debug, Default)]
pub struct InMemoryDirectory {
    contacts: Vec<Contact>,
}

impl InMemoryDirectory {
    /// Create a directory from an explicit list
    #[must_use]
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self { contacts }
    }

    /// The three demo contacts
    #[must_use]
    pub fn with_sample_contacts() -> Self {
        Self::new(vec![
            Contact::new("1", "Анна Смирнова", "@anna_sm", "👩", true),
            Contact::new("2", "Дмитрий Козлов", "@dmitry_k", "👨", false),
            Contact::new("3", "Мария Петрова", "@maria_p", "👧", true),
        ])
    }
}

impl ContactDirectory for InMemoryDirectory {
    fn contacts(&self) -> &[Contact] {
        &self.contacts
    }
}
