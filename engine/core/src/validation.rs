//! Validation Rules
//!
//! Checks applied to raw user input before it may change session state.
//! Every failure is a recoverable [`ValidationError`]: the caller keeps the
//! current screen and may retry immediately with corrected input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons raw input was refused
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Phone number shorter than the configured minimum
    #[error("Phone number too short: {actual} characters (min: {min})")]
    PhoneTooShort {
        /// Characters supplied (after trimming)
        actual: usize,
        /// Required minimum
        min: usize,
    },

    /// Display name missing
    #[error("Display name must not be empty")]
    EmptyName,

    /// Handle missing
    #[error("Handle must not be empty")]
    EmptyHandle,

    /// Message text empty or whitespace only
    #[error("Message text must not be empty")]
    EmptyMessage,

    /// Message text above the size limit
    #[error("Message too large: {actual} bytes (max: {max})")]
    MessageTooLong {
        /// Bytes supplied
        actual: usize,
        /// Allowed maximum
        max: usize,
    },

    /// Message text carries control characters
    #[error("Message contains invalid control characters")]
    ControlCharacters,
}

/// Limits used by the validators
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Minimum phone length in characters (default: 10)
    pub min_phone_len: usize,
    /// Maximum message size in bytes (default: 4KB)
    pub max_message_len: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_phone_len: 10,
            max_message_len: 4096,
        }
    }
}

impl ValidationRules {
    /// Validate a phone number, returning the trimmed value
    pub fn validate_phone<'a>(&self, value: &'a str) -> Result<&'a str, ValidationError> {
        let trimmed = value.trim();
        let actual = trimmed.chars().count();
        if actual < self.min_phone_len {
            return Err(ValidationError::PhoneTooShort {
                actual,
                min: self.min_phone_len,
            });
        }
        Ok(trimmed)
    }

    /// Validate display name and handle, returning both trimmed
    pub fn validate_profile<'a>(
        &self,
        name: &'a str,
        handle: &'a str,
    ) -> Result<(&'a str, &'a str), ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let handle = handle.trim();
        if handle.is_empty() {
            return Err(ValidationError::EmptyHandle);
        }
        Ok((name, handle))
    }

    /// Validate outgoing message text
    ///
    /// The text is kept as typed; trimming only decides emptiness.
    pub fn validate_message_text(&self, text: &str) -> Result<(), ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyMessage);
        }

        if text.len() > self.max_message_len {
            return Err(ValidationError::MessageTooLong {
                actual: text.len(),
                max: self.max_message_len,
            });
        }

        // Newline, tab and carriage return are fine
        if text
            .chars()
            .any(|c| c.is_control() && c != '\n' && c != '\t' && c != '\r')
        {
            return Err(ValidationError::ControlCharacters);
        }

        Ok(())
    }
}
