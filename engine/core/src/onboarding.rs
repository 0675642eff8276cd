//! Onboarding Controller
//!
//! Drives the linear registration wizard that turns raw user input into an
//! [`Identity`].
//!
//! # State Transitions
//!
//! ```text
//! Start -- begin_registration() --> PhoneEntry
//! Start -- begin_login() --> Complete            (only if an identity was registered earlier)
//! PhoneEntry -- submit_phone(valid) --> AvatarSelection
//! AvatarSelection -- select_avatar() --> ProfileDetails
//! ProfileDetails -- submit_profile(valid) --> Complete
//! Complete -- sign_out() --> Start               (registered identity is kept)
//! PhoneEntry | AvatarSelection | ProfileDetails -- abandon() --> Start (draft discarded)
//! ```
//!
//! Validation failures leave the controller on the same step with the draft
//! untouched, so the surface can simply re-render and let the user retry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::{Avatar, AvatarChoice, Identity};
use crate::validation::{ValidationError, ValidationRules};

/// Wizard steps
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    /// Welcome screen: register or log in
    Start,
    /// Waiting for a phone number
    PhoneEntry,
    /// Waiting for an avatar pick
    AvatarSelection,
    /// Waiting for display name and handle
    ProfileDetails,
    /// Identity established
    Complete,
}

impl OnboardingStep {
    /// Stable tag used in projections and logs
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::PhoneEntry => "phone_entry",
            Self::AvatarSelection => "avatar_selection",
            Self::ProfileDetails => "profile_details",
            Self::Complete => "complete",
        }
    }

    /// Position among the data-entry steps, as `(step, total)`
    #[must_use]
    pub fn progress(&self) -> Option<(u8, u8)> {
        match self {
            Self::PhoneEntry => Some((1, 3)),
            Self::AvatarSelection => Some((2, 3)),
            Self::ProfileDetails => Some((3, 3)),
            Self::Start | Self::Complete => None,
        }
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Fields collected so far
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingDraft {
    /// Accepted phone number
    pub phone: Option<String>,
    /// Chosen avatar
    pub avatar: Option<Avatar>,
    /// Display name
    pub display_name: Option<String>,
    /// Handle
    pub handle: Option<String>,
}

/// Errors from wizard operations
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OnboardingError {
    /// Input did not pass validation
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Operation does not belong to the current step
    #[error("Operation expects step {expected}, wizard is at {actual}")]
    WrongStep {
        /// Step the operation belongs to
        expected: OnboardingStep,
        /// Step the wizard is at
        actual: OnboardingStep,
    },

    /// Login attempted before any registration in this process
    #[error("No identity has been registered yet")]
    NoRegisteredIdentity,
}

/// The registration wizard
#[derive(Clone, Debug)]
pub struct OnboardingController {
    rules: ValidationRules,
    step: OnboardingStep,
    draft: OnboardingDraft,
    /// Last identity completed in this process
    registered: Option<Identity>,
}

impl OnboardingController {
    /// Create a controller at [`OnboardingStep::Start`]
    #[must_use]
    pub fn new(rules: ValidationRules) -> Self {
        Self {
            rules,
            step: OnboardingStep::Start,
            draft: OnboardingDraft::default(),
            registered: None,
        }
    }

    /// Current step
    #[must_use]
    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    /// Draft collected so far
    #[must_use]
    pub fn draft(&self) -> &OnboardingDraft {
        &self.draft
    }

    /// Identity registered earlier in this process, signed in or not
    #[must_use]
    pub fn registered(&self) -> Option<&Identity> {
        self.registered.as_ref()
    }

    /// The signed-in identity (only at [`OnboardingStep::Complete`])
    #[must_use]
    pub fn active_identity(&self) -> Option<&Identity> {
        if self.step == OnboardingStep::Complete {
            self.registered.as_ref()
        } else {
            None
        }
    }

    /// Mutable access to the registered identity (premium flag updates)
    pub fn registered_mut(&mut self) -> Option<&mut Identity> {
        self.registered.as_mut()
    }

    /// Start -> PhoneEntry
    pub fn begin_registration(&mut self) -> Result<(), OnboardingError> {
        self.expect_step(OnboardingStep::Start)?;
        self.draft = OnboardingDraft::default();
        self.transition(OnboardingStep::PhoneEntry);
        Ok(())
    }

    /// Start -> Complete, only when an identity already exists
    pub fn begin_login(&mut self) -> Result<&Identity, OnboardingError> {
        self.expect_step(OnboardingStep::Start)?;
        if self.registered.is_none() {
            tracing::debug!("Login refused: nothing registered in this process");
            return Err(OnboardingError::NoRegisteredIdentity);
        }
        self.transition(OnboardingStep::Complete);
        self.registered
            .as_ref()
            .ok_or(OnboardingError::NoRegisteredIdentity)
    }

    /// PhoneEntry -> AvatarSelection when the number is long enough
    pub fn submit_phone(&mut self, value: &str) -> Result<(), OnboardingError> {
        self.expect_step(OnboardingStep::PhoneEntry)?;
        let phone = self.rules.validate_phone(value)?;
        self.draft.phone = Some(phone.to_string());
        self.transition(OnboardingStep::AvatarSelection);
        Ok(())
    }

    /// AvatarSelection -> ProfileDetails; any choice is accepted
    pub fn select_avatar(&mut self, choice: AvatarChoice) -> Result<(), OnboardingError> {
        self.expect_step(OnboardingStep::AvatarSelection)?;
        self.draft.avatar = Some(Avatar::from(choice));
        self.transition(OnboardingStep::ProfileDetails);
        Ok(())
    }

    /// ProfileDetails -> Complete, building the identity
    pub fn submit_profile(&mut self, name: &str, handle: &str) -> Result<&Identity, OnboardingError> {
        self.expect_step(OnboardingStep::ProfileDetails)?;
        let (name, handle) = self.rules.validate_profile(name, handle)?;

        let draft = std::mem::take(&mut self.draft);
        let identity = Identity::new(
            draft.phone.unwrap_or_default(),
            draft.avatar.unwrap_or(Avatar::UploadPlaceholder),
            name.to_string(),
            handle.to_string(),
        );
        tracing::info!(handle = %identity.handle, "Identity registered");

        self.registered = Some(identity);
        self.transition(OnboardingStep::Complete);
        self.registered
            .as_ref()
            .ok_or(OnboardingError::NoRegisteredIdentity)
    }

    /// Complete -> Start, keeping the registered identity for a later login
    pub fn sign_out(&mut self) -> Result<(), OnboardingError> {
        self.expect_step(OnboardingStep::Complete)?;
        self.transition(OnboardingStep::Start);
        Ok(())
    }

    /// Drop a partially filled wizard and return to Start
    pub fn abandon(&mut self) -> Result<(), OnboardingError> {
        match self.step {
            OnboardingStep::Start => Ok(()),
            OnboardingStep::Complete => Err(OnboardingError::WrongStep {
                expected: OnboardingStep::ProfileDetails,
                actual: OnboardingStep::Complete,
            }),
            OnboardingStep::PhoneEntry
            | OnboardingStep::AvatarSelection
            | OnboardingStep::ProfileDetails => {
                self.draft = OnboardingDraft::default();
                self.transition(OnboardingStep::Start);
                Ok(())
            }
        }
    }

    fn expect_step(&self, expected: OnboardingStep) -> Result<(), OnboardingError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(OnboardingError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }

    fn transition(&mut self, next: OnboardingStep) {
        tracing::debug!(from = %self.step, to = %next, "Onboarding transition");
        self.step = next;
    }
}
