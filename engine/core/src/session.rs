//! Session
//!
//! The single owned object holding all core state: the onboarding wizard,
//! the conversation engine, the message ID allocator and the virtual clock.
//! Surfaces talk to it through [`Intent`]s and receive [`SessionMessage`]s;
//! nothing else mutates its state.
//!
//! The session is synchronous. Time only moves when the owner calls
//! [`Session::advance`] or [`Session::advance_to`], which makes every timeline
//! reproducible in tests. [`SessionRuntime`](crate::SessionRuntime) is the
//! async owner that maps wall time onto this clock.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::SessionConfig;
use crate::conversation::{MessageId, MessageIds};
use crate::engine::{ConversationEngine, EngineError};
use crate::identity::Identity;
use crate::intents::Intent;
use crate::onboarding::{OnboardingController, OnboardingError, OnboardingStep};
use crate::projection::{Projection, SessionMessage};

/// Why an intent was refused
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Wizard refused the operation
    #[error(transparent)]
    Onboarding(#[from] OnboardingError),

    /// Conversation engine refused the operation
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Chat intent before an identity is active
    #[error("No identity is signed in")]
    NotSignedIn,
}

/// The explicit session object
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    onboarding: OnboardingController,
    engine: ConversationEngine,
    ids: MessageIds,
    now_ms: u64,
    tx: mpsc::UnboundedSender<SessionMessage>,
}

impl Session {
    /// Create a session at the welcome screen
    #[must_use]
    pub fn new(config: SessionConfig, tx: mpsc::UnboundedSender<SessionMessage>) -> Self {
        Self {
            onboarding: OnboardingController::new(config.rules.clone()),
            engine: ConversationEngine::new(&config),
            ids: MessageIds::new(),
            now_ms: 0,
            config,
            tx,
        }
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current virtual time (ms since the session started)
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Current wizard step
    #[must_use]
    pub fn step(&self) -> OnboardingStep {
        self.onboarding.step()
    }

    /// The signed-in identity
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.onboarding.active_identity()
    }

    /// Read access to the conversation engine
    #[must_use]
    pub fn engine(&self) -> &ConversationEngine {
        &self.engine
    }

    /// Virtual time of the next scheduled effect
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.engine.next_deadline()
    }

    /// Apply an intent and publish the resulting projection
    ///
    /// # Errors
    ///
    /// Returns the refusal reason; state is unchanged and nothing is
    /// published in that case.
    pub fn handle_intent(&mut self, intent: Intent) -> Result<(), SessionError> {
        tracing::debug!(intent = intent.name(), now_ms = self.now_ms, "Handling intent");

        if intent.requires_identity() && self.onboarding.active_identity().is_none() {
            return Err(SessionError::NotSignedIn);
        }

        match intent {
            Intent::BeginRegistration => self.onboarding.begin_registration()?,
            Intent::BeginLogin => {
                let identity = self.onboarding.begin_login()?;
                tracing::info!(handle = %identity.handle, "Signed in");
            }
            Intent::SubmitPhone { value } => self.onboarding.submit_phone(&value)?,
            Intent::SelectAvatar { choice } => self.onboarding.select_avatar(choice)?,
            Intent::SubmitProfile { name, handle } => {
                self.onboarding.submit_profile(&name, &handle)?;
            }
            Intent::AbandonRegistration => self.onboarding.abandon()?,
            Intent::OpenConversation { conversation } => {
                self.engine.open(conversation, &mut self.ids);
            }
            Intent::CloseConversation => {
                if self.engine.close().is_none() {
                    return Ok(());
                }
            }
            Intent::Submit { text } => {
                self.submit(&text)?;
            }
            Intent::SignOut => {
                self.onboarding.sign_out()?;
                self.engine.close();
                tracing::info!("Signed out");
            }
        }

        self.publish();
        Ok(())
    }

    fn submit(&mut self, text: &str) -> Result<MessageId, SessionError> {
        Ok(self.engine.submit(text, self.now_ms, &mut self.ids)?)
    }

    /// Move the virtual clock forward by `delta`
    ///
    /// Returns the number of effects applied.
    pub fn advance(&mut self, delta: Duration) -> usize {
        let delta_ms = u64::try_from(delta.as_millis()).unwrap_or(u64::MAX);
        self.advance_to(self.now_ms.saturating_add(delta_ms))
    }

    /// Move the virtual clock to `target_ms`, firing due effects in order
    ///
    /// A projection is published after each applied effect. The clock never
    /// moves backwards. Returns the number of effects applied.
    pub fn advance_to(&mut self, target_ms: u64) -> usize {
        let mut applied = 0;
        while let Some(deadline) = self.engine.next_deadline().filter(|d| *d <= target_ms) {
            self.now_ms = self.now_ms.max(deadline);
            while self.engine.fire_next(self.now_ms, &mut self.ids).is_some() {
                applied += 1;
                self.publish();
            }
        }
        self.now_ms = self.now_ms.max(target_ms);
        applied
    }

    /// Flip the premium flag of the registered identity
    ///
    /// # Errors
    ///
    /// [`SessionError::NotSignedIn`] when nothing was registered yet.
    pub fn set_premium(&mut self, premium: bool) -> Result<(), SessionError> {
        let identity = self
            .onboarding
            .registered_mut()
            .ok_or(SessionError::NotSignedIn)?;
        identity.set_premium(premium);
        tracing::info!(premium, "Premium flag updated");
        self.publish();
        Ok(())
    }

    /// Tear down: cancel every pending effect
    pub fn shutdown(&mut self) {
        self.engine.shutdown();
        tracing::debug!(now_ms = self.now_ms, "Session shut down");
    }

    /// Build the current read-only view
    #[must_use]
    pub fn projection(&self) -> Projection {
        match self.onboarding.active_identity() {
            Some(identity) => {
                let open = self.engine.open_conversation();
                Projection::Chat {
                    identity: identity.clone(),
                    conversation: open.map(|o| o.conversation.clone()),
                    messages: open.map(|o| o.messages.clone()).unwrap_or_default(),
                    typing: open.is_some_and(|o| o.typing),
                }
            }
            None => {
                let step = self.onboarding.step();
                Projection::Onboarding {
                    step,
                    progress: step.progress(),
                    draft: self.onboarding.draft().clone(),
                }
            }
        }
    }

    /// Push the current projection to the surface
    pub fn publish(&self) {
        self.send(SessionMessage::Snapshot(self.projection()));
    }

    /// Send a message to the surface
    pub(crate) fn send(&self, msg: SessionMessage) {
        if self.tx.send(msg).is_err() {
            tracing::trace!("Surface receiver dropped, message discarded");
        }
    }
}
