//! Lites Core - Headless Messenger Session
//!
//! This crate holds the whole behavior of the Lites messenger prototype:
//! the onboarding wizard that produces a local identity, and the
//! conversation engine that runs a simulated reply pipeline for every
//! message the user sends. It knows nothing about rendering; any surface
//! (terminal, web, test harness) drives it with intents and renders the
//! projections it publishes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Surfaces                              │
//! │   ┌──────────────┐   ┌──────────────┐   ┌────────────────┐   │
//! │   │  lites CLI   │   │  Web / GUI   │   │  Test harness  │   │
//! │   └──────┬───────┘   └──────┬───────┘   └───────┬────────┘   │
//! │          └──────────────────┴───────────────────┘            │
//! │                     Intent (up)                              │
//! │                SessionMessage (down)                         │
//! └─────────────────────────┬────────────────────────────────────┘
//!                           │
//! ┌─────────────────────────┼────────────────────────────────────┐
//! │                   SessionRuntime (tokio)                     │
//! │  ┌──────────────────────┴─────────────────────────────────┐  │
//! │  │                       Session                          │  │
//! │  │  ┌──────────────┐  ┌────────────────┐  ┌────────────┐  │  │
//! │  │  │  Onboarding  │  │  Conversation  │  │   Delay    │  │  │
//! │  │  │  Controller  │  │     Engine     │──│   Queue    │  │  │
//! │  │  └──────────────┘  └────────────────┘  └────────────┘  │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Session`]: the single owned object holding all state
//! - [`Intent`]: what a surface asks for
//! - [`SessionMessage`] / [`Projection`]: what a surface renders
//! - [`SessionRuntime`]: async host mapping wall time onto the session clock
//! - [`ContactDirectory`]: where conversation records come from
//!
//! # Quick Start
//!
//! ```ignore
//! use lites_core::{
//!     load_config, Conversation, InMemoryDirectory, ContactDirectory, Intent, Session,
//!     SessionRuntime, DEFAULT_INTENT_BUFFER,
//! };
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (tx, mut rx) = mpsc::unbounded_channel();
//!     let session = Session::new(load_config()?, tx);
//!     let (runtime, handle) = SessionRuntime::new(session, DEFAULT_INTENT_BUFFER);
//!     tokio::spawn(runtime.run());
//!
//!     handle.send(Intent::BeginRegistration).await?;
//!     while let Some(msg) = rx.recv().await {
//!         // render msg
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`identity`]: the local user's profile and avatar values
//! - [`validation`]: input checks shared by the wizard and the engine
//! - [`onboarding`]: the registration wizard
//! - [`conversation`]: conversations, messages and delivery states
//! - [`scheduler`]: the tagged delay queue
//! - [`engine`]: open conversation, typing signal and reply pipeline
//! - [`session`]: the owned session object
//! - [`intents`] / [`projection`]: the surface boundary
//! - [`directory`]: contact directory collaborator
//! - [`runtime`]: tokio host
//! - [`config`]: layered configuration
//!
//! # No UI Dependencies
//!
//! Nothing here renders. The crate can be embedded behind any surface.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod conversation;
pub mod directory;
pub mod engine;
pub mod identity;
pub mod intents;
pub mod onboarding;
pub mod projection;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod validation;

// Re-exports for convenience
pub use config::{
    default_config_path, load_config, load_config_from_path, load_config_with_env, ConfigError,
    ConfigOverrides, ConfigSource, PipelineTimings, SeedMessages, SessionConfig, SessionToml,
    MAX_PIPELINE_MS,
};
pub use conversation::{
    Conversation, ConversationId, ConversationKind, DeliveryState, Message, MessageId,
    MessageIds, Origin,
};
pub use directory::{Contact, ContactDirectory, InMemoryDirectory};
pub use engine::{ConversationEngine, EngineError, OpenConversation, ReplyEffect};
pub use identity::{Avatar, AvatarChoice, Identity, AVATAR_GLYPHS, UPLOAD_PLACEHOLDER_GLYPH};
pub use intents::Intent;
pub use onboarding::{OnboardingController, OnboardingDraft, OnboardingError, OnboardingStep};
pub use projection::{Projection, SessionMessage};
pub use runtime::{SessionHandle, SessionRuntime, DEFAULT_INTENT_BUFFER};
pub use scheduler::{DelayQueue, Scheduled, TaskId, TaskTag};
pub use session::{Session, SessionError};
pub use validation::{ValidationError, ValidationRules};
