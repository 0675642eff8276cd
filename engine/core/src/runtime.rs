//! Session Runtime
//!
//! Hosts a [`Session`] on one tokio task. Intents and timer deadlines are
//! served from a single loop, so every mutation happens on one logical
//! event queue and nothing runs in parallel.
//!
//! # Clock
//!
//! The session's virtual clock is pinned to the tokio clock at the moment
//! the runtime is created. Before an intent is applied the session is caught
//! up to the elapsed time, so timers and intents interleave in real-time
//! order. Under a paused tokio clock (`start_paused = true`) the whole
//! pipeline runs deterministically.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::intents::Intent;
use crate::projection::SessionMessage;
use crate::session::Session;

/// Default capacity of the intent channel
pub const DEFAULT_INTENT_BUFFER: usize = 64;

/// Cloneable sender for intents
#[derive(Clone, Debug)]
pub struct SessionHandle {
    tx: mpsc::Sender<Intent>,
}

impl SessionHandle {
    /// Queue an intent for the session
    ///
    /// # Errors
    ///
    /// Fails once the runtime has stopped.
    pub async fn send(&self, intent: Intent) -> Result<(), mpsc::error::SendError<Intent>> {
        self.tx.send(intent).await
    }
}

/// Owner of a session on the async side
#[derive(Debug)]
pub struct SessionRuntime {
    session: Session,
    intents: mpsc::Receiver<Intent>,
    started: Instant,
}

impl SessionRuntime {
    /// Wrap `session`, returning the runtime and its intent handle
    #[must_use]
    pub fn new(session: Session, buffer: usize) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let runtime = Self {
            session,
            intents: rx,
            started: Instant::now(),
        };
        (runtime, SessionHandle { tx })
    }

    /// Serve intents and deadlines until every handle is dropped
    ///
    /// Publishes the initial projection first. On exit the session is shut
    /// down (pending effects cancelled) and handed back.
    pub async fn run(mut self) -> Session {
        tracing::debug!("Session runtime started");
        self.session.publish();

        loop {
            let deadline = self.session.next_deadline().and_then(|ms| self.deadline_instant(ms));

            tokio::select! {
                intent = self.intents.recv() => {
                    let Some(intent) = intent else {
                        break;
                    };
                    self.catch_up();
                    self.apply(intent);
                }
                () = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.catch_up();
                }
            }
        }

        self.session.shutdown();
        tracing::debug!("Session runtime stopped");
        self.session
    }

    fn apply(&mut self, intent: Intent) {
        let name = intent.name();
        if let Err(e) = self.session.handle_intent(intent) {
            tracing::warn!(intent = name, error = %e, "Intent rejected");
            self.session.send(SessionMessage::Rejected {
                intent: name.to_string(),
                reason: e.to_string(),
            });
        }
    }

    fn catch_up(&mut self) {
        let elapsed = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.session.advance_to(elapsed);
    }

    /// Wall-clock instant for virtual time `ms`; `None` past what `Instant` can hold
    fn deadline_instant(&self, ms: u64) -> Option<Instant> {
        self.started.checked_add(Duration::from_millis(ms))
    }
}
