//! Runtime for driving a session
//!
//! A `SessionController` runs as its own task, applies events through the
//! pure transition function and publishes a snapshot after every change.
//! Callers talk to it through a `SessionHandle`.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::SessionController;

use crate::mode::Mode;
use crate::session::{Event, SessionState, TranscriptEntry};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 32;
pub(crate) const UPDATE_CHANNEL_CAPACITY: usize = 128;

/// Everything a renderer needs, published after every state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub mode: Mode,
    pub label: &'static str,
    /// The seed prompt, shown above the transcript
    pub header: Option<String>,
    pub transcript: Vec<TranscriptEntry>,
    pub awaiting_response: bool,
}

impl SessionSnapshot {
    pub(crate) fn capture(session_id: &str, state: &SessionState) -> Self {
        Self {
            session_id: session_id.to_string(),
            mode: state.mode(),
            label: state.mode().label(),
            header: state
                .seed()
                .filter(|s| !s.trim().is_empty())
                .map(ToString::to_string),
            transcript: state.transcript().entries().to_vec(),
            awaiting_response: state.awaiting_response(),
        }
    }
}

/// Updates sent to subscribers
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    Snapshot(SessionSnapshot),
    /// A submission was refused without changing state
    Rejected { reason: String },
}

#[derive(Debug, Error)]
#[error("Session runtime has stopped")]
pub struct SessionClosed;

/// Handle to interact with a running session
pub struct SessionHandle {
    session_id: String,
    event_tx: mpsc::Sender<Event>,
    updates: broadcast::Receiver<SessionUpdate>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Queue a user message. Blank or busy submissions are dropped by the
    /// session itself.
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), SessionClosed> {
        self.event_tx
            .send(Event::user_message(text))
            .await
            .map_err(|_| SessionClosed)
    }

    /// Re-send the construction signal. Has no effect once the seed prompt
    /// has gone out.
    pub async fn start(&self) -> Result<(), SessionClosed> {
        self.event_tx
            .send(Event::Start)
            .await
            .map_err(|_| SessionClosed)
    }

    /// Wait for the next update. Returns `None` once the session has stopped.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        loop {
            match self.updates.recv().await {
                Ok(update) => return Some(update),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(session_id = %self.session_id, skipped, "Update receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Independent receiver for updates published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.updates.resubscribe()
    }
}
