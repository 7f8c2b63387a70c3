//! Session runtime executor

use super::{
    SessionHandle, SessionSnapshot, SessionUpdate, EVENT_CHANNEL_CAPACITY,
    UPDATE_CHANNEL_CAPACITY,
};
use crate::mode::Mode;
use crate::session::{transition, Event, RuntimeEffect, SessionState, TransitionError};
use crate::transport::{Transport, TransportErrorKind};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;

/// Owns one session's state and drives it with events
pub struct SessionController<T>
where
    T: Transport + 'static,
{
    session_id: String,
    state: SessionState,
    transport: Arc<T>,
    event_rx: mpsc::Receiver<Event>,
    broadcast_tx: broadcast::Sender<SessionUpdate>,
    /// At most one dispatch lives here at a time
    in_flight: JoinSet<Event>,
    /// Effects of the construction signal, executed once the task runs
    pending: Vec<RuntimeEffect>,
}

impl<T> SessionController<T>
where
    T: Transport + 'static,
{
    /// Create a session and start it on the current tokio runtime.
    ///
    /// Unknown `mode` ids fall back to `qa`. A non-blank `seed` is
    /// appended right away and sent as the first message.
    pub fn spawn(mode: &str, seed: Option<String>, transport: T) -> SessionHandle {
        let session_id = uuid::Uuid::new_v4().to_string();
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (broadcast_tx, broadcast_rx) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        let controller = Self::new(
            session_id.clone(),
            Mode::from_wire(mode),
            seed,
            transport,
            event_rx,
            broadcast_tx,
        );
        tokio::spawn(controller.run());

        SessionHandle {
            session_id,
            event_tx,
            updates: broadcast_rx,
        }
    }

    fn new(
        session_id: String,
        mode: Mode,
        seed: Option<String>,
        transport: T,
        event_rx: mpsc::Receiver<Event>,
        broadcast_tx: broadcast::Sender<SessionUpdate>,
    ) -> Self {
        let mut controller = Self {
            session_id,
            state: SessionState::new(mode, seed),
            transport: Arc::new(transport),
            event_rx,
            broadcast_tx,
            in_flight: JoinSet::new(),
            pending: Vec::new(),
        };
        controller.pending = controller.commit(Event::Start);
        controller
    }

    async fn run(mut self) {
        tracing::info!(
            session_id = %self.session_id,
            mode = %self.state.mode(),
            "Starting session runtime"
        );

        // Subscribers always get an initial snapshot
        let pending = std::mem::take(&mut self.pending);
        if !pending.contains(&RuntimeEffect::NotifyClient) {
            self.notify();
        }
        for effect in pending {
            self.execute_effect(effect);
        }

        // Runs until every handle is gone and no dispatch is outstanding
        loop {
            tokio::select! {
                Some(event) = self.event_rx.recv() => {
                    self.process_event(event);
                }
                Some(joined) = self.in_flight.join_next() => {
                    let event = joined.unwrap_or_else(|e| {
                        tracing::error!(session_id = %self.session_id, error = %e, "Dispatch task failed");
                        Event::TransportFailed {
                            message: format!("Dispatch task failed: {e}"),
                            kind: TransportErrorKind::Unknown,
                        }
                    });
                    self.process_event(event);
                }
                else => break,
            }
        }

        tracing::info!(session_id = %self.session_id, "Session runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        for effect in self.commit(event) {
            self.execute_effect(effect);
        }
    }

    /// Run the pure transition and apply it to the state. Returns the
    /// effects that still need executing. Rejected events change nothing.
    fn commit(&mut self, event: Event) -> Vec<RuntimeEffect> {
        match transition(&self.state, event) {
            Ok(result) => self.state.apply(result),
            Err(TransitionError::SeedAlreadyConsumed) => {
                tracing::debug!(session_id = %self.session_id, "Seed already dispatched, ignoring start");
                Vec::new()
            }
            Err(TransitionError::EmptyMessage) => {
                tracing::debug!(session_id = %self.session_id, "Ignoring blank message");
                Vec::new()
            }
            Err(e @ TransitionError::Busy) => {
                tracing::debug!(session_id = %self.session_id, "Rejecting message while awaiting response");
                let _ = self.broadcast_tx.send(SessionUpdate::Rejected {
                    reason: e.to_string(),
                });
                Vec::new()
            }
            Err(e @ (TransitionError::NotStarted | TransitionError::InvalidTransition(_))) => {
                tracing::warn!(session_id = %self.session_id, error = %e, "Dropping event");
                Vec::new()
            }
        }
    }

    fn execute_effect(&mut self, effect: RuntimeEffect) {
        match effect {
            RuntimeEffect::Dispatch { target, message } => {
                let transport = Arc::clone(&self.transport);
                let session_id = self.session_id.clone();

                self.in_flight.spawn(async move {
                    tracing::info!(
                        session_id = %session_id,
                        target_path = %target,
                        "Dispatching message (background)"
                    );

                    match transport.send(&target, &message).await {
                        Ok(payload) => Event::TransportResponse { payload },
                        Err(e) => {
                            tracing::warn!(
                                session_id = %session_id,
                                kind = ?e.kind,
                                error = %e,
                                "Dispatch failed, recording apology"
                            );
                            Event::TransportFailed {
                                message: e.message,
                                kind: e.kind,
                            }
                        }
                    }
                });
            }

            RuntimeEffect::NotifyClient => self.notify(),
        }
    }

    fn notify(&self) {
        let snapshot = SessionSnapshot::capture(&self.session_id, &self.state);
        let _ = self.broadcast_tx.send(SessionUpdate::Snapshot(snapshot));
    }
}
