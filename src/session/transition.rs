//! Pure state transition function

use super::state::{SessionPhase, SessionState, TranscriptEntry};
use super::{Effect, Event};
use crate::transport::ResponsePayload;
use thiserror::Error;

/// System entry appended when a dispatch fails
pub const APOLOGY_TEXT: &str = "Sorry, there was an error processing your message.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_phase: SessionPhase,
    pub seed_consumed: bool,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    /// Move to `phase`, carrying the seed guard over from `state`
    pub fn new(state: &SessionState, phase: SessionPhase) -> Self {
        Self {
            new_phase: phase,
            seed_consumed: state.seed_consumed,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn consuming_seed(mut self) -> Self {
        self.seed_consumed = true;
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition. None of them change state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Awaiting a response, cannot accept message")]
    Busy,
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Seed prompt already dispatched")]
    SeedAlreadyConsumed,
    #[error("Session has not started")]
    NotStarted,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same state and event it always produces the same result and
/// performs no I/O.
pub fn transition(state: &SessionState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state.phase, event) {
        // ============================================================
        // Construction
        // ============================================================
        (_, Event::Start) if state.seed_consumed => Err(TransitionError::SeedAlreadyConsumed),

        (SessionPhase::Idle, Event::Start) => {
            match state.seed.as_deref().filter(|s| !s.trim().is_empty()) {
                Some(seed) => Ok(begin_dispatch(state, seed).consuming_seed()),
                // Nothing to send; close the guard so later signals stay no-ops
                None => Ok(TransitionResult::new(state, SessionPhase::Idle).consuming_seed()),
            }
        }

        (SessionPhase::Awaiting, Event::Start) => Err(TransitionError::InvalidTransition(
            "start signal while awaiting with unconsumed seed".to_string(),
        )),

        // ============================================================
        // User Message Handling
        // ============================================================
        // The seed has to go out first so it stays the opening entry
        (SessionPhase::Idle, Event::UserMessage { .. }) if !state.seed_consumed => {
            Err(TransitionError::NotStarted)
        }

        (SessionPhase::Idle, Event::UserMessage { text }) => {
            if text.trim().is_empty() {
                return Err(TransitionError::EmptyMessage);
            }
            Ok(begin_dispatch(state, &text))
        }

        (SessionPhase::Awaiting, Event::UserMessage { .. }) => Err(TransitionError::Busy),

        // ============================================================
        // Response Reconciliation
        // ============================================================
        (SessionPhase::Awaiting, Event::TransportResponse { payload }) => {
            let entries = match payload {
                ResponsePayload::Reply(text) => vec![TranscriptEntry::system(text)],
                ResponsePayload::Passages(passages) => passages
                    .into_iter()
                    .map(TranscriptEntry::from_passage)
                    .collect(),
            };
            Ok(TransitionResult::new(state, SessionPhase::Idle)
                .with_effects(entries.into_iter().map(Effect::append))
                .with_effect(Effect::NotifyClient))
        }

        (SessionPhase::Awaiting, Event::TransportFailed { .. }) => {
            Ok(TransitionResult::new(state, SessionPhase::Idle)
                .with_effect(Effect::append(TranscriptEntry::system(APOLOGY_TEXT)))
                .with_effect(Effect::NotifyClient))
        }

        (
            SessionPhase::Idle,
            Event::TransportResponse { .. } | Event::TransportFailed { .. },
        ) => Err(TransitionError::InvalidTransition(
            "transport result with no dispatch outstanding".to_string(),
        )),
    }
}

/// Append the user's message, enter `Awaiting`, and dispatch it
fn begin_dispatch(state: &SessionState, text: &str) -> TransitionResult {
    TransitionResult::new(state, SessionPhase::Awaiting)
        .with_effect(Effect::append(TranscriptEntry::user(text)))
        .with_effect(Effect::dispatch(state.mode.target(), text))
        .with_effect(Effect::NotifyClient)
}
