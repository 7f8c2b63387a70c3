//! Effects produced by state transitions

use super::state::TranscriptEntry;
use crate::mode::OperationTarget;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append an entry to the transcript
    AppendEntry { entry: TranscriptEntry },

    /// Send a message to the backend (runs as a background task)
    Dispatch {
        target: OperationTarget,
        message: String,
    },

    /// Publish a fresh snapshot to subscribers
    NotifyClient,
}

/// Effects left for the runtime once a transition is committed. Transcript
/// appends never reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEffect {
    Dispatch {
        target: OperationTarget,
        message: String,
    },
    NotifyClient,
}

impl Effect {
    pub fn append(entry: TranscriptEntry) -> Self {
        Effect::AppendEntry { entry }
    }

    pub fn dispatch(target: OperationTarget, message: impl Into<String>) -> Self {
        Effect::Dispatch {
            target,
            message: message.into(),
        }
    }
}
