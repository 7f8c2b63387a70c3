//! Events that can occur in a session

use crate::transport::{ResponsePayload, TransportErrorKind};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// Construction signal. Fires the seed prompt the first time only.
    Start,

    // User events
    UserMessage {
        text: String,
    },

    // Transport events
    TransportResponse {
        payload: ResponsePayload,
    },
    TransportFailed {
        message: String,
        kind: TransportErrorKind,
    },
}

impl Event {
    pub fn user_message(text: impl Into<String>) -> Self {
        Event::UserMessage { text: text.into() }
    }
}
