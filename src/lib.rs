//! Proust chat - conversation session controller
//!
//! Tracks an append-only transcript for one chat session, routes each
//! message to the backend operation for the session's mode, and folds the
//! asynchronous result (or failure) back into the transcript.

pub mod client;
pub mod config;
pub mod mode;
pub mod runtime;
pub mod session;
pub mod transport;

pub use config::ClientConfig;
pub use mode::{resolve, Mode, OperationTarget, Resolution};
pub use runtime::{SessionController, SessionHandle, SessionSnapshot, SessionUpdate};
pub use session::{Citation, Origin, TranscriptEntry, APOLOGY_TEXT};
pub use transport::{HttpTransport, LoggingTransport, ResponsePayload, Transport, TransportError};
