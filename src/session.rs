//! Session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! The runtime feeds events in and executes the returned effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::{Effect, RuntimeEffect};
pub use event::Event;
pub use state::{Citation, Origin, SessionPhase, SessionState, Transcript, TranscriptEntry};
pub use transition::{transition, TransitionError, TransitionResult, APOLOGY_TEXT};
