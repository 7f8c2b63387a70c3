//! Session state types

use super::effect::{Effect, RuntimeEffect};
use super::transition::TransitionResult;
use crate::mode::Mode;
use crate::transport::Passage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display name for system entries
pub const ASSISTANT_NAME: &str = "ProustGPT";

// ============================================================================
// Transcript
// ============================================================================

/// Who produced an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    User,
    System,
}

/// Source attribution for an entry derived from a passage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Book title
    pub source: String,
    /// Chapter within the book
    pub locator: String,
}

/// One transcript line. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub origin: Origin,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<Citation>,
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::User,
            text: text.into(),
            citation: None,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::System,
            text: text.into(),
            citation: None,
        }
    }

    pub fn from_passage(passage: Passage) -> Self {
        Self {
            origin: Origin::System,
            text: passage.text,
            citation: Some(Citation {
                source: passage.book,
                locator: passage.chapter,
            }),
        }
    }
}

impl fmt::Display for TranscriptEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            Origin::User => write!(f, "You: {}", self.text)?,
            Origin::System => write!(f, "{ASSISTANT_NAME}: {}", self.text)?,
        }
        if let Some(citation) = &self.citation {
            write!(f, " ({}, {})", citation.source, citation.locator)?;
        }
        Ok(())
    }
}

/// Append-only, oldest-first log of entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript(Vec<TranscriptEntry>);

impl Transcript {
    pub(crate) fn push(&mut self, entry: TranscriptEntry) {
        self.0.push(entry);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TranscriptEntry> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a TranscriptEntry;
    type IntoIter = std::slice::Iter<'a, TranscriptEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Whether a dispatch is outstanding
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionPhase {
    /// Ready for user input
    #[default]
    Idle,
    /// A message has been dispatched and its result has not landed yet
    Awaiting,
}

/// Complete state of one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) mode: Mode,
    pub(crate) seed: Option<String>,
    pub(crate) phase: SessionPhase,
    pub(crate) seed_consumed: bool,
    pub(crate) transcript: Transcript,
}

impl SessionState {
    pub fn new(mode: Mode, seed: Option<String>) -> Self {
        Self {
            mode,
            seed,
            phase: SessionPhase::Idle,
            seed_consumed: false,
            transcript: Transcript::default(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn seed(&self) -> Option<&str> {
        self.seed.as_deref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn awaiting_response(&self) -> bool {
        self.phase == SessionPhase::Awaiting
    }

    pub fn seed_consumed(&self) -> bool {
        self.seed_consumed
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Commit a transition: update the phase and the seed guard, append
    /// the new entries, and hand back the effects that need I/O.
    pub(crate) fn apply(&mut self, result: TransitionResult) -> Vec<RuntimeEffect> {
        self.phase = result.new_phase;
        self.seed_consumed = result.seed_consumed;

        let mut io_effects = Vec::with_capacity(result.effects.len());
        for effect in result.effects {
            match effect {
                Effect::AppendEntry { entry } => self.transcript.push(entry),
                Effect::Dispatch { target, message } => {
                    io_effects.push(RuntimeEffect::Dispatch { target, message });
                }
                Effect::NotifyClient => io_effects.push(RuntimeEffect::NotifyClient),
            }
        }
        io_effects
    }
}
