//! Conversation modes and endpoint resolution
//!
//! Each mode maps to its own backend route. The mode never travels in the
//! request body; choosing the route is what selects the operation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conversation mode, fixed for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Qa,
    ExploreLostTime,
    RefineProse,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Qa, Mode::ExploreLostTime, Mode::RefineProse];

    /// Parse a caller-supplied mode id. Ids match exactly; anything else,
    /// including case or whitespace variants, falls back to `Qa`.
    pub fn from_wire(id: &str) -> Self {
        match id {
            "qa" => Mode::Qa,
            "explore_lost_time" => Mode::ExploreLostTime,
            "refine_prose" => Mode::RefineProse,
            other => {
                tracing::debug!(mode = %other, "Unknown mode, falling back to qa");
                Mode::Qa
            }
        }
    }

    pub fn wire_id(self) -> &'static str {
        match self {
            Mode::Qa => "qa",
            Mode::ExploreLostTime => "explore_lost_time",
            Mode::RefineProse => "refine_prose",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Qa => "Q&A",
            Mode::ExploreLostTime => "Explore Lost Time",
            Mode::RefineProse => "Refine Prose",
        }
    }

    pub fn target(self) -> OperationTarget {
        OperationTarget(match self {
            Mode::Qa => "/api/qa",
            Mode::ExploreLostTime => "/api/explore_lost_time",
            Mode::RefineProse => "/api/refine_prose",
        })
    }

    pub fn resolution(self) -> Resolution {
        Resolution {
            target: self.target(),
            label: self.label(),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_id())
    }
}

/// Route path of a backend operation, relative to the API base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationTarget(&'static str);

impl OperationTarget {
    pub fn path(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for OperationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Result of resolving a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub target: OperationTarget,
    pub label: &'static str,
}

/// Resolve any caller-supplied mode id to its target and label.
///
/// Never fails: unrecognized ids resolve exactly like `qa`.
pub fn resolve(mode: &str) -> Resolution {
    Mode::from_wire(mode).resolution()
}
