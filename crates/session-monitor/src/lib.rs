//! Session Monitor library
//!
//! Aggregates lifecycle events written by many short-lived hook processes
//! into a single live view of what every instrumented agent session is doing.
//!
//! Emitters never talk to the viewer directly. Each hook invocation rewrites
//! one JSON file per session in a shared directory; the viewer re-reads that
//! directory on every refresh, annotates records whose process has died, and
//! renders a grouped text frame that can be clicked to focus the terminal the
//! session lives in.
//!
//! # Module map
//!
//! - [`session`] - the record model and time helpers
//! - [`event`] - the hook event state machine (pure)
//! - [`store`] - the file protocol layer and its cleanup rules
//! - [`liveness`] - cross-platform process liveness detection
//! - [`aggregate`] - read-only loading and grouping
//! - [`render`] - text frame and click-map engine
//! - [`terminal`] - pluggable terminal backends used to focus a session
//! - [`hook`] - write-side orchestration of one hook event
//! - [`tui`] - the interactive live view
//! - [`config`] - TOML configuration and directory resolution
//! - [`logging`] - tracing subscriber setup

use std::fmt;
use std::str::FromStr;

/// Configuration file loading and path resolution.
pub mod config;

/// Hook event classification and status transitions.
pub mod event;

/// Write-side handling of a single hook event.
pub mod hook;

/// Cross-platform process liveness detection.
pub mod liveness;

/// Logging initialization.
pub mod logging;

/// Aggregation of session files into project groups.
pub mod aggregate;

/// Text frame rendering and click correlation.
pub mod render;

/// Session record model.
pub mod session;

/// One-file-per-session storage.
pub mod store;

/// Terminal backends (tmux, Windows Terminal).
pub mod terminal;

/// Interactive terminal user interface.
pub mod tui;

pub use aggregate::{group_by_project, load_view, ProjectGroup, StatusCounts};
pub use session::{ProcessRef, Session, TerminalLocation};
pub use store::SessionStore;

/// Detail text assigned when a session's process is found dead.
pub const PROCESS_ENDED_DETAIL: &str = "Process ended";

/// Session status as recorded in a session file.
///
/// `Exited` is never produced by an event; only the liveness detector assigns
/// it. `Unknown` absorbs status strings written by newer or older emitters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Session just began.
    Starting,
    /// Agent is processing a prompt or running a tool.
    Working,
    /// Agent is blocked on the user (permission or input request).
    Waiting,
    /// Agent finished responding.
    Idle,
    /// Session ended normally.
    Ended,
    /// Process behind the session is gone.
    Exited,
    /// Unrecognized or missing status.
    #[default]
    #[serde(other)]
    Unknown,
}

impl Status {
    /// Returns `true` for states no event can leave.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Ended | Status::Exited)
    }

    /// Human label shown in the status column.
    pub fn label(self) -> &'static str {
        match self {
            Status::Starting => "Started",
            Status::Working => "Working",
            Status::Waiting => "Waiting",
            Status::Idle => "Idle",
            Status::Ended => "Ended",
            Status::Exited => "Exited",
            Status::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Starting => "starting",
            Status::Working => "working",
            Status::Waiting => "waiting",
            Status::Idle => "idle",
            Status::Ended => "ended",
            Status::Exited => "exited",
            Status::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Error type for parsing Status from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError(pub String);

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid status: {}", self.0)
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "starting" => Ok(Status::Starting),
            "working" => Ok(Status::Working),
            "waiting" => Ok(Status::Waiting),
            "idle" => Ok(Status::Idle),
            "ended" => Ok(Status::Ended),
            "exited" => Ok(Status::Exited),
            "unknown" => Ok(Status::Unknown),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests;

mod test_utils;
