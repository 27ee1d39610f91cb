//! Session record model.
//!
//! A [`Session`] is the last-known state of one instrumented agent process,
//! serialized as one JSON file per session id. Every field defaults so files
//! written by older emitters still parse.

use crate::{Status, PROCESS_ENDED_DETAIL};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque `(backend, id)` pair identifying a focusable terminal surface.
///
/// Order within a session's list matters: outer containers (a terminal tab)
/// come before inner panes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalLocation {
    pub backend: String,
    pub id: String,
}

impl TerminalLocation {
    pub fn new(backend: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            id: id.into(),
        }
    }
}

/// A process id scoped by the platform that issued it.
///
/// Numeric pids are only comparable within one platform; a Linux pid 1234
/// inside WSL says nothing about Windows pid 1234.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessRef {
    pub platform: String,
    pub pid: i64,
}

impl ProcessRef {
    pub fn new(platform: impl Into<String>, pid: i64) -> Self {
        Self {
            platform: platform.into(),
            pid,
        }
    }

    /// Returns `true` when both refs name the same process.
    ///
    /// An empty platform tag is a legacy record and counts as the local
    /// platform.
    pub fn same_process(&self, other: &ProcessRef) -> bool {
        self.pid > 0 && self.pid == other.pid && self.resolved() == other.resolved()
    }

    /// Returns `true` if this process was issued by `platform`. Untagged
    /// refs belong to whichever platform is asking.
    pub fn is_on(&self, platform: &str) -> bool {
        self.platform.is_empty() || self.platform == platform
    }

    fn resolved(&self) -> &str {
        if self.platform.is_empty() {
            current_platform()
        } else {
            &self.platform
        }
    }
}

/// One instrumented process's last-known state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub session_id: String,
    pub project: String,
    pub status: Status,
    pub detail: String,
    pub last_prompt: String,
    pub notification_type: Option<String>,
    /// RFC 3339 UTC timestamp of the last write.
    pub last_activity: String,
    pub terminals: Vec<TerminalLocation>,
    /// Terminal tab or pane title captured at the last write.
    pub summary: String,
    /// Platform tag of the emitter (`linux`, `windows`, `macos`, ...).
    pub os: String,
    pub pid: i64,
}

impl Session {
    /// Creates an empty record for `session_id` in `project`.
    pub fn new(session_id: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            project: project.into(),
            ..Self::default()
        }
    }

    /// Returns the platform-scoped process reference, or `None` when the pid
    /// is unknown.
    pub fn process(&self) -> Option<ProcessRef> {
        if self.pid <= 0 {
            return None;
        }
        Some(ProcessRef::new(self.os.clone(), self.pid))
    }

    /// Marks the record as belonging to a dead process.
    pub fn mark_exited(&mut self) {
        self.status = Status::Exited;
        self.detail = PROCESS_ENDED_DETAIL.to_string();
    }

    /// Returns the id of the recorded location for `backend`, if any.
    pub fn location(&self, backend: &str) -> Option<&str> {
        self.terminals
            .iter()
            .find(|loc| loc.backend == backend)
            .map(|loc| loc.id.as_str())
    }

    /// First eight characters of the session id.
    pub fn short_id(&self) -> &str {
        match self.session_id.char_indices().nth(8) {
            Some((idx, _)) => &self.session_id[..idx],
            None => &self.session_id,
        }
    }
}

/// Formats `time` the way session files store it.
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Returns a short human-readable age of `timestamp` relative to `now`.
///
/// Unparsable timestamps yield `"?"`. Timestamps in the future count as now.
pub fn time_since(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(then) = DateTime::parse_from_rfc3339(timestamp) else {
        return "?".to_string();
    };
    let secs = (now - then.with_timezone(&Utc)).num_seconds();
    match secs {
        s if s < 1 => "now".to_string(),
        s if s < 60 => format!("{}s ago", s),
        s if s < 3600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3600),
        s => format!("{}d ago", s / 86_400),
    }
}

/// Last path component of a project path, or the path itself when it has none.
pub fn project_name(project: &str) -> String {
    std::path::Path::new(project)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| project.to_string())
}

/// Platform tag of the running process.
pub fn current_platform() -> &'static str {
    std::env::consts::OS
}
