//! Hook event classification and the session status state machine.
//!
//! Everything here is pure: an incoming [`HookInput`] plus the previous
//! record's detail decide the next `(Status, detail)` pair. File handling
//! lives in [`crate::hook`].

use crate::Status;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Maximum characters of a shell command kept in a tool detail.
const COMMAND_BUDGET: usize = 80;

/// Notification kinds that put a session into `waiting`.
const ACTIONABLE_NOTIFICATIONS: &[&str] = &["permission_prompt", "elicitation_dialog"];

/// JSON payload delivered on the hook's stdin.
///
/// Only fields we need are declared; unknown fields are silently ignored
/// so future agent versions don't break us.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HookInput {
    pub session_id: String,
    pub cwd: String,
    pub hook_event_name: String,
    pub tool_name: String,
    pub tool_input: Option<serde_json::Value>,
    pub notification_type: String,
    pub prompt: String,
    pub message: String,
    pub title: String,
    pub source: String,
}

impl HookInput {
    pub fn event(&self) -> HookEvent {
        HookEvent::from_name(&self.hook_event_name)
    }
}

/// Lifecycle events the monitor understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    SessionStart,
    SessionEnd,
    UserPromptSubmit,
    PreToolUse,
    PostToolUse,
    Notification,
    Stop,
    /// Anything else; always a no-op.
    Other(String),
}

impl HookEvent {
    pub fn from_name(name: &str) -> Self {
        match name {
            "SessionStart" => HookEvent::SessionStart,
            "SessionEnd" => HookEvent::SessionEnd,
            "UserPromptSubmit" => HookEvent::UserPromptSubmit,
            "PreToolUse" => HookEvent::PreToolUse,
            "PostToolUse" => HookEvent::PostToolUse,
            "Notification" => HookEvent::Notification,
            "Stop" => HookEvent::Stop,
            other => HookEvent::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HookEvent::SessionStart => "SessionStart",
            HookEvent::SessionEnd => "SessionEnd",
            HookEvent::UserPromptSubmit => "UserPromptSubmit",
            HookEvent::PreToolUse => "PreToolUse",
            HookEvent::PostToolUse => "PostToolUse",
            HookEvent::Notification => "Notification",
            HookEvent::Stop => "Stop",
            HookEvent::Other(name) => name,
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns `true` for notification kinds that need the user's attention.
///
/// Everything else (idle pings, auth notices) must leave the record alone.
pub fn is_actionable_notification(kind: &str) -> bool {
    ACTIONABLE_NOTIFICATIONS.contains(&kind)
}

/// Derives a short description of a tool call from its name and input.
pub fn tool_detail(tool: &str, input: Option<&serde_json::Value>) -> String {
    let field = |key: &str| str_field(input, key);

    match tool {
        "Bash" => match field("command") {
            "" => tool.to_string(),
            cmd => format!("Bash: {}", truncate_chars(cmd, COMMAND_BUDGET)),
        },
        "Edit" | "Write" | "Read" => match field("file_path") {
            "" => tool.to_string(),
            path => {
                let base = Path::new(path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.to_string());
                format!("{} {}", tool, base)
            }
        },
        "Glob" | "Grep" => match field("pattern") {
            "" => tool.to_string(),
            pattern => format!("{} {}", tool, pattern),
        },
        "Task" => match field("description") {
            "" => tool.to_string(),
            desc => format!("Task: {}", desc),
        },
        _ => tool.to_string(),
    }
}

fn str_field<'a>(input: Option<&'a serde_json::Value>, key: &str) -> &'a str {
    input
        .and_then(|v| v.get(key))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

/// Detail shown while a session waits on the user.
pub fn notification_detail(title: &str, message: &str) -> String {
    if !title.is_empty() {
        title.to_string()
    } else if !message.is_empty() {
        message.to_string()
    } else {
        "Awaiting response".to_string()
    }
}

/// Computes the status and detail a record moves to on `event`.
///
/// Returns `None` when the event must not touch the record: session end
/// (handled as a deletion), non-actionable notifications, and unrecognized
/// event names. On prompt submission the previous detail is carried over
/// and only replaced when there is none.
pub fn transition(
    event: &HookEvent,
    input: &HookInput,
    previous_detail: Option<&str>,
) -> Option<(Status, String)> {
    match event {
        HookEvent::SessionStart => Some((Status::Starting, "Session started".to_string())),
        HookEvent::UserPromptSubmit => {
            let detail = match previous_detail {
                Some(d) if !d.is_empty() => d.to_string(),
                _ => "Processing prompt...".to_string(),
            };
            Some((Status::Working, detail))
        }
        HookEvent::PreToolUse => Some((
            Status::Working,
            tool_detail(&input.tool_name, input.tool_input.as_ref()),
        )),
        HookEvent::PostToolUse => Some((
            Status::Working,
            format!("Finished {}, continuing...", input.tool_name),
        )),
        HookEvent::Notification => {
            if !is_actionable_notification(&input.notification_type) {
                return None;
            }
            Some((
                Status::Waiting,
                notification_detail(&input.title, &input.message),
            ))
        }
        HookEvent::Stop => Some((Status::Idle, "Finished responding".to_string())),
        HookEvent::SessionEnd | HookEvent::Other(_) => None,
    }
}

/// Keeps at most `max` characters of `s`.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
