//! Write side: turns one hook event into a session file update.
//!
//! The hook is short-lived and must never block the agent, so every
//! best-effort step (cleanup, terminal lookup, pid discovery) degrades to a
//! default instead of failing. Only an unusable store or input is an error.

use crate::event::{transition, HookEvent, HookInput};
use crate::liveness::{find_agent_pid, NativeProbe, ProcessProbe};
use crate::session::{current_platform, format_timestamp, Session, TerminalLocation};
use crate::store::{SessionStore, StoreError};
use crate::terminal::{merge_locations, BackendRegistry, Detection};
use chrono::{DateTime, Utc};
use std::io::Read;

/// Errors that stop the hook from recording an event.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("failed to read hook input: {0}")]
    Read(#[source] std::io::Error),

    #[error("invalid hook input: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("hook input has no session_id")]
    MissingSessionId,

    #[error("invalid session_id: {0:?}")]
    InvalidSessionId(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What [`handle_event`] did with the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// The session ended and its file was deleted.
    Removed,
    /// The event does not change any record.
    Ignored,
    /// The record was written with this content.
    Written(Session),
}

/// Facts about the hook's surroundings.
///
/// [`HookEnv`] answers from the real system; tests pin every answer.
pub trait HookContext {
    /// Platform tag stamped on written records.
    fn platform(&self) -> &str;

    fn probe(&self) -> &dyn ProcessProbe;

    fn now(&self) -> DateTime<Utc>;

    /// Pid of the agent process, `0` when unknown.
    fn agent_pid(&self) -> i64;

    fn detect_terminal(&self, previous: &[TerminalLocation], is_session_start: bool) -> Detection;
}

/// [`HookContext`] for the running process.
#[derive(Debug)]
pub struct HookEnv {
    platform: String,
    probe: NativeProbe,
    registry: BackendRegistry,
}

impl Default for HookEnv {
    fn default() -> Self {
        Self {
            platform: current_platform().to_string(),
            probe: NativeProbe,
            registry: BackendRegistry::default(),
        }
    }
}

impl HookContext for HookEnv {
    fn platform(&self) -> &str {
        &self.platform
    }

    fn probe(&self) -> &dyn ProcessProbe {
        &self.probe
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn agent_pid(&self) -> i64 {
        find_agent_pid()
    }

    fn detect_terminal(&self, previous: &[TerminalLocation], is_session_start: bool) -> Detection {
        self.registry.detect(previous, is_session_start)
    }
}

/// Reads and parses one event from `reader`.
pub fn read_input(mut reader: impl Read) -> Result<HookInput, HookError> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw).map_err(HookError::Read)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Applies one event to the store.
///
/// Session end sweeps dead records and deletes the session's own file.
/// Session start sweeps dead records too, then records a fresh session that
/// inherits nothing from an earlier file with the same id. Every other
/// recognized event updates the record, keeping the last prompt, terminal
/// locations, title and pid when the event brings no fresh value. Records
/// left behind by the same agent process under another id are removed
/// before the write.
pub fn handle_event(
    store: &SessionStore,
    input: &HookInput,
    ctx: &impl HookContext,
) -> Result<HookOutcome, HookError> {
    if input.session_id.is_empty() {
        return Err(HookError::MissingSessionId);
    }
    if !SessionStore::is_valid_id(&input.session_id) {
        return Err(HookError::InvalidSessionId(input.session_id.clone()));
    }
    store.ensure_dir()?;

    let event = input.event();
    let is_start = event == HookEvent::SessionStart;

    match event {
        HookEvent::SessionEnd => {
            sweep_dead(store, ctx);
            store.remove(&input.session_id)?;
            tracing::debug!(session_id = %input.session_id, "session ended");
            return Ok(HookOutcome::Removed);
        }
        HookEvent::SessionStart => sweep_dead(store, ctx),
        _ => {}
    }

    let previous = if is_start {
        None
    } else {
        store.load(&input.session_id)
    };

    let Some((status, detail)) =
        transition(&event, input, previous.as_ref().map(|p| p.detail.as_str()))
    else {
        tracing::debug!(event = %event, "event ignored");
        return Ok(HookOutcome::Ignored);
    };

    let previous = previous.unwrap_or_default();
    let detection = ctx.detect_terminal(&previous.terminals, is_start);

    let mut session = Session::new(input.session_id.clone(), input.cwd.clone());
    if session.project.is_empty() {
        session.project = previous.project;
    }
    session.status = status;
    session.detail = detail;
    session.last_prompt = match event {
        HookEvent::UserPromptSubmit => input.prompt.clone(),
        _ => previous.last_prompt,
    };
    session.notification_type =
        Some(input.notification_type.clone()).filter(|kind| !kind.is_empty());
    session.last_activity = format_timestamp(ctx.now());
    session.terminals = merge_locations(&previous.terminals, &detection.locations);
    session.summary = if detection.title.is_empty() {
        previous.summary
    } else {
        detection.title
    };
    session.os = ctx.platform().to_string();
    session.pid = match ctx.agent_pid() {
        0 => previous.pid,
        pid => pid,
    };

    if let Some(process) = session.process() {
        let removed = store.remove_duplicates(&session.session_id, &process);
        if !removed.is_empty() {
            tracing::debug!(?removed, "replaced records of the same process");
        }
    }

    store.write(&session)?;
    Ok(HookOutcome::Written(session))
}

fn sweep_dead(store: &SessionStore, ctx: &impl HookContext) {
    let removed = store.remove_dead(ctx.probe(), ctx.platform());
    if !removed.is_empty() {
        tracing::debug!(?removed, "removed sessions of dead processes");
    }
}

#[cfg(test)]
mod tests;
