//! Terminal backends used to focus the tab or pane that owns a session.
//!
//! Each backend is an independent unit behind [`TerminalBackend`]. The hook
//! asks the available backends where it is running and stores the answer as
//! an ordered list of [`TerminalLocation`]s (outer container first); the
//! viewer later walks that list through [`BackendRegistry::focus`].

pub mod environment;
pub mod registry;
pub mod tmux;
pub mod windows_terminal;

pub use environment::TerminalEnvironment;
pub use registry::{BackendRegistry, Detection};
pub use tmux::TmuxBackend;
pub use windows_terminal::WindowsTerminalBackend;

use crate::liveness::{CommandOutput, CommandRunner};
use crate::session::TerminalLocation;
use std::io;

/// Errors raised while talking to a terminal backend.
#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error("no switching info available")]
    NoSwitchInfo,

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} failed: {stderr}")]
    Failed { program: String, stderr: String },

    #[error("invalid {backend} id: {id:?}")]
    InvalidId { backend: &'static str, id: String },
}

/// Tab or pane discovered by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalInfo {
    pub id: String,
    /// Title with the agent's status glyph removed; may be empty.
    pub title: String,
}

/// Operations every terminal backend provides.
pub trait TerminalBackend: Send + Sync {
    /// Key stored in [`TerminalLocation::backend`].
    fn name(&self) -> &'static str;

    /// Whether the current process runs inside this terminal.
    fn available(&self) -> bool;

    /// Discovers the active tab or pane.
    fn info(&self) -> Option<TerminalInfo>;

    /// Current title of a known id; empty when it cannot be read.
    fn title(&self, id: &str) -> String;

    /// Moves focus to `id`.
    fn select(&self, id: &str) -> Result<(), TerminalError>;

    /// `true` when [`info`](Self::info) only identifies the right surface
    /// while it has focus, so later events should refresh the title only.
    fn info_needs_focus(&self) -> bool {
        false
    }
}

/// Removes leading glyphs up to the first letter or digit.
///
/// The agent prefixes titles with a status glyph whose exact character
/// varies by platform and encoding.
pub fn strip_title_prefix(title: &str) -> &str {
    match title.char_indices().find(|(_, c)| c.is_alphanumeric()) {
        Some((idx, _)) => &title[idx..],
        None => title,
    }
}

/// Folds freshly detected locations into an existing list.
///
/// Backends present in `fresh` get their id replaced in place; new backends
/// are appended. Existing entries without fresh info are kept, since a
/// backend lookup may fail transiently.
pub fn merge_locations(
    existing: &[TerminalLocation],
    fresh: &[TerminalLocation],
) -> Vec<TerminalLocation> {
    let mut merged = existing.to_vec();
    for loc in fresh {
        match merged.iter_mut().find(|m| m.backend == loc.backend) {
            Some(slot) => slot.id = loc.id.clone(),
            None => merged.push(loc.clone()),
        }
    }
    merged
}

/// Runs `program`, turning spawn failures and non-zero exits into errors.
pub(crate) fn run_checked(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[String],
) -> Result<CommandOutput, TerminalError> {
    let output = runner
        .run(program, args)
        .map_err(|source| TerminalError::Spawn {
            program: program.to_string(),
            source,
        })?;
    if !output.success {
        return Err(TerminalError::Failed {
            program: program.to_string(),
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output)
}
