//! tmux panes.

use super::{run_checked, strip_title_prefix, TerminalBackend, TerminalError, TerminalInfo};
use crate::liveness::CommandRunner;
use std::sync::Arc;

/// Backend key for tmux panes.
pub const NAME: &str = "tmux";

/// Focuses tmux panes by pane id (`%12`).
///
/// When the viewer runs on Windows, tmux lives inside WSL and every call
/// goes through `wsl`.
pub struct TmuxBackend {
    pane: Option<String>,
    via_wsl: bool,
    runner: Arc<dyn CommandRunner>,
}

impl TmuxBackend {
    pub fn new(pane: Option<String>, host_platform: &str, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            pane,
            via_wsl: host_platform == "windows",
            runner,
        }
    }

    /// Program and leading arguments for invoking tmux.
    fn command(&self, args: &[&str]) -> (&'static str, Vec<String>) {
        let args = args.iter().map(|a| a.to_string());
        if self.via_wsl {
            ("wsl", std::iter::once(NAME.to_string()).chain(args).collect())
        } else {
            (NAME, args.collect())
        }
    }
}

impl TerminalBackend for TmuxBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn available(&self) -> bool {
        self.pane.is_some()
    }

    fn info(&self) -> Option<TerminalInfo> {
        let pane = self.pane.as_ref()?;
        Some(TerminalInfo {
            id: pane.clone(),
            title: self.title(pane),
        })
    }

    fn title(&self, id: &str) -> String {
        if id.is_empty() {
            return String::new();
        }
        let (program, args) = self.command(&["display-message", "-p", "-t", id, "#{pane_title}"]);
        match run_checked(self.runner.as_ref(), program, &args) {
            Ok(out) => strip_title_prefix(out.stdout.trim()).to_string(),
            Err(e) => {
                tracing::debug!("tmux title lookup failed: {}", e);
                String::new()
            }
        }
    }

    fn select(&self, id: &str) -> Result<(), TerminalError> {
        if id.is_empty() {
            return Err(TerminalError::InvalidId {
                backend: NAME,
                id: id.to_string(),
            });
        }
        let (program, args) = self.command(&["select-pane", "-t", id]);
        run_checked(self.runner.as_ref(), program, &args)?;
        Ok(())
    }
}
