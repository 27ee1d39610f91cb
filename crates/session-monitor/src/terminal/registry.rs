use super::{
    tmux, windows_terminal, TerminalBackend, TerminalEnvironment, TerminalError, TmuxBackend,
    WindowsTerminalBackend,
};
use crate::liveness::{CommandRunner, SystemRunner};
use crate::session::{Session, TerminalLocation};
use std::sync::Arc;

/// What the hook learned about its surrounding terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detection {
    /// Outer container first.
    pub locations: Vec<TerminalLocation>,
    /// Most specific non-empty title; empty when no backend reported one.
    pub title: String,
}

/// Ordered set of terminal backends, outermost first.
pub struct BackendRegistry {
    backends: Vec<Box<dyn TerminalBackend>>,
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.backends.iter().map(|b| b.name()).collect();
        f.debug_struct("BackendRegistry")
            .field("backends", &names)
            .finish()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::from_environment(&TerminalEnvironment::detect(), Arc::new(SystemRunner))
    }
}

impl BackendRegistry {
    pub fn new(backends: Vec<Box<dyn TerminalBackend>>) -> Self {
        Self { backends }
    }

    /// Windows Terminal then tmux, since tmux runs inside a tab.
    pub fn from_environment(env: &TerminalEnvironment, runner: Arc<dyn CommandRunner>) -> Self {
        Self::new(vec![
            Box::new(WindowsTerminalBackend::new(
                env.wt_session.clone(),
                Arc::clone(&runner),
            )),
            Box::new(TmuxBackend::new(
                env.tmux_pane.clone(),
                &env.platform,
                runner,
            )),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&dyn TerminalBackend> {
        self.backends
            .iter()
            .find(|b| b.name() == name)
            .map(|b| &**b)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Asks every available backend where this process runs.
    ///
    /// Backends that can only identify a focused surface are queried for a
    /// fresh id on session start or when `previous` has none for them;
    /// otherwise only their title is refreshed and the stored id is reused.
    pub fn detect(&self, previous: &[TerminalLocation], is_session_start: bool) -> Detection {
        let mut detection = Detection::default();

        for backend in self.backends.iter().filter(|b| b.available()) {
            let known = previous
                .iter()
                .find(|l| l.backend == backend.name() && !l.id.is_empty());

            let (location, title) = match known {
                Some(known) if backend.info_needs_focus() && !is_session_start => {
                    (Some(known.clone()), backend.title(&known.id))
                }
                _ => match backend.info() {
                    Some(info) => (
                        Some(TerminalLocation::new(backend.name(), info.id)),
                        info.title,
                    ),
                    None => (None, String::new()),
                },
            };

            if let Some(location) = location {
                detection.locations.push(location);
            }
            if !title.is_empty() {
                detection.title = title;
            }
        }

        tracing::debug!(
            locations = detection.locations.len(),
            title = %detection.title,
            "terminal detection"
        );
        detection
    }

    /// Focuses every recorded location of `session` in order.
    ///
    /// Locations naming a backend this registry doesn't know are skipped.
    /// The first failing select aborts the walk.
    pub fn focus(&self, session: &Session) -> Result<(), TerminalError> {
        let mut selected = 0;
        for location in &session.terminals {
            let Some(backend) = self.get(&location.backend) else {
                tracing::debug!(backend = %location.backend, "skipping unknown terminal backend");
                continue;
            };
            backend.select(&location.id)?;
            selected += 1;
        }
        if selected == 0 {
            return Err(TerminalError::NoSwitchInfo);
        }
        tracing::info!(session = %session.short_id(), selected, "focused session terminal");
        Ok(())
    }
}

/// Backend keys this build knows about.
pub const KNOWN_BACKENDS: [&str; 2] = [windows_terminal::NAME, tmux::NAME];
