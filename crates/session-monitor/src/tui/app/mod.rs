//! Application state and main event loop for the TUI.
//!
//! Manages terminal setup/teardown, panic hooks, and the core render loop.

mod update;

pub(crate) use update::Update;

use crate::aggregate::{group_by_project, ProjectGroup};
use crate::config::{schema::TuiTiming, xdg, Config, ConfigError};
use crate::liveness::{
    apply_checked, checked_processes, CheckedProcess, LivenessDetector,
};
use crate::render::{
    flash_phase, render, ClickMap, DisplayOptions, FlashPhase, RenderContext, RenderedFrame,
    FLASH_DURATION,
};
use crate::session::{project_name, Session};
use crate::store::SessionStore;
use crate::terminal::BackendRegistry;
use crate::tui::event::{handle_key_event, Action, Event, EventHandler};
use crate::tui::ui::draw;
use chrono::{DateTime, Utc};
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::{CrosstermBackend, Terminal};
use std::collections::{BTreeMap, HashMap};
use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Core application state for the TUI.
#[derive(Debug)]
pub struct App {
    /// Whether the application should exit.
    pub should_quit: bool,
    store: SessionStore,
    detector: Arc<LivenessDetector>,
    registry: Arc<BackendRegistry>,
    timing: TuiTiming,
    /// Display toggles; `interactive` is always set.
    pub options: DisplayOptions,
    /// Sessions from the last reload, grouped and annotated.
    pub groups: Vec<ProjectGroup>,
    /// Line-to-session map of the last drawn frame.
    pub click_map: ClickMap,
    /// `status|detail` per session id at the last reload.
    last_state: HashMap<String, String>,
    flash_until: HashMap<String, Instant>,
    /// Footer message with its expiry time.
    pub status_message: Option<(String, Instant)>,
    /// Session under the mouse pointer.
    pub hover: Option<String>,
    /// Latest liveness answers, applied to every reload until replaced.
    alive: HashMap<String, CheckedProcess>,
    last_liveness: Option<Instant>,
    liveness_running: bool,
    pub spinner_frame: usize,
    updates_tx: mpsc::Sender<Update>,
    updates_rx: mpsc::Receiver<Update>,
}

impl App {
    pub fn new(
        store: SessionStore,
        detector: Arc<LivenessDetector>,
        registry: Arc<BackendRegistry>,
        timing: TuiTiming,
        options: DisplayOptions,
    ) -> Self {
        let (updates_tx, updates_rx) = mpsc::channel(64);
        Self {
            should_quit: false,
            store,
            detector,
            registry,
            timing,
            options: DisplayOptions {
                interactive: true,
                ..options
            },
            groups: Vec::new(),
            click_map: ClickMap::default(),
            last_state: HashMap::new(),
            flash_until: HashMap::new(),
            status_message: None,
            hover: None,
            alive: HashMap::new(),
            last_liveness: None,
            liveness_running: false,
            spinner_frame: 0,
            updates_tx,
            updates_rx,
        }
    }

    /// Builds the app from loaded configuration with the native detector
    /// and the terminal backends found in the environment.
    pub fn from_config(config: &Config, debug: bool) -> Result<Self, ConfigError> {
        let timing = config.tui_timing()?;
        let options = DisplayOptions {
            show_summary: config.tui.show_summary,
            debug,
            interactive: true,
        };
        Ok(Self::new(
            SessionStore::new(xdg::sessions_dir(config)),
            Arc::new(LivenessDetector::native()),
            Arc::new(BackendRegistry::default()),
            timing,
            options,
        ))
    }

    /// Re-reads the session directory and flags sessions whose state changed.
    ///
    /// The cached liveness answers are applied before change detection, so a
    /// session found dead flashes once and then stays exited.
    pub fn reload(&mut self, now: Instant) {
        let mut sessions = self.store.load_all();
        apply_checked(&mut sessions, &self.alive);
        self.detect_changes(&sessions, now);
        self.groups = group_by_project(sessions);
    }

    fn detect_changes(&mut self, sessions: &[Session], now: Instant) {
        let mut seen = HashMap::with_capacity(sessions.len());
        for session in sessions {
            let state = format!("{}|{}", session.status, session.detail);
            if let Some(previous) = self.last_state.get(&session.session_id) {
                if *previous != state {
                    self.flash_until
                        .insert(session.session_id.clone(), now + FLASH_DURATION);
                }
            }
            seen.insert(session.session_id.clone(), state);
        }
        self.last_state = seen;
    }

    /// Sessions currently flashing and their visible phase.
    pub fn flashing(&self, now: Instant) -> BTreeMap<String, FlashPhase> {
        self.flash_until
            .iter()
            .filter_map(|(id, until)| flash_phase(now, *until).map(|p| (id.clone(), p)))
            .collect()
    }

    /// Whether a liveness check should start now.
    pub fn liveness_due(&self, now: Instant) -> bool {
        !self.liveness_running
            && self
                .last_liveness
                .map_or(true, |last| now.duration_since(last) >= self.timing.liveness)
    }

    /// Checks liveness off the event loop; the answer arrives as an
    /// [`Update::Liveness`].
    pub fn start_liveness_check(&mut self, now: Instant) {
        self.liveness_running = true;
        self.last_liveness = Some(now);
        let sessions = self.store.load_all();
        let detector = Arc::clone(&self.detector);
        let tx = self.updates_tx.clone();
        tokio::spawn(async move {
            let alive = tokio::task::spawn_blocking(move || check(&detector, &sessions))
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("liveness check panicked: {}", e);
                    HashMap::new()
                });
            let _ = tx.send(Update::Liveness(alive)).await;
        });
    }

    /// Animation tick: advances the spinner and drops finished flashes and
    /// expired messages.
    pub fn on_flash_tick(&mut self, now: Instant) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
        self.flash_until.retain(|_, until| now < *until);
        self.expire_status_message(now);
    }

    /// Clears the status message if its expiry time has passed.
    pub fn expire_status_message(&mut self, now: Instant) {
        if let Some((_, expiry)) = &self.status_message {
            if now >= *expiry {
                self.status_message = None;
            }
        }
    }

    pub fn set_status_message(&mut self, message: impl Into<String>, now: Instant) {
        self.status_message = Some((message.into(), now + self.timing.status_message_ttl));
    }

    /// Renders the current state and rebuilds the click map from the result.
    pub fn render_frame(&mut self, width: u16, wall: DateTime<Utc>, now: Instant) -> RenderedFrame {
        let mut ctx = RenderContext::new(width, self.options, wall);
        ctx.spinner_frame = self.spinner_frame;
        ctx.flashing = self.flashing(now);
        ctx.hover = self.hover.clone();
        ctx.status_message = self.status_message.as_ref().map(|(m, _)| m.clone());
        let frame = render(&self.groups, &ctx);
        self.click_map = ClickMap::build(&frame);
        frame
    }

    pub fn session(&self, session_id: &str) -> Option<&Session> {
        self.groups
            .iter()
            .flat_map(|g| g.sessions.iter())
            .find(|s| s.session_id == session_id)
    }

    /// Tracks hover on every mouse event; a left click on a session row
    /// requests a focus.
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Action {
        self.hover = self
            .click_map
            .resolve(mouse.row as usize)
            .map(str::to_string);
        match (mouse.kind, &self.hover) {
            (MouseEventKind::Down(MouseButton::Left), Some(id)) => Action::Focus(id.clone()),
            _ => Action::None,
        }
    }

    /// Focuses the session's terminal off the event loop; the result arrives
    /// as an [`Update::Focused`].
    pub fn begin_focus(&mut self, session_id: &str, now: Instant) {
        let Some(session) = self.session(session_id).cloned() else {
            return;
        };
        let project = project_name(&session.project);
        self.set_status_message(format!("Switching to {}...", project), now);

        let registry = Arc::clone(&self.registry);
        let tx = self.updates_tx.clone();
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || {
                registry.focus(&session).map_err(|e| e.to_string())
            })
            .await
            .unwrap_or_else(|e| Err(e.to_string()));
            let _ = tx.send(Update::Focused { project, result }).await;
        });
    }

    fn copy_session_id(&mut self, session_id: &str, now: Instant) {
        let message = match arboard::Clipboard::new() {
            Ok(mut clipboard) => match clipboard.set_text(session_id) {
                Ok(()) => {
                    tracing::debug!("copied session ID to clipboard: {}", session_id);
                    "Copied session ID".to_string()
                }
                Err(e) => {
                    tracing::warn!("failed to copy to clipboard: {}", e);
                    format!("Copy failed: {}", e)
                }
            },
            Err(e) => {
                tracing::warn!("failed to initialize clipboard: {}", e);
                format!("Clipboard init failed: {}", e)
            }
        };
        self.set_status_message(message, now);
    }

    /// Applies every update that has arrived since the last call.
    pub fn drain_updates(&mut self, now: Instant) {
        while let Ok(update) = self.updates_rx.try_recv() {
            self.apply_update(update, now);
        }
    }

    fn perform(&mut self, action: Action, now: Instant) {
        match action {
            Action::None => {}
            Action::Quit => self.should_quit = true,
            Action::Focus(id) => self.begin_focus(&id, now),
            Action::CopySessionId(id) => self.copy_session_id(&id, now),
        }
    }

    /// Runs the TUI application: sets up terminal, enters event loop, restores on exit.
    pub async fn run(&mut self) -> io::Result<()> {
        // Install panic hook that restores terminal before printing panic info
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = restore_terminal();
            original_hook(panic_info);
        }));

        setup_terminal()?;

        let result = self.event_loop().await;

        restore_terminal()?;
        result
    }

    /// First liveness answer, awaited so the first frame already shows
    /// exited sessions.
    async fn initial_liveness(&mut self) {
        let sessions = self.store.load_all();
        let detector = Arc::clone(&self.detector);
        match tokio::task::spawn_blocking(move || check(&detector, &sessions)).await {
            Ok(alive) => self.alive = alive,
            Err(e) => tracing::warn!("liveness check panicked: {}", e),
        }
        self.last_liveness = Some(Instant::now());
    }

    /// Main event loop: renders UI and processes events.
    async fn event_loop(&mut self) -> io::Result<()> {
        let backend = CrosstermBackend::new(stdout());
        let mut terminal = Terminal::new(backend)?;
        let mut events = EventHandler::new(self.timing.refresh, self.timing.flash);
        let mut reader = EventStream::new();

        self.initial_liveness().await;
        self.reload(Instant::now());

        loop {
            self.drain_updates(Instant::now());
            terminal.draw(|frame| draw(frame, self))?;

            let event = events.next(&mut reader).await?;
            let now = Instant::now();
            match event {
                Event::Key(key) => {
                    let action = handle_key_event(self, key);
                    self.perform(action, now);
                }
                Event::Mouse(mouse) => {
                    let action = self.handle_mouse_event(mouse);
                    self.perform(action, now);
                }
                Event::Resize(_, _) => {}
                Event::Refresh => {
                    self.reload(now);
                    if self.liveness_due(now) {
                        self.start_liveness_check(now);
                    }
                }
                Event::Flash => self.on_flash_tick(now),
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }
}

/// Runs one liveness check, remembering which process each answer is about.
fn check(detector: &LivenessDetector, sessions: &[Session]) -> HashMap<String, CheckedProcess> {
    checked_processes(sessions, &detector.detect(sessions))
}

/// Enables raw mode and switches to the alternate screen.
fn setup_terminal() -> io::Result<()> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    Ok(())
}

/// Restores the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

#[cfg(test)]
mod tests;
