//! Event handling for the TUI.
//!
//! Merges crossterm input with two timers: a slow refresh that re-reads the
//! session directory and a fast tick that drives the spinner and flashes.

use crate::tui::app::App;
use crossterm::event::{
    Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseEvent,
};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Application-level event variants.
#[derive(Debug, Clone, Copy)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// Time to re-read the session directory.
    Refresh,
    /// Animation tick.
    Flash,
}

/// Event source combining terminal input and both timers.
///
/// Must be created inside a tokio runtime.
pub struct EventHandler {
    refresh: Interval,
    flash: Interval,
}

impl EventHandler {
    pub fn new(refresh_rate: Duration, flash_rate: Duration) -> Self {
        let mut refresh = interval(refresh_rate);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut flash = interval(flash_rate);
        flash.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { refresh, flash }
    }

    pub fn refresh_period(&self) -> Duration {
        self.refresh.period()
    }

    pub fn flash_period(&self) -> Duration {
        self.flash.period()
    }

    /// Waits for the next terminal event or timer tick.
    pub async fn next(&mut self, reader: &mut EventStream) -> std::io::Result<Event> {
        loop {
            tokio::select! {
                maybe_event = reader.next() => {
                    match maybe_event {
                        Some(Ok(CrosstermEvent::Key(key))) => return Ok(Event::Key(key)),
                        Some(Ok(CrosstermEvent::Mouse(mouse))) => return Ok(Event::Mouse(mouse)),
                        Some(Ok(CrosstermEvent::Resize(w, h))) => return Ok(Event::Resize(w, h)),
                        Some(Err(e)) => return Err(e),
                        // Ignore focus, paste events
                        Some(Ok(_)) => continue,
                        None => return Err(std::io::Error::new(
                            std::io::ErrorKind::UnexpectedEof,
                            "event stream ended",
                        )),
                    }
                }
                _ = self.refresh.tick() => return Ok(Event::Refresh),
                _ = self.flash.tick() => return Ok(Event::Flash),
            }
        }
    }
}

/// Side effect requested by an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    /// Focus the terminal of the session with this id.
    Focus(String),
    /// Copy this session id to the clipboard.
    CopySessionId(String),
}

/// Handles a key event, applying view toggles directly.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Action {
    if key.kind == KeyEventKind::Release {
        return Action::None;
    }
    if should_quit(key) {
        return Action::Quit;
    }
    match key.code {
        KeyCode::Char('p') => {
            app.options.show_summary = !app.options.show_summary;
            Action::None
        }
        KeyCode::Char('d') => {
            app.options.debug = !app.options.debug;
            Action::None
        }
        KeyCode::Char('c') => match &app.hover {
            Some(id) => Action::CopySessionId(id.clone()),
            None => Action::None,
        },
        _ => Action::None,
    }
}

/// Returns true if the key event should trigger application quit.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q'))
        || (key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')))
}

#[cfg(test)]
mod tests;
