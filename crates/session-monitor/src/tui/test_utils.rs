//! Shared test utilities for TUI testing with ratatui TestBackend.

#![cfg(test)]

use crate::config::schema::TuiTiming;
use crate::liveness::LivenessDetector;
use crate::render::DisplayOptions;
use crate::store::SessionStore;
use crate::terminal::BackendRegistry;
use crate::test_utils::{FixedProbe, ScriptedRunner};
use crate::tui::app::App;
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Creates a Terminal with TestBackend at the specified dimensions.
pub fn test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
    let backend = TestBackend::new(width, height);
    Terminal::new(backend).expect("failed to create test terminal")
}

/// Extracts all text from a specific row in the buffer as a single String.
pub fn row_text(buffer: &Buffer, row: u16) -> String {
    let area = buffer.area();
    if row >= area.height {
        return String::new();
    }
    (0..area.width)
        .map(|col| {
            buffer
                .cell((col, row))
                .map(|cell| cell.symbol())
                .unwrap_or(" ")
        })
        .collect()
}

/// Finds the first row index that contains the given text, or None if not found.
pub fn find_row_with_text(buffer: &Buffer, text: &str) -> Option<u16> {
    (0..buffer.area().height).find(|row| row_text(buffer, *row).contains(text))
}

pub fn test_timing() -> TuiTiming {
    TuiTiming {
        refresh: Duration::from_secs(1),
        flash: Duration::from_millis(100),
        liveness: Duration::from_secs(10),
        status_message_ttl: Duration::from_secs(3),
    }
}

/// App over `dir` with no terminal backends, where only `alive` pids run.
pub fn make_app(dir: &Path, alive: &[i64]) -> App {
    let (runner, _) = ScriptedRunner::new();
    let detector = LivenessDetector::new(
        "linux",
        Box::new(FixedProbe::alive(alive)),
        Box::new(runner),
    );
    App::new(
        SessionStore::new(dir),
        Arc::new(detector),
        Arc::new(BackendRegistry::new(Vec::new())),
        test_timing(),
        DisplayOptions::default(),
    )
}
