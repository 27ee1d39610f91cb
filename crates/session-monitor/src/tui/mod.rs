//! Interactive live view.
//!
//! Built on ratatui and crossterm. The view re-reads the session directory
//! on a slow timer, animates spinners and change highlights on a fast one,
//! and focuses a session's terminal when its rows are clicked.

pub mod app;
pub mod event;
pub mod ui;

mod test_utils;

pub use app::App;
