//! Draws the current frame into the terminal.

use crate::tui::app::App;
use chrono::Utc;
use ratatui::{widgets::Paragraph, Frame};
use std::time::Instant;

/// Renders the session view over the whole terminal area.
///
/// Rendering also rebuilds `app.click_map`, so mouse rows always resolve
/// against what is on screen.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let rendered = app.render_frame(area.width, Utc::now(), Instant::now());
    frame.render_widget(Paragraph::new(rendered.lines), area);
}
