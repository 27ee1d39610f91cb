//! Text frame rendering for the session view.
//!
//! [`render`] is a pure function of the grouped sessions and a
//! [`RenderContext`]; the same input always yields the same lines. The live
//! view and the one-shot snapshot share it.
//!
//! Frame layout:
//!
//! ```text
//! session-monitor  2 projects, 3 sessions
//!
//! ● 1 working  ○ 2 idle
//!
//! ╭──────────────────────────────────────╮
//! │ api/ /home/me/api                    │
//! │ │                                    │
//! │ ├─ "fix the flaky test"              │
//! │ │  ⠋ Working     Bash: cargo test  now │
//! │ └─ (no description)                  │
//! │    ○ Idle        Finished ...  3m ago │
//! ╰──────────────────────────────────────╯
//! ```
//!
//! Pointer input is correlated through [`ClickMap`], which re-scans the
//! emitted text for tree connectors instead of tracking coordinates here.

mod click_map;

pub use click_map::ClickMap;

use crate::aggregate::{ProjectGroup, StatusCounts};
use crate::event::truncate_chars;
use crate::session::{project_name, time_since, Session};
use crate::Status;
use chrono::{DateTime, Utc};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Heading shown on the first line of every frame.
pub const TITLE: &str = "session-monitor";

/// Body of a frame with no sessions.
pub const EMPTY_MESSAGE: &str = "No active sessions.";

/// Help line appended in interactive mode.
pub const HELP_TEXT: &str = "Press q to quit. Click a session to focus its terminal.";

/// How long a changed row flashes.
pub const FLASH_DURATION: Duration = Duration::from_secs(2);

/// Interval between flash on/off toggles.
pub const FLASH_TOGGLE: Duration = Duration::from_millis(150);

/// Tree connector for every session row but the last in a group.
pub const CONNECTOR_MID: &str = "├─";

/// Tree connector for the last session row in a group.
pub const CONNECTOR_LAST: &str = "└─";

const DEFAULT_WIDTH: u16 = 80;
const MIN_BOX_WIDTH: usize = 12;
const STATUS_MIN_WIDTH: usize = 12;
const DETAIL_BUDGET: usize = 40;
const PROMPT_BUDGET: usize = 70;

/// Tab title the agent sets by default; carries no information.
const DEFAULT_TAB_TITLE: &str = "Claude Code";

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Display toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Prefer the terminal title over the last prompt as the row subtitle.
    pub show_summary: bool,
    /// Append `(short id:pid)` to each row.
    pub debug: bool,
    /// Append the status message and help line.
    pub interactive: bool,
}

/// Visible half of a flash cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashPhase {
    On,
    Off,
}

/// Returns the flash phase at `now` for a flash ending at `until`, or `None`
/// once it has expired.
pub fn flash_phase(now: Instant, until: Instant) -> Option<FlashPhase> {
    let remaining = until.checked_duration_since(now)?;
    if remaining.is_zero() {
        return None;
    }
    let elapsed = FLASH_DURATION.saturating_sub(remaining);
    let cycle = elapsed.as_millis() / FLASH_TOGGLE.as_millis();
    if cycle % 2 == 0 {
        Some(FlashPhase::On)
    } else {
        Some(FlashPhase::Off)
    }
}

/// Everything besides the sessions that shapes a frame.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Terminal width in cells; `0` means 80.
    pub width: u16,
    pub options: DisplayOptions,
    /// Reference time for the elapsed column.
    pub now: DateTime<Utc>,
    pub spinner_frame: usize,
    /// Sessions currently flashing, by id.
    pub flashing: BTreeMap<String, FlashPhase>,
    /// Session under the pointer.
    pub hover: Option<String>,
    /// Transient message shown above the help line.
    pub status_message: Option<String>,
}

impl RenderContext {
    pub fn new(width: u16, options: DisplayOptions, now: DateTime<Utc>) -> Self {
        Self {
            width,
            options,
            now,
            spinner_frame: 0,
            flashing: BTreeMap::new(),
            hover: None,
            status_message: None,
        }
    }

    fn effective_width(&self) -> usize {
        if self.width == 0 {
            DEFAULT_WIDTH as usize
        } else {
            self.width as usize
        }
    }
}

/// A rendered frame plus the session ids in the order they were drawn.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderedFrame {
    pub lines: Vec<Line<'static>>,
    pub order: Vec<String>,
}

impl RenderedFrame {
    /// Lines with styling stripped.
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines.iter().map(line_text).collect()
    }

    pub fn to_plain_text(&self) -> String {
        self.plain_lines().join("\n")
    }
}

pub(crate) fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

/// Renders `groups` into a frame.
pub fn render(groups: &[ProjectGroup], ctx: &RenderContext) -> RenderedFrame {
    let width = ctx.effective_width();
    let total: usize = groups.iter().map(|g| g.sessions.len()).sum();
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut order = Vec::with_capacity(total);

    if total == 0 {
        lines.push(Line::from(Span::styled(TITLE, title_style())));
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(EMPTY_MESSAGE, dim())));
        if ctx.options.interactive {
            push_footer(&mut lines, ctx);
        }
        return RenderedFrame {
            lines: clip_all(lines, width),
            order,
        };
    }

    let groups: Vec<&ProjectGroup> = groups.iter().filter(|g| !g.sessions.is_empty()).collect();

    lines.push(Line::from(vec![
        Span::styled(TITLE, title_style()),
        Span::raw("  "),
        Span::styled(
            format!("{} projects, {} sessions", groups.len(), total),
            dim(),
        ),
    ]));
    lines.push(Line::default());
    lines.push(summary_bar(StatusCounts::from_sessions(
        groups.iter().flat_map(|g| g.sessions.iter()),
    )));

    let rows: Vec<Vec<Row>> = groups
        .iter()
        .map(|g| {
            let last = g.sessions.len().saturating_sub(1);
            g.sessions
                .iter()
                .enumerate()
                .map(|(i, s)| Row::new(s, i == last, ctx))
                .collect()
        })
        .collect();
    let columns = Columns::measure(rows.iter().flatten());

    let box_width = width.saturating_sub(2).max(MIN_BOX_WIDTH);
    let inner = box_width - 4;

    for (group, rows) in groups.iter().zip(&rows) {
        lines.push(Line::default());
        lines.push(border_line('╭', '╮', box_width));
        lines.push(boxed(group_title(&group.project), inner));
        lines.push(boxed(Line::from(Span::styled("│", dim())), inner));
        for row in rows {
            let (identity, status) = row.lines(&columns, ctx);
            lines.push(boxed(identity, inner));
            lines.push(boxed(status, inner));
            order.push(row.session.session_id.clone());
        }
        lines.push(border_line('╰', '╯', box_width));
    }

    if ctx.options.interactive {
        push_footer(&mut lines, ctx);
    }

    RenderedFrame {
        lines: clip_all(lines, width),
        order,
    }
}

fn push_footer(lines: &mut Vec<Line<'static>>, ctx: &RenderContext) {
    lines.push(Line::default());
    if let Some(msg) = &ctx.status_message {
        lines.push(Line::from(Span::styled(
            single_line(msg),
            Style::default().fg(Color::Cyan),
        )));
    }
    lines.push(Line::from(Span::styled(HELP_TEXT, dim())));
}

fn summary_bar(counts: StatusCounts) -> Line<'static> {
    let parts = [
        (counts.working, "●", "working", Status::Working),
        (counts.waiting, "◆", "waiting", Status::Waiting),
        (counts.idle, "○", "idle", Status::Idle),
        (counts.starting, "◌", "starting", Status::Starting),
        (counts.exited, "✕", "exited", Status::Exited),
    ];

    let mut spans = Vec::new();
    for (n, glyph, label, status) in parts {
        if n == 0 {
            continue;
        }
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("{} {} {}", glyph, n, label),
            status_style(status),
        ));
    }
    Line::from(spans)
}

fn group_title(project: &str) -> Line<'static> {
    let base = single_line(&project_name(project));
    Line::from(vec![
        Span::styled(
            format!("{}/", base),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(single_line(project), dim()),
    ])
}

/// Computed display data for one session.
struct Row<'a> {
    session: &'a Session,
    is_last: bool,
    subtitle: Option<String>,
    status: String,
    detail: String,
    elapsed: String,
    flash: Option<FlashPhase>,
}

impl<'a> Row<'a> {
    fn new(session: &'a Session, is_last: bool, ctx: &RenderContext) -> Self {
        Self {
            session,
            is_last,
            subtitle: subtitle(session, ctx.options.show_summary),
            status: format!(
                "{} {}",
                status_indicator(session.status, ctx.spinner_frame),
                session.status.label()
            ),
            detail: truncate_ellipsis(&single_line(&session.detail), DETAIL_BUDGET),
            elapsed: time_since(&session.last_activity, ctx.now),
            flash: ctx.flashing.get(&session.session_id).copied(),
        }
    }

    fn lines(&self, columns: &Columns, ctx: &RenderContext) -> (Line<'static>, Line<'static>) {
        let connector = if self.is_last {
            CONNECTOR_LAST
        } else {
            CONNECTOR_MID
        };
        let hovered = ctx.hover.as_deref() == Some(self.session.session_id.as_str());
        let mut subtitle_style = dim().add_modifier(Modifier::ITALIC);
        if hovered {
            subtitle_style = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }

        let mut identity = vec![Span::styled(connector, dim()), Span::raw(" ")];
        let id_part = if self.session.pid > 0 {
            format!("{}:{}", self.session.short_id(), self.session.pid)
        } else {
            self.session.short_id().to_string()
        };
        match (&self.subtitle, ctx.options.debug) {
            (Some(text), false) => identity.push(Span::styled(text.clone(), subtitle_style)),
            (Some(text), true) => {
                identity.push(Span::styled(text.clone(), subtitle_style));
                identity.push(Span::raw(" "));
                identity.push(Span::styled(format!("({})", id_part), dim()));
            }
            (None, false) => identity.push(Span::styled("(no description)", subtitle_style)),
            (None, true) => identity.push(Span::styled(id_part, subtitle_style)),
        }

        let indent = if self.is_last {
            Span::raw("   ")
        } else {
            Span::styled("│  ", dim())
        };
        let elapsed_style = match self.flash {
            Some(FlashPhase::On) => Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
            Some(FlashPhase::Off) | None => dim(),
        };
        let status = vec![
            indent,
            Span::styled(
                pad_right(&self.status, columns.status),
                status_style(self.session.status),
            ),
            Span::raw("  "),
            Span::raw(pad_right(&self.detail, columns.detail)),
            Span::raw("  "),
            Span::styled(self.elapsed.clone(), elapsed_style),
        ];

        (Line::from(identity), Line::from(status))
    }
}

/// Column widths shared by every row in the frame.
struct Columns {
    status: usize,
    detail: usize,
}

impl Columns {
    fn measure<'a, 'b: 'a>(rows: impl Iterator<Item = &'a Row<'b>>) -> Self {
        let mut columns = Columns {
            status: STATUS_MIN_WIDTH,
            detail: 0,
        };
        for row in rows {
            columns.status = columns.status.max(row.status.width());
            columns.detail = columns.detail.max(row.detail.width());
        }
        columns
    }
}

/// Picks the row subtitle: the quoted last prompt, or the terminal title when
/// `show_summary` is set, each falling back to the other.
fn subtitle(session: &Session, show_summary: bool) -> Option<String> {
    let summary = match session.summary.as_str() {
        DEFAULT_TAB_TITLE => "",
        s => s,
    };
    let prompt = session.last_prompt.as_str();

    let (text, quoted) = match (show_summary, prompt.is_empty(), summary.is_empty()) {
        (true, _, false) => (summary, false),
        (true, false, true) => (prompt, true),
        (false, false, _) => (prompt, true),
        (false, true, false) => (summary, false),
        _ => return None,
    };
    let text = truncate_ellipsis(&single_line(text), PROMPT_BUDGET);
    if quoted {
        Some(format!("\"{}\"", text))
    } else {
        Some(text)
    }
}

/// Glyph in front of the status label.
pub fn status_indicator(status: Status, spinner_frame: usize) -> &'static str {
    match status {
        Status::Working => SPINNER[spinner_frame % SPINNER.len()],
        Status::Waiting => "◆",
        Status::Idle => "○",
        Status::Starting => "◌",
        Status::Exited => "✕",
        Status::Ended => "─",
        Status::Unknown => "?",
    }
}

/// Color for a status.
pub fn status_style(status: Status) -> Style {
    match status {
        Status::Working => Style::default().fg(Color::Green),
        Status::Waiting => Style::default().fg(Color::Yellow),
        Status::Starting => Style::default().fg(Color::Cyan),
        Status::Exited => Style::default().fg(Color::Red),
        Status::Idle | Status::Ended | Status::Unknown => dim(),
    }
}

fn title_style() -> Style {
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

/// Shortens `s` to `max` characters, ending in `...` when cut.
/// Replaces control characters (newlines, tabs, escapes) with spaces so the
/// text occupies exactly one line.
pub fn single_line(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

pub fn truncate_ellipsis(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    format!("{}...", truncate_chars(s, max.saturating_sub(3)))
}

fn pad_right(s: &str, width: usize) -> String {
    let w = s.width();
    if w >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - w))
    }
}

fn border_line(left: char, right: char, width: usize) -> Line<'static> {
    let mut s = String::with_capacity(width * 3);
    s.push(left);
    s.push_str(&"─".repeat(width.saturating_sub(2)));
    s.push(right);
    Line::from(Span::styled(s, border_style()))
}

fn border_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Wraps `content` in box side borders, clipped or padded to `inner` cells.
fn boxed(content: Line<'static>, inner: usize) -> Line<'static> {
    let content = clip_line(content, inner);
    let used = content.spans.iter().map(|s| s.content.width()).sum::<usize>();
    let mut spans = Vec::with_capacity(content.spans.len() + 3);
    spans.push(Span::styled("│ ", border_style()));
    spans.extend(content.spans);
    if used < inner {
        spans.push(Span::raw(" ".repeat(inner - used)));
    }
    spans.push(Span::styled(" │", border_style()));
    Line::from(spans)
}

fn clip_all(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    lines.into_iter().map(|l| clip_line(l, width)).collect()
}

/// Drops whatever extends past `max` display cells.
fn clip_line(line: Line<'static>, max: usize) -> Line<'static> {
    let mut used = 0;
    let mut spans = Vec::with_capacity(line.spans.len());
    for span in line.spans {
        let w = span.content.width();
        if used + w <= max {
            used += w;
            spans.push(span);
            continue;
        }
        let mut cut = String::new();
        for ch in span.content.chars() {
            let cw = ch.width().unwrap_or(0);
            if used + cw > max {
                break;
            }
            used += cw;
            cut.push(ch);
        }
        if !cut.is_empty() {
            spans.push(Span::styled(cut, span.style));
        }
        break;
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests;
