//! Read-side commands: the live TUI, `--once` and `--clean`.

use chrono::Utc;
use session_monitor::config::{xdg, Config};
use session_monitor::liveness::LivenessDetector;
use session_monitor::render::{render, DisplayOptions, RenderContext};
use session_monitor::store::SessionStore;
use session_monitor::tui::app::App;
use session_monitor::{load_view, logging};
use std::process::ExitCode;

/// Width used when stdout is not a terminal.
const FALLBACK_WIDTH: u16 = 80;

/// Prints one plain-text frame and exits.
pub(crate) fn run_once_command(config: &Config, debug: bool) -> ExitCode {
    let store = SessionStore::new(xdg::sessions_dir(config));
    let detector = LivenessDetector::native();
    let groups = load_view(&store, Some(&detector));

    let width = crossterm::terminal::size()
        .map(|(w, _)| w)
        .unwrap_or(FALLBACK_WIDTH);
    let options = DisplayOptions {
        show_summary: config.tui.show_summary,
        debug,
        interactive: false,
    };
    let frame = render(&groups, &RenderContext::new(width, options, Utc::now()));
    println!("{}", frame.to_plain_text());
    ExitCode::SUCCESS
}

/// Deletes every session file.
pub(crate) fn run_clean_command(config: &Config) -> ExitCode {
    let store = SessionStore::new(xdg::sessions_dir(config));
    match store.clean_all() {
        Ok(count) => {
            println!(
                "Removed {} session file(s) from {}",
                count,
                store.dir().display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Runs the interactive view until the user quits.
pub(crate) fn run_tui_command(config: &Config, debug: bool) -> ExitCode {
    let level = if debug {
        "debug"
    } else {
        config.log.level.as_directive()
    };
    // stderr is the alternate screen here, so logs only go to a file
    if !config.log.file.is_empty() {
        let path = xdg::expand_tilde(&config.log.file);
        if let Err(e) = logging::init_file(&path, level) {
            eprintln!("Error: cannot open log file {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let result = rt.block_on(async {
        let mut app = App::from_config(config, debug).map_err(std::io::Error::other)?;
        app.run().await
    });
    if let Err(e) = result {
        eprintln!("TUI error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
