//! The `hook` command: one event in, one session file updated.

use session_monitor::config::{xdg, Config, ConfigLoader};
use session_monitor::hook::{handle_event, read_input, HookEnv, HookError, HookOutcome};
use session_monitor::logging;
use session_monitor::store::SessionStore;
use std::process::ExitCode;

/// Reads one hook event from stdin and applies it.
///
/// Always exits with success: a broken monitor must never block the agent.
/// Failures are reported on stderr.
pub(crate) fn run_hook_command() -> ExitCode {
    logging::init_stderr("warn");

    let config = ConfigLoader::load_default().unwrap_or_else(|e| {
        tracing::warn!("ignoring config: {}", e);
        Config::default()
    });
    let store = SessionStore::new(xdg::sessions_dir(&config));

    match record_event(&store) {
        Ok(HookOutcome::Written(session)) => {
            tracing::debug!(session = %session.session_id, status = %session.status, "recorded");
        }
        Ok(HookOutcome::Removed) => tracing::debug!("session ended"),
        Ok(HookOutcome::Ignored) => {}
        Err(e) => eprintln!("smon hook: {}", e),
    }
    ExitCode::SUCCESS
}

fn record_event(store: &SessionStore) -> Result<HookOutcome, HookError> {
    let input = read_input(std::io::stdin().lock())?;
    handle_event(store, &input, &HookEnv::default())
}
