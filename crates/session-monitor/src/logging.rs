//! Logging initialization.
//!
//! Configures the `tracing` subscriber with level filtering via the `SMON_LOG`
//! environment variable, falling back to a per-command default.
//!
//! ```bash
//! SMON_LOG=debug smon --once
//! SMON_LOG=session_monitor::terminal=debug,warn smon
//! ```
//!
//! The hook logs to stderr, which the agent surfaces on failure. The live view
//! owns the terminal, so it only logs when a file is configured.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "SMON_LOG";

/// Filter from `SMON_LOG`, or `default` when unset or invalid.
pub fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Logs to stderr.
pub fn init_stderr(default: &str) {
    let _ = fmt()
        .with_env_filter(filter(default))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Appends plain-text logs to `path`, creating it if needed.
pub fn init_file(path: &Path, default: &str) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let _ = fmt()
        .with_env_filter(filter(default))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_filter_parses_valid_directives() {
        for d in ["info", "debug", "warn", "error", "trace"] {
            assert!(EnvFilter::try_new(d).is_ok(), "failed to parse directive: {}", d);
        }
    }

    #[test]
    fn env_filter_parses_module_directive() {
        assert!(EnvFilter::try_new("session_monitor::terminal=debug,warn").is_ok());
    }

    #[test]
    fn init_file_creates_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smon.log");
        init_file(&path, "info").unwrap();
        assert!(path.exists());
    }
}
