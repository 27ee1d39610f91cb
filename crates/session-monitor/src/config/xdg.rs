//! Platform-aware path resolution for session-monitor.
//!
//! On **Linux**, follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/session-monitor` or `~/.config/session-monitor`
//!
//! On **macOS**, uses Apple conventions with an XDG override:
//! - Config: `$XDG_CONFIG_HOME/session-monitor` or `~/Library/Application Support/session-monitor`
//!
//! Session files live outside the config tree, under `~/.session-monitor/sessions`
//! unless overridden (see [`sessions_dir`]).

use crate::config::schema::Config;
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "session-monitor";

/// Overrides the sessions directory for both the hook and the viewer.
pub const SESSIONS_DIR_ENV: &str = "SMON_SESSIONS_DIR";

/// Returns the configuration directory for session-monitor.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/session-monitor` (if env var set, any platform)
/// 2. Platform default:
///    - Linux: `~/.config/session-monitor`
///    - macOS: `~/Library/Application Support/session-monitor`
pub fn config_dir() -> PathBuf {
    if let Some(xdg) = non_empty_var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join(APP_NAME);
    }
    platform_config_dir().join(APP_NAME)
}

/// Platform-native config base directory (without XDG override).
fn platform_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::config_dir().unwrap_or_else(|| home().join("Library/Application Support"))
    }
    #[cfg(not(target_os = "macos"))]
    {
        home().join(".config")
    }
}

/// Returns the path to the main configuration file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Directory holding one JSON file per session.
///
/// Resolution order:
/// 1. `$SMON_SESSIONS_DIR`
/// 2. `[sessions] dir` from the config file (tilde-expanded)
/// 3. `~/.session-monitor/sessions`
pub fn sessions_dir(config: &Config) -> PathBuf {
    if let Some(dir) = non_empty_var(SESSIONS_DIR_ENV) {
        return PathBuf::from(dir);
    }
    if !config.sessions.dir.is_empty() {
        return expand_tilde(&config.sessions.dir);
    }
    default_sessions_dir()
}

/// `~/.session-monitor/sessions`.
pub fn default_sessions_dir() -> PathBuf {
    home().join(format!(".{APP_NAME}")).join("sessions")
}

/// Expands a leading `~` in a path string to the user's home directory.
///
/// If the path does not start with `~`, it is returned as-is.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        home().join(rest)
    } else if path == "~" {
        home()
    } else {
        PathBuf::from(path)
    }
}

/// Creates a directory and all parent directories with mode 0700.
///
/// Equivalent to `mkdir -p` with restricted permissions.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}

/// Creates the configuration directory if it does not exist, returning its path.
pub fn ensure_config_dir() -> std::io::Result<PathBuf> {
    let dir = config_dir();
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Home directory, or the working directory when it cannot be determined.
fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
