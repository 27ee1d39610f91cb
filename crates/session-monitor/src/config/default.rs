//! Default configuration template and file creation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::error::ConfigError;
use crate::config::xdg;

/// A commented TOML template with all default values.
///
/// Every value here must match `Config::default()` from `schema.rs`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# session-monitor configuration
#
# All values shown below are the built-in defaults.
# Location: $XDG_CONFIG_HOME/session-monitor/config.toml

# ==============================================================================
# Session files
# ==============================================================================

[sessions]

# Directory holding one JSON file per session.
# Empty means ~/.session-monitor/sessions.
# The SMON_SESSIONS_DIR environment variable overrides this value.
# Tilde (~) is expanded to the user's home directory.
dir = ""

# ==============================================================================
# Live view
# ==============================================================================

[tui]

# How often the session directory is re-read.
# Examples: "500ms", "1s", "2s"
refresh_interval = "1s"

# Redraw rate for the spinner and change highlights.
flash_interval = "100ms"

# Minimum time between process liveness checks.
# Each check may spawn wsl.exe or powershell.exe for cross-platform sessions.
liveness_interval = "10s"

# How long the result of a click stays in the footer.
status_message_ttl = "3s"

# Show terminal titles instead of last prompts on startup (toggle with 'p').
show_summary = false

# ==============================================================================
# Logging
# ==============================================================================

[log]

# Options: "error", "warn", "info", "debug", "trace"
# The SMON_LOG environment variable overrides this value.
level = "info"

# Log file for the live view. Empty means no logging while the view runs.
file = ""
"#;

/// Creates (or force-overwrites) the default config file.
///
/// - If the file exists and `force` is `false`, returns `ConfigError::AlreadyExists`.
/// - If the file exists and `force` is `true`, backs it up to `.toml.backup` first.
/// - Returns the path where the config was written.
pub fn create_default_config(force: bool) -> Result<PathBuf, ConfigError> {
    let path = xdg::config_path();

    if path.exists() {
        if !force {
            return Err(ConfigError::AlreadyExists { path });
        }
        let backup_path = path.with_extension("toml.backup");
        fs::rename(&path, &backup_path).map_err(|e| ConfigError::WriteError {
            path: backup_path.clone(),
            source: e,
        })?;
        tracing::info!("Backed up existing config to {}", backup_path.display());
    }

    write_default_config(&path)?;
    Ok(path)
}

/// Writes the default template to `path`, creating parent dirs and setting 0600 permissions.
fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let write_error = |source| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    xdg::ensure_config_dir().map_err(write_error)?;
    fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(write_error)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(write_error)?;
    }

    Ok(())
}
