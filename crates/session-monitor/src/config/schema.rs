//! TOML configuration schema types.
//!
//! All structs derive `Deserialize` and `Serialize` with defaults via
//! `#[serde(default)]`, so a partial file (or none at all) is valid.
//!
//! Duration fields use human-readable strings (e.g. `"1s"`, `"100ms"`)
//! parsed by `humantime` through [`Config::tui_timing`].

use crate::config::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration.
///
/// ```toml
/// [sessions]
/// [tui]
/// [log]
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub sessions: SessionsConfig,
    pub tui: TuiConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SessionsConfig {
    /// Session directory. Empty means `~/.session-monitor/sessions`.
    pub dir: String,
}

/// Live view timing and display defaults.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TuiConfig {
    /// How often the session directory is re-read.
    pub refresh_interval: String,
    /// Redraw rate for the spinner and change highlights.
    pub flash_interval: String,
    /// Minimum time between process liveness checks.
    pub liveness_interval: String,
    /// How long a focus result stays in the footer.
    pub status_message_ttl: String,
    /// Show terminal titles instead of prompts on startup.
    pub show_summary: bool,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            refresh_interval: "1s".to_string(),
            flash_interval: "100ms".to_string(),
            liveness_interval: "10s".to_string(),
            status_message_ttl: "3s".to_string(),
            show_summary: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Log file for the live view. Empty disables logging there, since the
    /// alternate screen owns the terminal.
    pub file: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: String::new(),
        }
    }
}

/// Log verbosity levels (kebab-case in TOML).
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Parsed `[tui]` durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuiTiming {
    pub refresh: Duration,
    pub flash: Duration,
    pub liveness: Duration,
    pub status_message_ttl: Duration,
}

impl Config {
    /// Parses every `[tui]` duration, naming the first bad field.
    pub fn tui_timing(&self) -> Result<TuiTiming, ConfigError> {
        Ok(TuiTiming {
            refresh: parse_duration("tui.refresh_interval", &self.tui.refresh_interval)?,
            flash: parse_duration("tui.flash_interval", &self.tui.flash_interval)?,
            liveness: parse_duration("tui.liveness_interval", &self.tui.liveness_interval)?,
            status_message_ttl: parse_duration(
                "tui.status_message_ttl",
                &self.tui.status_message_ttl,
            )?,
        })
    }

    /// Checks everything `toml` can't: currently the duration strings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tui_timing().map(|_| ())
    }
}

fn parse_duration(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let parsed = humantime::parse_duration(value).map_err(|e| ConfigError::InvalidDuration {
        field,
        value: value.to_string(),
        message: e.to_string(),
    })?;
    if parsed.is_zero() {
        return Err(ConfigError::InvalidDuration {
            field,
            value: value.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(parsed)
}
