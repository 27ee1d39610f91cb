/// Terminal-related facts about the current process.
///
/// Captured once so backends never read environment variables themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminalEnvironment {
    /// `$TMUX_PANE` when running inside tmux.
    pub tmux_pane: Option<String>,
    /// `$WT_SESSION` when running inside Windows Terminal.
    pub wt_session: Option<String>,
    /// Platform tag of this process.
    pub platform: String,
}

impl TerminalEnvironment {
    /// Detect the current terminal environment from env vars.
    pub fn detect() -> Self {
        Self {
            tmux_pane: non_empty_var("TMUX_PANE"),
            wt_session: non_empty_var("WT_SESSION"),
            platform: crate::session::current_platform().to_string(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
