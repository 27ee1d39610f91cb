//! Windows Terminal tabs, driven through UI Automation in PowerShell.
//!
//! A tab is identified by its UI Automation runtime id, stored as the
//! comma-joined integers (`42,132262,4`). Runtime ids are stable for the
//! lifetime of the tab but are only discoverable for the foreground tab, so
//! the hook captures one at session start and refreshes just the title later.

use super::{run_checked, strip_title_prefix, TerminalBackend, TerminalError, TerminalInfo};
use crate::liveness::CommandRunner;
use std::sync::Arc;

/// Backend key for Windows Terminal tabs.
pub const NAME: &str = "wt";

const POWERSHELL: &str = "powershell.exe";

/// Loads UI Automation and collects every Windows Terminal window.
const PREAMBLE: &str = r#"
Add-Type -AssemblyName UIAutomationClient
Add-Type -AssemblyName UIAutomationTypes
$root = [System.Windows.Automation.AutomationElement]::RootElement
$wtCond = New-Object System.Windows.Automation.PropertyCondition([System.Windows.Automation.AutomationElement]::ClassNameProperty, 'CASCADIA_HOSTING_WINDOW_CLASS')
$wtWindows = $root.FindAll([System.Windows.Automation.TreeScope]::Children, $wtCond)
$tabCond = New-Object System.Windows.Automation.PropertyCondition([System.Windows.Automation.AutomationElement]::ControlTypeProperty, [System.Windows.Automation.ControlType]::TabItem)
"#;

/// Prints the runtime id and name of the selected tab in the foreground window.
const INFO_SCRIPT: &str = r#"
Add-Type -TypeDefinition @"
using System;
using System.Runtime.InteropServices;
public class SmonWin32 {
    [DllImport("user32.dll")]
    public static extern IntPtr GetForegroundWindow();
}
"@
$fgHwnd = [SmonWin32]::GetForegroundWindow()
foreach ($w in $wtWindows) {
    if ($w.Current.NativeWindowHandle -ne [int]$fgHwnd) { continue }
    foreach ($tab in $w.FindAll([System.Windows.Automation.TreeScope]::Descendants, $tabCond)) {
        try {
            $sel = $tab.GetCurrentPattern([System.Windows.Automation.SelectionItemPattern]::Pattern)
            if ($sel.Current.IsSelected) {
                ($tab.GetRuntimeId() -join ',')
                $tab.Current.Name
                exit
            }
        } catch {}
    }
}
"#;

/// Focuses Windows Terminal tabs.
pub struct WindowsTerminalBackend {
    session: Option<String>,
    runner: Arc<dyn CommandRunner>,
}

impl WindowsTerminalBackend {
    pub fn new(wt_session: Option<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            session: wt_session,
            runner,
        }
    }

    fn powershell(&self, body: &str) -> Result<String, TerminalError> {
        let script = format!("{}{}", PREAMBLE, body);
        let args = vec!["-NoProfile".to_string(), "-Command".to_string(), script];
        let out = run_checked(self.runner.as_ref(), POWERSHELL, &args)?;
        Ok(out.stdout.trim().to_string())
    }
}

/// Script body that runs `action` on the tab whose runtime id is `id`.
fn find_tab_script(id: &str, action: &str, not_found: &str) -> String {
    format!(
        r#"
$targetRid = @({id})
foreach ($w in $wtWindows) {{
    foreach ($tab in $w.FindAll([System.Windows.Automation.TreeScope]::Descendants, $tabCond)) {{
        if (($tab.GetRuntimeId() -join ',') -eq ($targetRid -join ',')) {{
{action}
            exit
        }}
    }}
}}
{not_found}
"#
    )
}

/// Runtime ids are comma-separated integers; anything else never reaches
/// the script.
fn is_runtime_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .split(',')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

fn invalid(id: &str) -> TerminalError {
    TerminalError::InvalidId {
        backend: NAME,
        id: id.to_string(),
    }
}

impl TerminalBackend for WindowsTerminalBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn available(&self) -> bool {
        self.session.is_some()
    }

    fn info(&self) -> Option<TerminalInfo> {
        if !self.available() {
            return None;
        }
        let out = match self.powershell(INFO_SCRIPT) {
            Ok(out) => out,
            Err(e) => {
                tracing::debug!("windows terminal tab lookup failed: {}", e);
                return None;
            }
        };
        let mut lines = out.lines();
        let id = lines.next().map(str::trim).unwrap_or_default();
        if !is_runtime_id(id) {
            return None;
        }
        let title = lines.next().map(str::trim).unwrap_or_default();
        Some(TerminalInfo {
            id: id.to_string(),
            title: strip_title_prefix(title).to_string(),
        })
    }

    fn title(&self, id: &str) -> String {
        if !is_runtime_id(id) {
            return String::new();
        }
        let script = find_tab_script(id, "            $tab.Current.Name", "");
        match self.powershell(&script) {
            Ok(out) => strip_title_prefix(&out).to_string(),
            Err(e) => {
                tracing::debug!("windows terminal title lookup failed: {}", e);
                String::new()
            }
        }
    }

    fn select(&self, id: &str) -> Result<(), TerminalError> {
        if !is_runtime_id(id) {
            return Err(invalid(id));
        }
        let action = "            $tab.GetCurrentPattern([System.Windows.Automation.SelectionItemPattern]::Pattern).Select()\n            $w.SetFocus()";
        let script = find_tab_script(id, action, "Write-Error 'Tab not found'\nexit 1");
        self.powershell(&script)?;
        Ok(())
    }

    fn info_needs_focus(&self) -> bool {
        true
    }
}
