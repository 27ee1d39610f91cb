//! Cross-platform process liveness detection.
//!
//! A session records the pid of its agent process plus the platform tag of
//! the environment that issued the pid. The detector answers "is that process
//! still running" even when the viewer and the agent run on different sides
//! of a Windows/WSL boundary:
//!
//! - same platform: ask the native process table per pid
//! - Windows viewer, WSL session: one `wsl.exe` call running `kill -0` over
//!   every pid
//! - WSL viewer, Windows session: one `powershell.exe` call filtering the
//!   pids through `Get-Process`
//!
//! Anything that cannot be answered counts as alive. A false "exited" is
//! worse than a stale row.

use crate::session::{ProcessRef, Session};
use std::collections::{HashMap, HashSet};
use std::io;
use std::process::Command;
use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};

/// Answers liveness questions about pids on the local platform.
pub trait ProcessProbe: Send + Sync {
    /// `Some(true)` if running, `Some(false)` if confirmed gone, `None` if
    /// the question cannot be answered.
    fn is_alive(&self, pid: i64) -> Option<bool>;
}

/// Captured result of an external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external programs. Tests substitute a scripted runner.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput>;
}

/// [`ProcessProbe`] backed by the native process table.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeProbe;

impl ProcessProbe for NativeProbe {
    fn is_alive(&self, pid: i64) -> Option<bool> {
        let raw = u32::try_from(pid).ok().filter(|p| *p > 0)?;
        let pid = Pid::from_u32(raw);
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let alive = sys
            .process(pid)
            .is_some_and(|p| !matches!(p.status(), ProcessStatus::Zombie | ProcessStatus::Dead));
        Some(alive)
    }
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Decides which recorded sessions still have a running process.
pub struct LivenessDetector {
    host_platform: String,
    probe: Box<dyn ProcessProbe>,
    runner: Box<dyn CommandRunner>,
}

impl std::fmt::Debug for LivenessDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LivenessDetector")
            .field("host_platform", &self.host_platform)
            .finish_non_exhaustive()
    }
}

/// How a session's pid has to be checked from the host.
enum Route {
    Local,
    Wsl,
    Windows,
    Unreachable,
}

impl LivenessDetector {
    pub fn new(
        host_platform: impl Into<String>,
        probe: Box<dyn ProcessProbe>,
        runner: Box<dyn CommandRunner>,
    ) -> Self {
        Self {
            host_platform: host_platform.into(),
            probe,
            runner,
        }
    }

    /// Detector for the running platform using the native process table
    /// and real subprocesses.
    pub fn native() -> Self {
        Self::new(
            crate::session::current_platform(),
            Box::new(NativeProbe),
            Box::new(SystemRunner),
        )
    }

    pub fn host_platform(&self) -> &str {
        &self.host_platform
    }

    /// Maps session id to alive. Sessions without a known pid are absent.
    pub fn detect(&self, sessions: &[Session]) -> HashMap<String, bool> {
        let mut result = HashMap::new();
        let mut wsl: Vec<(String, i64)> = Vec::new();
        let mut windows: Vec<(String, i64)> = Vec::new();

        for session in sessions {
            let Some(process) = session.process() else {
                continue;
            };
            let id = session.session_id.clone();
            match self.route(&process.platform) {
                Route::Local => {
                    let alive = self.probe.is_alive(process.pid).unwrap_or(true);
                    result.insert(id, alive);
                }
                Route::Wsl => wsl.push((id, process.pid)),
                Route::Windows => windows.push((id, process.pid)),
                Route::Unreachable => {
                    result.insert(id, true);
                }
            }
        }

        if !wsl.is_empty() {
            let alive = self.batch("wsl.exe", wsl_args(&unique_pids(&wsl)));
            record_batch(&mut result, wsl, alive.as_ref());
        }
        if !windows.is_empty() {
            let alive = self.batch("powershell.exe", powershell_args(&unique_pids(&windows)));
            record_batch(&mut result, windows, alive.as_ref());
        }

        result
    }

    fn route(&self, platform: &str) -> Route {
        let host = self.host_platform.as_str();
        if platform.is_empty() || platform == host {
            Route::Local
        } else if host == "windows" {
            Route::Wsl
        } else if platform == "windows" && host == "linux" {
            Route::Windows
        } else {
            Route::Unreachable
        }
    }

    /// Runs one batched query. `None` means the answer is unknown.
    fn batch(&self, program: &str, args: Vec<String>) -> Option<HashSet<i64>> {
        match self.runner.run(program, &args) {
            Ok(output) if output.success => Some(parse_alive_pids(&output.stdout)),
            Ok(output) => {
                tracing::debug!(program, stderr = %output.stderr.trim(), "liveness query failed");
                None
            }
            Err(e) => {
                tracing::debug!(program, "liveness query could not start: {}", e);
                None
            }
        }
    }
}

fn record_batch(
    result: &mut HashMap<String, bool>,
    sessions: Vec<(String, i64)>,
    alive: Option<&HashSet<i64>>,
) {
    for (id, pid) in sessions {
        let is_alive = alive.map_or(true, |set| set.contains(&pid));
        result.insert(id, is_alive);
    }
}

fn unique_pids(sessions: &[(String, i64)]) -> Vec<i64> {
    let mut pids: Vec<i64> = sessions.iter().map(|(_, pid)| *pid).collect();
    pids.sort_unstable();
    pids.dedup();
    pids
}

fn join_pids(pids: &[i64], sep: &str) -> String {
    pids.iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

fn wsl_args(pids: &[i64]) -> Vec<String> {
    let script = format!(
        "for p in {}; do if kill -0 $p 2>/dev/null; then echo $p; fi; done",
        join_pids(pids, " ")
    );
    vec!["sh".to_string(), "-c".to_string(), script]
}

fn powershell_args(pids: &[i64]) -> Vec<String> {
    let script = format!(
        "{} | ForEach-Object {{ if (Get-Process -Id $_ -ErrorAction SilentlyContinue) {{ $_ }} }}",
        join_pids(pids, ",")
    );
    vec!["-NoProfile".to_string(), "-Command".to_string(), script]
}

/// Parses one pid per line; anything else is ignored.
pub fn parse_alive_pids(stdout: &str) -> HashSet<i64> {
    stdout
        .lines()
        .filter_map(|line| line.trim().parse::<i64>().ok())
        .filter(|pid| *pid > 0)
        .collect()
}

/// Marks every session the detector found dead as exited.
pub fn apply_liveness(sessions: &mut [Session], alive: &HashMap<String, bool>) {
    for session in sessions.iter_mut() {
        if alive.get(&session.session_id) == Some(&false) {
            session.mark_exited();
        }
    }
}

/// A liveness answer together with the process it was about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedProcess {
    pub process: ProcessRef,
    pub alive: bool,
}

/// Pairs each answer in `alive` with the process it was computed for.
pub fn checked_processes(
    sessions: &[Session],
    alive: &HashMap<String, bool>,
) -> HashMap<String, CheckedProcess> {
    sessions
        .iter()
        .filter_map(|s| {
            let alive = *alive.get(&s.session_id)?;
            let process = s.process()?;
            Some((s.session_id.clone(), CheckedProcess { process, alive }))
        })
        .collect()
}

/// Marks sessions exited from remembered answers.
///
/// An answer only applies while the record still names the process that was
/// checked; a session resumed under a new pid is left as its file says.
pub fn apply_checked(sessions: &mut [Session], checked: &HashMap<String, CheckedProcess>) {
    for session in sessions.iter_mut() {
        let Some(entry) = checked.get(&session.session_id) else {
            continue;
        };
        let same = session
            .process()
            .is_some_and(|p| p.same_process(&entry.process));
        if same && !entry.alive {
            session.mark_exited();
        }
    }
}

/// Pid of the agent that spawned this hook, `0` if unknown.
///
/// Hooks run as agent -> shell -> hook, so the agent is the grandparent.
pub fn find_agent_pid() -> i64 {
    let mut sys = System::new();
    let own = Pid::from_u32(std::process::id());
    let Some(parent) = parent_of(&mut sys, own) else {
        return 0;
    };
    match parent_of(&mut sys, parent) {
        Some(grandparent) => i64::from(grandparent.as_u32()),
        None => 0,
    }
}

fn parent_of(sys: &mut System, pid: Pid) -> Option<Pid> {
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    sys.process(pid)?.parent().filter(|p| p.as_u32() > 0)
}
