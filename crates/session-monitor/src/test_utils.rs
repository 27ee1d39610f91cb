//! Shared test doubles for process probing and external commands.

#![cfg(test)]

use crate::liveness::{CommandOutput, CommandRunner, ProcessProbe};
use crate::session::Session;
use crate::Status;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

/// Recorded `(program, args)` invocations.
pub type Calls = Arc<Mutex<Vec<(String, Vec<String>)>>>;

/// Runner that records every call and answers from a script.
///
/// Replies are looked up by program name; unknown programs fail to spawn.
pub struct ScriptedRunner {
    calls: Calls,
    replies: HashMap<String, Reply>,
}

#[derive(Clone)]
enum Reply {
    Output(CommandOutput),
    SpawnError,
}

impl ScriptedRunner {
    pub fn new() -> (Self, Calls) {
        let calls: Calls = Arc::default();
        (
            Self {
                calls: Arc::clone(&calls),
                replies: HashMap::new(),
            },
            calls,
        )
    }

    /// Successful run of `program` printing `stdout`.
    pub fn ok(mut self, program: &str, stdout: &str) -> Self {
        self.replies.insert(
            program.to_string(),
            Reply::Output(CommandOutput {
                success: true,
                stdout: stdout.to_string(),
                stderr: String::new(),
            }),
        );
        self
    }

    /// Run of `program` exiting non-zero with `stderr`.
    pub fn fail(mut self, program: &str, stderr: &str) -> Self {
        self.replies.insert(
            program.to_string(),
            Reply::Output(CommandOutput {
                success: false,
                stdout: String::new(),
                stderr: stderr.to_string(),
            }),
        );
        self
    }

    /// `program` cannot be started.
    pub fn missing(mut self, program: &str) -> Self {
        self.replies.insert(program.to_string(), Reply::SpawnError);
        self
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));
        match self.replies.get(program) {
            Some(Reply::Output(out)) => Ok(out.clone()),
            Some(Reply::SpawnError) | None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{program}: not found"),
            )),
        }
    }
}

/// Probe answering from a fixed table; pids not listed are dead.
pub struct FixedProbe {
    answers: HashMap<i64, Option<bool>>,
}

impl FixedProbe {
    pub fn new(answers: &[(i64, Option<bool>)]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
        }
    }

    pub fn alive(pids: &[i64]) -> Self {
        Self {
            answers: pids.iter().map(|p| (*p, Some(true))).collect(),
        }
    }
}

impl ProcessProbe for FixedProbe {
    fn is_alive(&self, pid: i64) -> Option<bool> {
        self.answers.get(&pid).copied().unwrap_or(Some(false))
    }
}

/// Session with the given identity, platform and pid.
pub fn make_session(id: &str, os: &str, pid: i64) -> Session {
    let mut s = Session::new(id, "/p");
    s.status = Status::Working;
    s.os = os.to_string();
    s.pid = pid;
    s
}
