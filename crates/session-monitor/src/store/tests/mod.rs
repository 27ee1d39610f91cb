//! Tests for the session store.

use super::*;
use crate::Status;
use std::collections::HashSet;
use tempfile::TempDir;


fn temp_store() -> (TempDir, SessionStore) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let store = SessionStore::new(dir.path());
    (dir, store)
}

fn session(id: &str, os: &str, pid: i64) -> Session {
    let mut s = Session::new(id, "/p");
    s.status = Status::Idle;
    s.os = os.to_string();
    s.pid = pid;
    s
}

/// Probe answering from a fixed set of live pids.
struct FixedProbe {
    alive: HashSet<i64>,
    unknown: HashSet<i64>,
}

impl FixedProbe {
    fn alive(pids: &[i64]) -> Self {
        Self {
            alive: pids.iter().copied().collect(),
            unknown: HashSet::new(),
        }
    }
}

impl ProcessProbe for FixedProbe {
    fn is_alive(&self, pid: i64) -> Option<bool> {
        if self.unknown.contains(&pid) {
            return None;
        }
        Some(self.alive.contains(&pid))
    }
}
