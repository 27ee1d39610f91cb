use super::*;
use crate::test_utils::{make_session, FixedProbe};
use crate::Status;
use chrono::TimeZone;
use serde_json::json;
use std::cell::RefCell;
use tempfile::TempDir;

struct FakeContext {
    probe: FixedProbe,
    pid: i64,
    detection: Detection,
    seen: RefCell<Vec<(Vec<TerminalLocation>, bool)>>,
}

impl FakeContext {
    fn new(pid: i64) -> Self {
        Self {
            probe: FixedProbe::alive(&[pid]),
            pid,
            detection: Detection::default(),
            seen: RefCell::new(Vec::new()),
        }
    }

    fn with_terminal(mut self, backend: &str, id: &str, title: &str) -> Self {
        self.detection
            .locations
            .push(TerminalLocation::new(backend, id));
        self.detection.title = title.to_string();
        self
    }
}

impl HookContext for FakeContext {
    fn platform(&self) -> &str {
        "linux"
    }

    fn probe(&self) -> &dyn ProcessProbe {
        &self.probe
    }

    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn agent_pid(&self) -> i64 {
        self.pid
    }

    fn detect_terminal(&self, previous: &[TerminalLocation], is_session_start: bool) -> Detection {
        self.seen
            .borrow_mut()
            .push((previous.to_vec(), is_session_start));
        self.detection.clone()
    }
}

fn temp_store() -> (TempDir, SessionStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("sessions"));
    (dir, store)
}

fn input(value: serde_json::Value) -> HookInput {
    serde_json::from_value(value).unwrap()
}

fn event(id: &str, name: &str) -> HookInput {
    input(json!({"session_id": id, "cwd": "/home/me/api", "hook_event_name": name}))
}

fn written(outcome: HookOutcome) -> Session {
    match outcome {
        HookOutcome::Written(session) => session,
        other => panic!("expected a write, got {:?}", other),
    }
}

#[test]
fn test_session_start_writes_fresh_record() {
    let (_dir, store) = temp_store();
    let ctx = FakeContext::new(4321).with_terminal("tmux", "%3", "Fix login");

    let s = written(handle_event(&store, &event("s1", "SessionStart"), &ctx).unwrap());

    assert_eq!(s.status, Status::Starting);
    assert_eq!(s.detail, "Session started");
    assert_eq!(s.project, "/home/me/api");
    assert_eq!(s.pid, 4321);
    assert_eq!(s.os, "linux");
    assert_eq!(s.summary, "Fix login");
    assert_eq!(s.terminals, vec![TerminalLocation::new("tmux", "%3")]);
    assert_eq!(s.last_activity, "2026-03-01T12:00:00Z");
    assert_eq!(s.notification_type, None);
    assert_eq!(store.load("s1"), Some(s));
    assert_eq!(*ctx.seen.borrow(), vec![(Vec::new(), true)]);
}

#[test]
fn test_full_lifecycle() {
    let (_dir, store) = temp_store();
    let ctx = FakeContext::new(4321);

    handle_event(&store, &event("s1", "SessionStart"), &ctx).unwrap();

    let tool = input(json!({
        "session_id": "s1", "cwd": "/home/me/api", "hook_event_name": "PreToolUse",
        "tool_name": "Bash", "tool_input": {"command": "ls -la"}
    }));
    let s = written(handle_event(&store, &tool, &ctx).unwrap());
    assert_eq!(s.status, Status::Working);
    assert_eq!(s.detail, "Bash: ls -la");

    let prompt = input(json!({
        "session_id": "s1", "cwd": "/home/me/api",
        "hook_event_name": "UserPromptSubmit", "prompt": "fix bug"
    }));
    let s = written(handle_event(&store, &prompt, &ctx).unwrap());
    assert_eq!(s.last_prompt, "fix bug");
    assert_eq!(s.detail, "Bash: ls -la");

    let s = written(handle_event(&store, &event("s1", "Stop"), &ctx).unwrap());
    assert_eq!(s.status, Status::Idle);
    assert_eq!(s.detail, "Finished responding");
    assert_eq!(s.last_prompt, "fix bug");

    let outcome = handle_event(&store, &event("s1", "SessionEnd"), &ctx).unwrap();
    assert_eq!(outcome, HookOutcome::Removed);
    assert!(!store.path_for("s1").exists());
}

#[test]
fn test_prompt_without_previous_detail() {
    let (_dir, store) = temp_store();
    let prompt = input(json!({
        "session_id": "s1", "hook_event_name": "UserPromptSubmit", "prompt": "hello"
    }));
    let s = written(handle_event(&store, &prompt, &FakeContext::new(0)).unwrap());
    assert_eq!(s.detail, "Processing prompt...");
    assert_eq!(s.last_prompt, "hello");
}

#[test]
fn test_idle_notification_leaves_record_alone() {
    let (_dir, store) = temp_store();
    let ctx = FakeContext::new(4321);
    handle_event(&store, &event("s1", "Stop"), &ctx).unwrap();
    let before = std::fs::read(store.path_for("s1")).unwrap();

    let idle = input(json!({
        "session_id": "s1", "hook_event_name": "Notification",
        "notification_type": "idle_prompt", "message": "Claude is waiting"
    }));
    assert_eq!(handle_event(&store, &idle, &ctx).unwrap(), HookOutcome::Ignored);
    assert_eq!(std::fs::read(store.path_for("s1")).unwrap(), before);
}

#[test]
fn test_permission_prompt_waits() {
    let (_dir, store) = temp_store();
    let ask = input(json!({
        "session_id": "s1", "hook_event_name": "Notification",
        "notification_type": "permission_prompt", "title": "Allow Bash?"
    }));
    let s = written(handle_event(&store, &ask, &FakeContext::new(1)).unwrap());
    assert_eq!(s.status, Status::Waiting);
    assert_eq!(s.detail, "Allow Bash?");
    assert_eq!(s.notification_type.as_deref(), Some("permission_prompt"));
}

#[test]
fn test_unknown_event_creates_nothing() {
    let (_dir, store) = temp_store();
    let outcome = handle_event(&store, &event("s1", "PreCompact"), &FakeContext::new(1)).unwrap();
    assert_eq!(outcome, HookOutcome::Ignored);
    assert!(store.load_all().is_empty());
}

#[test]
fn test_later_events_keep_previous_context() {
    let (_dir, store) = temp_store();
    let start = FakeContext::new(4321).with_terminal("wt", "1,2", "Tab title");
    handle_event(&store, &event("s1", "SessionStart"), &start).unwrap();

    let later = FakeContext::new(0);
    let s = written(handle_event(&store, &event("s1", "Stop"), &later).unwrap());

    assert_eq!(s.pid, 4321);
    assert_eq!(s.summary, "Tab title");
    assert_eq!(s.terminals, vec![TerminalLocation::new("wt", "1,2")]);
    assert_eq!(
        *later.seen.borrow(),
        vec![(vec![TerminalLocation::new("wt", "1,2")], false)]
    );
}

#[test]
fn test_session_start_inherits_nothing() {
    let (_dir, store) = temp_store();
    let mut old = make_session("s1", "linux", 999);
    old.summary = "old title".to_string();
    old.last_prompt = "old prompt".to_string();
    old.terminals = vec![TerminalLocation::new("tmux", "%9")];
    store.write(&old).unwrap();

    let ctx = FakeContext::new(0);
    let s = written(handle_event(&store, &event("s1", "SessionStart"), &ctx).unwrap());

    assert_eq!(s.pid, 0);
    assert!(s.summary.is_empty());
    assert!(s.last_prompt.is_empty());
    assert!(s.terminals.is_empty());
    assert_eq!(*ctx.seen.borrow(), vec![(Vec::new(), true)]);
}

#[test]
fn test_resumed_session_replaces_old_id() {
    let (_dir, store) = temp_store();
    store.write(&make_session("old", "linux", 500)).unwrap();
    store.write(&make_session("other", "windows", 500)).unwrap();

    handle_event(&store, &event("new", "SessionStart"), &FakeContext::new(500)).unwrap();

    assert!(store.load("old").is_none());
    assert!(store.load("other").is_some());
    assert_eq!(store.load("new").unwrap().pid, 500);
}

#[test]
fn test_session_end_sweeps_dead_records() {
    let (_dir, store) = temp_store();
    store.write(&make_session("dead", "linux", 77)).unwrap();
    store.write(&make_session("alive", "linux", 88)).unwrap();
    store.write(&make_session("remote", "windows", 99)).unwrap();
    store.write(&make_session("me", "linux", 88)).unwrap();

    handle_event(&store, &event("me", "SessionEnd"), &FakeContext::new(88)).unwrap();

    let mut left: Vec<String> = store.load_all().into_iter().map(|s| s.session_id).collect();
    left.sort();
    assert_eq!(left, vec!["alive", "remote"]);
}

#[test]
fn test_session_end_for_unknown_session() {
    let (_dir, store) = temp_store();
    let outcome =
        handle_event(&store, &event("ghost", "SessionEnd"), &FakeContext::new(1)).unwrap();
    assert_eq!(outcome, HookOutcome::Removed);
}

#[test]
fn test_missing_session_id() {
    let (_dir, store) = temp_store();
    let err = handle_event(&store, &event("", "Stop"), &FakeContext::new(1)).unwrap_err();
    assert!(matches!(err, HookError::MissingSessionId));
    assert!(!store.dir().exists());
}

#[test]
fn test_session_id_cannot_leave_the_directory() {
    let (dir, store) = temp_store();
    std::fs::create_dir_all(store.dir()).unwrap();
    let outside = dir.path().join("escaped.json");
    std::fs::write(&outside, "{}").unwrap();

    for id in ["../escaped", "a/b", "a\\b", "..", "nul\0id"] {
        for name in ["Stop", "SessionEnd"] {
            let err = handle_event(&store, &event(id, name), &FakeContext::new(1)).unwrap_err();
            assert!(matches!(err, HookError::InvalidSessionId(_)), "{id:?}");
        }
    }
    // the file next to the directory is neither replaced nor deleted
    assert_eq!(std::fs::read_to_string(&outside).unwrap(), "{}");
    assert!(store.load_all().is_empty());
}

#[test]
fn test_read_input() {
    let raw = r#"{"session_id":"s1","hook_event_name":"Stop","extra":{"a":1}}"#;
    let parsed = read_input(raw.as_bytes()).unwrap();
    assert_eq!(parsed.session_id, "s1");
    assert_eq!(parsed.event(), HookEvent::Stop);

    assert!(matches!(
        read_input("not json".as_bytes()),
        Err(HookError::Parse(_))
    ));
}
