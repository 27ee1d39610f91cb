//! Tests for frame rendering and click correlation.

use super::*;
use crate::aggregate::group_by_project;
use chrono::TimeZone;

mod click;
mod layout;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn session(id: &str, project: &str, status: Status) -> Session {
    let mut s = Session::new(id, project);
    s.status = status;
    s.last_activity = "2026-03-01T11:59:30Z".to_string();
    s
}

fn ctx(width: u16) -> RenderContext {
    RenderContext::new(width, DisplayOptions::default(), now())
}

fn sample_groups() -> Vec<ProjectGroup> {
    let mut a = session("aaaa1111-2222", "/home/me/api", Status::Working);
    a.last_prompt = "fix bug".to_string();
    a.detail = "Bash: ls -la".to_string();
    a.pid = 4321;
    let mut b = session("bbbb1111-2222", "/home/me/api", Status::Idle);
    b.detail = "Finished responding".to_string();
    let mut c = session("cccc1111-2222", "/home/me/web", Status::Waiting);
    c.detail = "Permission needed".to_string();
    c.summary = "Refactor router".to_string();
    group_by_project(vec![a, b, c])
}
