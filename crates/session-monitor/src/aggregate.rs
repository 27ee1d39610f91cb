//! Read-only loading of the session directory into a grouped view.

use crate::liveness::{apply_liveness, LivenessDetector};
use crate::session::Session;
use crate::store::SessionStore;
use crate::Status;
use std::collections::BTreeMap;

/// Sessions sharing one project path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectGroup {
    pub project: String,
    pub sessions: Vec<Session>,
}

/// Groups sessions by project path.
///
/// Groups are ordered by path and sessions within a group by id, so layout
/// is stable across refreshes.
pub fn group_by_project(sessions: Vec<Session>) -> Vec<ProjectGroup> {
    let mut grouped: BTreeMap<String, Vec<Session>> = BTreeMap::new();
    for session in sessions {
        grouped
            .entry(session.project.clone())
            .or_default()
            .push(session);
    }

    grouped
        .into_iter()
        .map(|(project, mut sessions)| {
            sessions.sort_by(|a, b| a.session_id.cmp(&b.session_id));
            ProjectGroup { project, sessions }
        })
        .collect()
}

/// Reads every session, marks dead ones exited when a detector is given,
/// and groups the result. Never modifies the directory.
pub fn load_view(store: &SessionStore, detector: Option<&LivenessDetector>) -> Vec<ProjectGroup> {
    let mut sessions = store.load_all();
    if let Some(detector) = detector {
        let alive = detector.detect(&sessions);
        apply_liveness(&mut sessions, &alive);
    }
    group_by_project(sessions)
}

/// Per-status totals for the summary bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub working: usize,
    pub waiting: usize,
    pub idle: usize,
    pub starting: usize,
    pub exited: usize,
}

impl StatusCounts {
    pub fn from_sessions<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> Self {
        let mut counts = Self::default();
        for session in sessions {
            match session.status {
                Status::Working => counts.working += 1,
                Status::Waiting => counts.waiting += 1,
                Status::Idle => counts.idle += 1,
                Status::Starting => counts.starting += 1,
                Status::Exited => counts.exited += 1,
                Status::Ended | Status::Unknown => {}
            }
        }
        counts
    }

    pub fn from_groups(groups: &[ProjectGroup]) -> Self {
        Self::from_sessions(groups.iter().flat_map(|g| g.sessions.iter()))
    }
}
