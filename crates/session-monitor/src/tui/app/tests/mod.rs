pub(crate) use super::*;
pub(crate) use crate::tui::test_utils::make_app;
pub(crate) use crate::Status;


/// Writes a working session owned by `pid` under `project`.
pub(crate) fn write_session(
    store_dir: &std::path::Path,
    id: &str,
    project: &str,
    pid: i64,
) -> Session {
    let mut s = Session::new(id, project);
    s.status = Status::Working;
    s.detail = "Bash: make".to_string();
    s.os = "linux".to_string();
    s.pid = pid;
    SessionStore::new(store_dir).write(&s).unwrap();
    s
}
