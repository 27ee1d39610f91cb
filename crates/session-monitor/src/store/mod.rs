//! One-file-per-session storage.
//!
//! Every session lives in `<dir>/<session_id>.json`. Writers replace files
//! atomically (temp file in the same directory, then rename), and readers
//! skip anything they cannot parse. No locks are taken; concurrent hook
//! processes race with last-write-wins semantics.
//!
//! Mutation is confined to the hook write path and the explicit
//! [`SessionStore::clean_all`]. Loading never changes the directory.

use crate::config::xdg::ensure_dir;
use crate::liveness::ProcessProbe;
use crate::session::{ProcessRef, Session};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Errors raised while writing to the session directory.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create sessions directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize session {session_id}: {source}")]
    Serialize {
        session_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Handle to a session directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns `true` if `session_id` names a file directly inside the
    /// directory: non-empty, no path separators, no `..`, no NUL.
    pub fn is_valid_id(session_id: &str) -> bool {
        !session_id.is_empty()
            && session_id != "."
            && !session_id.contains("..")
            && !session_id.contains(['/', '\\', '\0'])
    }

    /// Canonical file path for a session id.
    pub fn path_for(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", session_id))
    }

    /// Creates the session directory (mode 0700 on unix).
    pub fn ensure_dir(&self) -> Result<(), StoreError> {
        ensure_dir(&self.dir).map_err(|source| StoreError::CreateDir {
            path: self.dir.clone(),
            source,
        })
    }

    /// Loads every parseable session file.
    ///
    /// A missing or unreadable directory yields no sessions. Unreadable and
    /// malformed files are skipped; a concurrent writer or an older schema
    /// must never break a reader.
    pub fn load_all(&self) -> Vec<Session> {
        self.entries()
            .into_iter()
            .filter_map(|(_, session)| session)
            .collect()
    }

    /// Loads a single session, `None` if absent or unparseable.
    pub fn load(&self, session_id: &str) -> Option<Session> {
        read_session(&self.path_for(session_id))
    }

    /// Atomically replaces the file for `session`.
    pub fn write(&self, session: &Session) -> Result<(), StoreError> {
        let path = self.path_for(&session.session_id);
        let data =
            serde_json::to_vec_pretty(session).map_err(|source| StoreError::Serialize {
                session_id: session.session_id.clone(),
                source,
            })?;

        let write_err = |source| StoreError::Write {
            path: path.clone(),
            source,
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(&data).map_err(write_err)?;
        tmp.flush().map_err(write_err)?;

        tmp.persist(&path).map_err(|e| StoreError::Persist {
            path: path.clone(),
            source: e.error,
        })?;
        tracing::debug!(session_id = %session.session_id, status = %session.status, "session written");
        Ok(())
    }

    /// Removes the file for `session_id`. A missing file is not an error.
    pub fn remove(&self, session_id: &str) -> Result<(), StoreError> {
        remove_file(&self.path_for(session_id))
    }

    /// Removes records whose process is confirmed dead.
    ///
    /// Only records issued by `platform` (or untagged) with a known pid are
    /// probed; cross-platform checks are too expensive for the hook path.
    /// Returns the ids of the removed records.
    pub fn remove_dead(&self, probe: &dyn ProcessProbe, platform: &str) -> Vec<String> {
        let mut removed = Vec::new();
        for (path, session) in self.entries() {
            let Some(session) = session else { continue };
            let Some(process) = session.process() else {
                continue;
            };
            if !process.is_on(platform) {
                continue;
            }
            if probe.is_alive(process.pid) != Some(false) {
                continue;
            }
            match remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(session_id = %session.session_id, pid = process.pid, "removed dead session");
                    removed.push(session.session_id);
                }
                Err(e) => tracing::warn!("{}", e),
            }
        }
        removed
    }

    /// Removes every other record that belongs to `process`.
    ///
    /// A resumed session fires its begin event under a new id while the old
    /// id's file still names the same process. The record for `current_id`
    /// is never removed. Returns the ids of the removed records.
    pub fn remove_duplicates(&self, current_id: &str, process: &ProcessRef) -> Vec<String> {
        if process.pid <= 0 {
            return Vec::new();
        }
        let mut removed = Vec::new();
        for (path, session) in self.entries() {
            let Some(session) = session else { continue };
            if session.session_id == current_id {
                continue;
            }
            let same = session
                .process()
                .is_some_and(|other| other.same_process(process));
            if !same {
                continue;
            }
            match remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(session_id = %session.session_id, pid = process.pid, "removed duplicate session");
                    removed.push(session.session_id);
                }
                Err(e) => tracing::warn!("{}", e),
            }
        }
        removed
    }

    /// Deletes every session file, returning how many were removed.
    pub fn clean_all(&self) -> Result<usize, StoreError> {
        let mut count = 0;
        for (path, _) in self.entries() {
            remove_file(&path)?;
            count += 1;
        }
        Ok(count)
    }

    /// Lists `.json` files with their parsed contents, sorted by path.
    fn entries(&self) -> Vec<(PathBuf, Option<Session>)> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::debug!(dir = %self.dir.display(), "cannot read sessions directory: {}", e);
                }
                return Vec::new();
            }
        };

        let mut paths: Vec<PathBuf> = read_dir
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        paths
            .into_iter()
            .map(|path| {
                let session = read_session(&path);
                (path, session)
            })
            .collect()
    }
}

fn read_session(path: &Path) -> Option<Session> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::debug!(path = %path.display(), "skipping unreadable session file: {}", e);
            }
            return None;
        }
    };
    match serde_json::from_slice(&data) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::debug!(path = %path.display(), "skipping malformed session file: {}", e);
            None
        }
    }
}

fn remove_file(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StoreError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests;
