use super::*;

/// Result of background work, delivered to the event loop.
#[derive(Debug)]
pub(crate) enum Update {
    /// Session id to checked process, from a liveness check.
    Liveness(HashMap<String, CheckedProcess>),
    /// Outcome of a click-to-focus.
    Focused {
        project: String,
        result: Result<(), String>,
    },
}

impl App {
    pub(crate) fn apply_update(&mut self, update: Update, now: Instant) {
        match update {
            Update::Liveness(alive) => {
                let dead = alive.values().filter(|c| !c.alive).count();
                tracing::debug!(checked = alive.len(), dead, "liveness check finished");
                self.alive = alive;
                self.liveness_running = false;
                self.reload(now);
            }
            Update::Focused { project, result } => match result {
                Ok(()) => tracing::debug!("focused {}", project),
                Err(e) => {
                    tracing::warn!("failed to focus {}: {}", project, e);
                    self.set_status_message(format!("Switch failed: {}", e), now);
                }
            },
        }
    }
}
