//! Activity log
//!
//! A plain-text, append-only trail of every committed change, one line per
//! action: `[YYYY-MM-DD HH:MM:SS] <message>` in local time.
//!
//! Appending is fire-and-forget. A failed append is reported through
//! `tracing` and never fails the operation that produced it.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use tracing::warn;

use crate::storage::{Backend, StorageResult};

/// Document holding the log
pub const LOG_FILE: &str = "log.txt";

/// Append-only audit trail
#[derive(Clone)]
pub struct ActivityLog {
    backend: Arc<dyn Backend>,
}

impl ActivityLog {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Render one log line
    pub fn format_line(at: DateTime<Utc>, message: &str) -> String {
        format!(
            "[{}] {}",
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
            message
        )
    }

    /// Append a line for an action that happened at `at`
    pub fn record(&self, at: DateTime<Utc>, message: &str) {
        let line = Self::format_line(at, message);
        if let Err(e) = self.backend.append(LOG_FILE, &line) {
            warn!(error = %e, %message, "failed to append to activity log");
        }
    }

    /// All lines, oldest first
    pub fn entries(&self) -> StorageResult<Vec<String>> {
        let content = self.backend.read(LOG_FILE)?.unwrap_or_default();
        Ok(content.lines().map(str::to_string).collect())
    }

    /// Truncate the log to empty
    pub fn clear(&self) -> StorageResult<()> {
        self.backend.write(LOG_FILE, "")
    }
}
