//! Data-directory layout and tasks-file IO.
//!
//! The whole collection lives in one JSON array under a fixed, versioned
//! file name. Reads fail open (anything unreadable loads as an empty
//! collection); writes are atomic and serialized across processes.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};
use crate::task::Task;

/// Fixed name of the tasks file inside the data directory. The version
/// suffix is part of the key: a future format change gets a new file name
/// instead of an in-place migration.
pub const TASKS_FILE: &str = "tasks.v1.json";

/// Paths and file IO under the tb data directory.
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.data_dir.join(TASKS_FILE)
    }

    /// Read the full task collection.
    ///
    /// Fails open: a missing file, an unreadable file, or contents that do
    /// not parse as a task array all yield an empty collection. The next
    /// successful mutation replaces whatever is on disk.
    pub fn read_tasks(&self) -> Vec<Task> {
        let path = self.tasks_path();
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "tasks file unreadable, starting empty"
                    );
                }
                return Vec::new();
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(tasks) => tasks,
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "tasks file malformed, starting empty"
                );
                Vec::new()
            }
        }
    }

    /// Persist the full task collection under the fixed key.
    ///
    /// Writes atomically while holding the cross-process lock, so a
    /// concurrent reader sees either the old array or the new one.
    pub fn write_tasks(&self, tasks: &[Task]) -> Result<()> {
        let serialized = serde_json::to_vec_pretty(tasks)?;
        lock::write_atomic_locked(self.tasks_path(), &serialized, DEFAULT_LOCK_TIMEOUT_MS)
    }
}
