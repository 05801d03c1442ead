// File-backed task store

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::filter::TaskFilter;
use crate::task::{Priority, Status, Task};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Durable, file-backed collection of [`Task`] records.
///
/// The backing file is a single pretty-printed JSON array and is the sole
/// durable representation; every mutating operation is a full
/// load-mutate-persist cycle, and nothing is cached between operations.
/// Mutations hold an exclusive advisory lock on a sidecar `.lock` file so
/// that concurrent invocations cannot lose each other's writes.
pub struct TaskStore {
    path: PathBuf,
}

/// Result of [`TaskStore::complete`].
///
/// Completing an already-completed task is a no-op, reported distinctly
/// from a fresh completion rather than as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum CompleteOutcome {
    Completed(Task),
    AlreadyCompleted(Task),
}

impl TaskStore {
    /// Open a store backed by the data file named in `config`.
    ///
    /// The file itself is created lazily on the first mutation; only its
    /// parent directory is created here.
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_at(&config.data_file)
    }

    /// Open a store backed by an explicit file path.
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| StoreError::Persistence {
                action: "create the directory for",
                path: path.to_path_buf(),
                source,
            })?;
        }

        debug!(path = %path.display(), "Opened task store");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List the tasks matching `filter`, in insertion order.
    ///
    /// A missing or empty backing file is an empty store, not an error.
    pub fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let tasks = self.load_all()?;
        Ok(tasks.into_iter().filter(|t| filter.matches(t)).collect())
    }

    /// Add a new pending task and persist the updated collection.
    ///
    /// The description is validated before any file I/O, so a rejected add
    /// leaves the backing file untouched.
    pub fn add(
        &self,
        description: &str,
        priority: Priority,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Task> {
        let description = description.trim();
        if description.is_empty() {
            return Err(StoreError::Validation(
                "description cannot be empty".to_string(),
            ));
        }

        let _lock = self.lock()?;
        let mut tasks = self.load_all()?;

        let task = Task {
            id: next_id(&tasks),
            description: description.to_string(),
            priority,
            status: Status::Pending,
            created_at: Utc::now(),
            completed_at: None,
            due_date,
        };

        tasks.push(task.clone());
        self.persist(&tasks)?;

        info!(id = task.id, "Added task");
        Ok(task)
    }

    /// Mark the task with `id` as completed.
    ///
    /// Completed is terminal: completing an already-completed task leaves
    /// `completed_at` unchanged and reports [`CompleteOutcome::AlreadyCompleted`].
    pub fn complete(&self, id: u64) -> Result<CompleteOutcome> {
        let _lock = self.lock()?;
        let mut tasks = self.load_all()?;

        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if task.is_completed() {
            debug!(id, "Task already completed");
            return Ok(CompleteOutcome::AlreadyCompleted(task.clone()));
        }

        task.status = Status::Completed;
        task.completed_at = Some(Utc::now());
        let completed = task.clone();

        self.persist(&tasks)?;

        info!(id, "Completed task");
        Ok(CompleteOutcome::Completed(completed))
    }

    /// Remove the task with `id` from the store.
    ///
    /// Ids are assigned from the highest id ever stored, so a deleted id is
    /// never reused.
    pub fn delete(&self, id: u64) -> Result<Task> {
        let _lock = self.lock()?;
        let mut tasks = self.load_all()?;

        let pos = tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let removed = tasks.remove(pos);
        self.persist(&tasks)?;

        info!(id, "Deleted task");
        Ok(removed)
    }

    fn load_all(&self) -> Result<Vec<Task>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|source| StoreError::Persistence {
            action: "read",
            path: self.path.clone(),
            source,
        })?;

        // An empty file means an empty store, same as a missing one.
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&contents).map_err(|source| StoreError::CorruptStore {
            path: self.path.clone(),
            source,
        })
    }

    /// Overwrite the backing file with the full collection.
    ///
    /// Writes to a temporary file in the same directory and renames it over
    /// the original, so a failed write can never leave a half-written
    /// document behind.
    fn persist(&self, tasks: &[Task]) -> Result<()> {
        let json =
            serde_json::to_string_pretty(tasks).map_err(|source| StoreError::Persistence {
                action: "encode",
                path: self.path.clone(),
                source: source.into(),
            })?;

        let tmp_path = self.path.with_extension("json.tmp");

        let write_tmp = |path: &Path| -> std::io::Result<()> {
            let mut file = File::create(path)?;
            file.write_all(json.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()
        };

        write_tmp(&tmp_path).map_err(|source| StoreError::Persistence {
            action: "write",
            path: tmp_path.clone(),
            source,
        })?;

        fs::rename(&tmp_path, &self.path).map_err(|source| StoreError::Persistence {
            action: "replace",
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), count = tasks.len(), "Persisted tasks");
        Ok(())
    }

    /// Take an exclusive advisory lock for the duration of a mutation.
    /// Released when the returned guard is dropped.
    fn lock(&self) -> Result<StoreLock> {
        let lock_path = self.path.with_extension("lock");

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)
            .map_err(|source| StoreError::Persistence {
                action: "open the lock file for",
                path: lock_path.clone(),
                source,
            })?;

        file.lock_exclusive()
            .map_err(|source| StoreError::Persistence {
                action: "lock",
                path: lock_path,
                source,
            })?;

        Ok(StoreLock { _file: file })
    }
}

/// Guard holding the advisory lock; the lock is released when the file
/// handle is dropped.
struct StoreLock {
    _file: File,
}

fn next_id(tasks: &[Task]) -> u64 {
    tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
}
