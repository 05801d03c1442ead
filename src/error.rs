// Error taxonomy for the store

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong inside [`crate::store::TaskStore`].
///
/// A missing backing file is deliberately not represented here: it means an
/// empty store, not a failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Bad input from the caller (empty description, malformed due date).
    #[error("invalid input: {0}")]
    Validation(String),

    /// The referenced task id is not in the store.
    #[error("no task with id {0}")]
    NotFound(u64),

    /// The backing file exists but cannot be decoded.
    #[error("task file {path:?} is corrupt")]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The backing file could not be read or written at the OS level.
    #[error("failed to {action} task file {path:?}")]
    Persistence {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
