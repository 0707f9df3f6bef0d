//! Error types
//!
//! Defines the storage error taxonomy and the top-level service error.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::storage::Resource;

/// Storage module errors
///
/// Every filesystem-facing variant carries the entity id (or the root) and the
/// step that failed, so callers can log precisely without inspecting paths.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An id or sub-path would escape the storage root.
    #[error("invalid path {input:?}: {reason}")]
    InvalidPath { input: String, reason: &'static str },

    /// The storage root cannot be created or listed.
    #[error("storage root {} unavailable: {source}", .root.display())]
    StorageUnavailable {
        root: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A step of app creation failed. The directory may be left behind.
    #[error("create app {id}: {op}: {source}")]
    CreateFailed {
        id: String,
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// Recursive removal failed; the app is still indexed.
    #[error("prune app {id}: {source}")]
    DeleteFailed {
        id: String,
        #[source]
        source: io::Error,
    },

    /// Reading or writing one of an app's files failed.
    #[error("app {id}: {op} {resource}: {source}")]
    ResourceFailed {
        id: String,
        resource: Resource,
        op: &'static str,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    pub(crate) fn invalid_path(input: &str, reason: &'static str) -> Self {
        StorageError::InvalidPath {
            input: input.to_string(),
            reason,
        }
    }
}

/// General service error that encompasses all error types
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
