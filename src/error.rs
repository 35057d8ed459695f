// Error types for the sgcache store.
// Separates failures to provision the database from per-operation I/O failures.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SgError {
    #[error("failed to open database at {}: {reason}", .path.display())]
    Initialization { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupted record for key {key:?}: {source}")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SgError {
    pub(crate) fn init(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        SgError::Initialization {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True when the database itself could not be opened or provisioned.
    pub fn is_initialization(&self) -> bool {
        matches!(self, SgError::Initialization { .. })
    }
}

pub type Result<T> = std::result::Result<T, SgError>;
