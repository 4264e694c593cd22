use std::path::PathBuf;
use thiserror::Error;

/// Failure of a synchronization call.
///
/// Branch inspection problems never show up here: they are treated as a
/// missing branch and lead to a re-clone instead.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid repository source: {0:?}")]
    InvalidSource(String),

    #[error("failed to clone {url} into {}", .path.display())]
    Clone {
        url: String,
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to update {} to origin/{branch}", .path.display())]
    Update {
        path: PathBuf,
        branch: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to remove stale working copy {}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to lock {}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
