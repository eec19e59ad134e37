// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while setting up or running the directory watch.
///
/// The first three variants are setup failures and end the process.
/// `Subsystem` is reported by the watcher after setup and is only logged.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create watcher: {0}")]
    Watcher(#[source] notify::Error),

    #[error("failed to watch directory {}: {source}", .path.display())]
    Register {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("{0}")]
    Subsystem(#[from] notify::Error),

    #[error("failed to write event line: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T, E = WatchError> = std::result::Result<T, E>;
