//! Error types for combat log tailing

use std::path::PathBuf;
use thiserror::Error;

/// Errors the tailer reports synchronously to its caller.
///
/// Read errors inside the worker loop are transient and never surface here.
#[derive(Debug, Error)]
pub enum TailerError {
    #[error("no combat log configured")]
    NoLogPath,

    #[error("combat log {path} does not exist")]
    LogMissing { path: PathBuf },

    #[error("failed to read directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("previous combat log worker is still shutting down")]
    WorkerBusy,

    #[error("failed to spawn combat log worker")]
    Spawn(#[source] std::io::Error),
}
