//! Archival of session recording artifacts.
//!
//! A sink persists a worker's recording after the worker is done. Archival
//! is strictly best-effort: a sink failure is logged by the caller and
//! never surfaces in the run report.

mod fs_sink;

pub use fs_sink::FsRecordingSink;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while archiving a recording.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive rejected: {0}")]
    Rejected(String),
}

/// Destination for session recording artifacts.
#[async_trait]
pub trait RecordingSink: Send + Sync {
    /// Sink name for logging.
    fn name(&self) -> &str;

    /// Persist `recording` for the given worker. Returns where it landed.
    async fn archive(&self, worker: u32, recording: &Path) -> Result<PathBuf, ArchiveError>;
}
