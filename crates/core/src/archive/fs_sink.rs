//! Filesystem recording sink.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::info;

use super::{ArchiveError, RecordingSink};

/// Archives recordings under `<root>/<date>/worker-<id>.<ext>`.
///
/// The same keying an object-store sink would use, kept on local disk.
pub struct FsRecordingSink {
    root: PathBuf,
    date: NaiveDate,
}

impl FsRecordingSink {
    /// Create a sink rooted at `root`, keyed by the run's booking date.
    pub fn new(root: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self {
            root: root.into(),
            date,
        }
    }

    fn destination(&self, worker: u32, recording: &Path) -> PathBuf {
        let ext = recording
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("log");
        self.root
            .join(self.date.to_string())
            .join(format!("worker-{}.{}", worker, ext))
    }
}

#[async_trait]
impl RecordingSink for FsRecordingSink {
    fn name(&self) -> &str {
        "fs"
    }

    async fn archive(&self, worker: u32, recording: &Path) -> Result<PathBuf, ArchiveError> {
        if !recording.exists() {
            return Err(ArchiveError::Rejected(format!(
                "recording does not exist: {}",
                recording.display()
            )));
        }

        let dest = self.destination(worker, recording);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(recording, &dest).await?;

        info!(worker, dest = %dest.display(), "recording archived");
        Ok(dest)
    }
}
