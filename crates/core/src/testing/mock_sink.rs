//! Mock recording sink for tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::archive::{ArchiveError, RecordingSink};

/// Records every archive call instead of persisting anything.
#[derive(Debug, Default)]
pub struct MockRecordingSink {
    archived: Mutex<Vec<(u32, PathBuf)>>,
    fail: bool,
}

impl MockRecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every archive call fails; the report must not notice.
    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    /// All `(worker, recording)` pairs archived so far.
    pub fn archived(&self) -> Vec<(u32, PathBuf)> {
        self.archived.lock().expect("mock sink lock poisoned").clone()
    }
}

#[async_trait]
impl RecordingSink for MockRecordingSink {
    fn name(&self) -> &str {
        "mock"
    }

    async fn archive(&self, worker: u32, recording: &Path) -> Result<PathBuf, ArchiveError> {
        if self.fail {
            return Err(ArchiveError::Rejected("mock sink failure".to_string()));
        }
        self.archived
            .lock()
            .expect("mock sink lock poisoned")
            .push((worker, recording.to_path_buf()));
        Ok(recording.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_archive_calls() {
        let sink = MockRecordingSink::new();
        sink.archive(2, Path::new("/tmp/worker-2.jsonl"))
            .await
            .unwrap();

        let archived = sink.archived();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].0, 2);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let sink = MockRecordingSink::new().with_failure();
        assert!(sink.archive(1, Path::new("/tmp/x")).await.is_err());
        assert!(sink.archived().is_empty());
    }
}
