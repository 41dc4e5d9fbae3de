//! Local queue-directory sink.
//!
//! Each event lands as `{epoch_seconds}_{printer_id}.json`, ready for a
//! later upload pass. One event per printer per poll keeps names unique
//! within a second; a monotonic suffix covers the degenerate case.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use super::{Sink, SinkError};

/// Writes events into a queue directory.
#[derive(Debug)]
pub struct FileSink {
    queue_dir: PathBuf,
    collision_seq: AtomicU64,
}

impl FileSink {
    /// Create the sink, creating the queue directory if absent.
    pub fn new(queue_dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let queue_dir = queue_dir.into();
        std::fs::create_dir_all(&queue_dir).map_err(|e| {
            SinkError::new("file", "create_dir", "-", e.to_string(), false)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(&queue_dir, std::fs::Permissions::from_mode(0o755));
        }

        Ok(Self {
            queue_dir,
            collision_seq: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.queue_dir
    }

    fn event_path(&self, printer_id: &str) -> PathBuf {
        let epoch = Utc::now().timestamp();
        let path = self.queue_dir.join(format!("{epoch}_{printer_id}.json"));
        if !path.exists() {
            return path;
        }
        let seq = self.collision_seq.fetch_add(1, Ordering::Relaxed);
        self.queue_dir
            .join(format!("{epoch}_{printer_id}_{seq}.json"))
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn write(&self, data: &[u8], printer_id: &str) -> Result<(), SinkError> {
        if data.is_empty() {
            return Err(SinkError::new(
                "file",
                "write",
                printer_id,
                "empty event payload",
                false,
            ));
        }

        let path = self.event_path(printer_id);
        std::fs::write(&path, data)
            .map_err(|e| SinkError::new("file", "write", printer_id, e.to_string(), true))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644));
        }

        tracing::debug!(printer_id, path = %path.display(), "event queued");
        Ok(())
    }

    async fn close(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_write_creates_queue_file() {
        let dir = TempDir::new().unwrap();
        let sink = FileSink::new(dir.path().join("queue")).unwrap();

        sink.write(b"{\"schema_version\":\"1.0.0\"}", "10.0.0.5")
            .await
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(sink.dir()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let name = entries[0].as_ref().unwrap().file_name();
        let name = name.to_string_lossy().into_owned();
        assert!(name.ends_with("_10.0.0.5.json"));

        let content = std::fs::read(entries[0].as_ref().unwrap().path()).unwrap();
        assert_eq!(content, b"{\"schema_version\":\"1.0.0\"}");
    }

    #[tokio::test]
    async fn test_empty_payload_is_rejected() {
        let dir = TempDir::new().unwrap();
        let sink = FileSink::new(dir.path()).unwrap();

        let err = sink.write(b"", "10.0.0.5").await.unwrap_err();
        assert!(!err.retryable);
    }

    #[tokio::test]
    async fn test_same_second_collision_gets_suffix() {
        let dir = TempDir::new().unwrap();
        let sink = FileSink::new(dir.path()).unwrap();

        sink.write(b"{}", "p1").await.unwrap();
        sink.write(b"{}", "p1").await.unwrap();

        let count = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 2);
    }
}
