use crate::domain::event::{PipelineEvent, RetryAuditEntry};
use crate::domain::ports::{EventSink, RetryAuditStore};
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

/// File holding one JSON-encoded `PipelineEvent` per line.
pub const EVENTS_FILE: &str = "events.jsonl";
/// File holding one JSON-encoded `RetryAuditEntry` per line.
pub const RETRIES_FILE: &str = "retries.jsonl";

/// Append-only JSON-lines store under a data directory.
///
/// Writes to each file are serialised through a mutex so lines never
/// interleave and events keep their append order.
pub struct JsonlStore {
    events_path: PathBuf,
    retries_path: PathBuf,
    events_lock: Mutex<()>,
    retries_lock: Mutex<()>,
}

impl JsonlStore {
    /// Opens (and creates if needed) the data directory.
    pub async fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;
        Ok(Self {
            events_path: dir.join(EVENTS_FILE),
            retries_path: dir.join(RETRIES_FILE),
            events_lock: Mutex::new(()),
            retries_lock: Mutex::new(()),
        })
    }

    pub fn events_path(&self) -> &Path {
        &self.events_path
    }

    async fn append_line<T: Serialize>(path: &Path, lock: &Mutex<()>, value: &T) -> Result<()> {
        let mut line = serde_json::to_vec(value)?;
        line.push(b'\n');

        let _guard = lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }

    /// Reads the last `limit` parseable lines, newest first.
    async fn read_recent<T: DeserializeOwned>(path: &Path, limit: usize) -> Result<Vec<T>> {
        let contents = match fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut records = Vec::new();
        for line in contents.lines().rev() {
            if records.len() == limit {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(err) => warn!(path = %path.display(), error = %err, "Skipping malformed log line"),
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl EventSink for JsonlStore {
    async fn append(&self, event: PipelineEvent) -> Result<()> {
        Self::append_line(&self.events_path, &self.events_lock, &event).await
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<PipelineEvent>> {
        Self::read_recent(&self.events_path, limit).await
    }
}

#[async_trait]
impl RetryAuditStore for JsonlStore {
    async fn record_retry(&self, entry: RetryAuditEntry) -> Result<()> {
        Self::append_line(&self.retries_path, &self.retries_lock, &entry).await
    }

    async fn list_recent_retries(&self, limit: usize) -> Result<Vec<RetryAuditEntry>> {
        Self::read_recent(&self.retries_path, limit).await
    }
}
