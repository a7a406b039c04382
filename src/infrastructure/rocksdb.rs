use crate::domain::event::{PipelineEvent, RetryAuditEntry};
use crate::domain::ports::{EventSink, RetryAuditStore};
use crate::error::{PayoutError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Column Family for storing pipeline events.
pub const CF_EVENTS: &str = "events";
/// Column Family for storing retry audit entries.
pub const CF_RETRIES: &str = "retries";

/// A persistent store implementation using RocksDB.
///
/// Events and retry entries live in separate Column Families keyed by a
/// big-endian sequence number, so key order is append order and a reverse
/// iterator yields the most recent records first.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>` and counters).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    next_event: Arc<AtomicU64>,
    next_retry: Arc<AtomicU64>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("events" and "retries") exist and
    /// resumes the sequence counters after the last stored key.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_events = ColumnFamilyDescriptor::new(CF_EVENTS, Options::default());
        let cf_retries = ColumnFamilyDescriptor::new(CF_RETRIES, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_events, cf_retries])?;

        let next_event = Self::next_sequence(&db, CF_EVENTS)?;
        let next_retry = Self::next_sequence(&db, CF_RETRIES)?;

        Ok(Self {
            db: Arc::new(db),
            next_event: Arc::new(AtomicU64::new(next_event)),
            next_retry: Arc::new(AtomicU64::new(next_retry)),
        })
    }

    fn missing_cf(name: &str) -> PayoutError {
        PayoutError::Storage(Box::new(std::io::Error::other(format!(
            "Column family {name} not found"
        ))))
    }

    fn next_sequence(db: &DB, cf_name: &str) -> Result<u64> {
        let cf = db.cf_handle(cf_name).ok_or_else(|| Self::missing_cf(cf_name))?;
        match db.iterator_cf(cf, IteratorMode::End).next() {
            Some(item) => {
                let (key, _value) = item?;
                let bytes: [u8; 8] = key.as_ref().try_into().map_err(|_| {
                    PayoutError::Storage(Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Unexpected key length in {cf_name}"),
                    )))
                })?;
                Ok(u64::from_be_bytes(bytes) + 1)
            }
            None => Ok(0),
        }
    }

    fn put<T: Serialize>(&self, cf_name: &str, counter: &AtomicU64, value: &T) -> Result<()> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| Self::missing_cf(cf_name))?;
        let key = counter.fetch_add(1, Ordering::SeqCst).to_be_bytes();
        let value = serde_json::to_vec(value)?;
        self.db.put_cf(&cf, key, value)?;
        Ok(())
    }

    fn recent<T: DeserializeOwned>(&self, cf_name: &str, limit: usize) -> Result<Vec<T>> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| Self::missing_cf(cf_name))?;

        let mut records = Vec::with_capacity(limit.min(1024));
        for item in self.db.iterator_cf(cf, IteratorMode::End).take(limit) {
            let (_key, value) = item?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl EventSink for RocksDBStore {
    async fn append(&self, event: PipelineEvent) -> Result<()> {
        self.put(CF_EVENTS, &self.next_event, &event)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<PipelineEvent>> {
        self.recent(CF_EVENTS, limit)
    }
}

#[async_trait]
impl RetryAuditStore for RocksDBStore {
    async fn record_retry(&self, entry: RetryAuditEntry) -> Result<()> {
        self.put(CF_RETRIES, &self.next_retry, &entry)
    }

    async fn list_recent_retries(&self, limit: usize) -> Result<Vec<RetryAuditEntry>> {
        self.recent(CF_RETRIES, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{EventStatus, Stage};
    use crate::domain::request::TransactionId;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        // Verify CFs exist
        assert!(store.db.cf_handle(CF_EVENTS).is_some());
        assert!(store.db.cf_handle(CF_RETRIES).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_event_order_survives_reopen() {
        let dir = tempdir().unwrap();
        let tx_id = TransactionId::from("tx_1");

        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            store
                .append(PipelineEvent::new(tx_id.clone(), Stage::Received, EventStatus::Start, json!({})))
                .await
                .unwrap();
            store
                .append(PipelineEvent::new(tx_id.clone(), Stage::Fx, EventStatus::Success, json!({})))
                .await
                .unwrap();
        }

        let store = RocksDBStore::open(dir.path()).unwrap();
        store
            .append(PipelineEvent::new(tx_id.clone(), Stage::Routing, EventStatus::Selected, json!({})))
            .await
            .unwrap();

        let stages: Vec<Stage> = store
            .list_recent(10)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.stage)
            .collect();
        assert_eq!(stages, vec![Stage::Routing, Stage::Fx, Stage::Received]);
    }

    #[tokio::test]
    async fn test_rocksdb_retry_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        for attempt in 1..=3 {
            store
                .record_retry(RetryAuditEntry::new(TransactionId::from("tx_1"), "timeout", attempt))
                .await
                .unwrap();
        }

        let retries = store.list_recent_retries(2).await.unwrap();
        assert_eq!(retries.len(), 2);
        assert_eq!(retries[0].attempt, 3);
        assert_eq!(retries[1].attempt, 2);
    }
}
