use crate::domain::event::{PipelineEvent, RetryAuditEntry};
use crate::domain::ports::{EventSink, RetryAuditStore};
use crate::domain::request::TransactionId;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory event log.
///
/// Uses `Arc<RwLock<Vec<PipelineEvent>>>`; appends take the write lock, so the
/// insertion order is the order in which tasks appended.
#[derive(Default, Clone)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<Vec<PipelineEvent>>>,
}

impl InMemoryEventStore {
    /// Creates a new, empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events of one transaction in the order they were appended.
    pub async fn events_for(&self, transaction_id: &TransactionId) -> Vec<PipelineEvent> {
        let events = self.events.read().await;
        events
            .iter()
            .filter(|event| &event.transaction_id == transaction_id)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl EventSink for InMemoryEventStore {
    async fn append(&self, event: PipelineEvent) -> Result<()> {
        let mut events = self.events.write().await;
        events.push(event);
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<PipelineEvent>> {
        let events = self.events.read().await;
        Ok(events.iter().rev().take(limit).cloned().collect())
    }
}

/// A thread-safe in-memory retry audit log.
#[derive(Default, Clone)]
pub struct InMemoryRetryAuditStore {
    entries: Arc<RwLock<Vec<RetryAuditEntry>>>,
}

impl InMemoryRetryAuditStore {
    /// Creates a new, empty in-memory retry audit store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RetryAuditStore for InMemoryRetryAuditStore {
    async fn record_retry(&self, entry: RetryAuditEntry) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.push(entry);
        Ok(())
    }

    async fn list_recent_retries(&self, limit: usize) -> Result<Vec<RetryAuditEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }
}
