use super::event::{PipelineEvent, RetryAuditEntry};
use super::outcome::ExecutionReceipt;
use super::request::TransactionId;
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;

/// Append-only store of pipeline events.
///
/// Implementations must keep the append order of events sharing a transaction id.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn append(&self, event: PipelineEvent) -> Result<()>;
    /// Most recent first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<PipelineEvent>>;
}

#[async_trait]
pub trait RetryAuditStore: Send + Sync {
    async fn record_retry(&self, entry: RetryAuditEntry) -> Result<()>;
    /// Most recent first.
    async fn list_recent_retries(&self, limit: usize) -> Result<Vec<RetryAuditEntry>>;
}

/// A recoverable failure of one payment attempt.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{reason}")]
pub struct TransientError {
    pub reason: String,
}

impl TransientError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Performs a single money-movement attempt on a rail.
#[async_trait]
pub trait PaymentExecutor: Send + Sync {
    async fn attempt(
        &self,
        transaction_id: &TransactionId,
        rail: &str,
        amount: Decimal,
    ) -> std::result::Result<ExecutionReceipt, TransientError>;
}

pub type EventSinkRef = Arc<dyn EventSink>;
pub type RetryAuditStoreRef = Arc<dyn RetryAuditStore>;
pub type PaymentExecutorRef = Arc<dyn PaymentExecutor>;
