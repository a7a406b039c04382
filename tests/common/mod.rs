#![allow(dead_code)]

use async_trait::async_trait;
use payrail::application::orchestrator::PayoutOrchestrator;
use payrail::config::AppConfig;
use payrail::domain::event::{PipelineEvent, RetryAuditEntry};
use payrail::domain::outcome::ExecutionReceipt;
use payrail::domain::ports::{
    EventSink, PaymentExecutor, PaymentExecutorRef, RetryAuditStore, TransientError,
};
use payrail::domain::request::{Amount, PayoutRequest, TransactionId, Urgency};
use payrail::error::{PayoutError, Result};
use payrail::infrastructure::in_memory::{InMemoryEventStore, InMemoryRetryAuditStore};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

pub fn zero_wallet() -> String {
    format!("0x{}", "0".repeat(40))
}

pub fn request(wallet: &str) -> PayoutRequest {
    PayoutRequest::new(
        wallet,
        Amount::new(dec!(100)).unwrap(),
        "USDC",
        "KE",
        Urgency::Normal,
    )
}

/// Configuration with a millisecond backoff so retry tests stay fast.
pub fn fast_config(max_attempts: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.retry.max_attempts = max_attempts;
    config.retry.backoff_ms = 1;
    config.retry.max_backoff_ms = 1;
    config
}

pub struct Harness {
    pub orchestrator: Arc<PayoutOrchestrator>,
    pub events: Arc<InMemoryEventStore>,
    pub audit: Arc<InMemoryRetryAuditStore>,
}

pub fn harness(config: &AppConfig, executor: PaymentExecutorRef) -> Harness {
    let events = Arc::new(InMemoryEventStore::new());
    let audit = Arc::new(InMemoryRetryAuditStore::new());
    let orchestrator = Arc::new(PayoutOrchestrator::from_config(
        config,
        executor,
        events.clone(),
        audit.clone(),
    ));
    Harness {
        orchestrator,
        events,
        audit,
    }
}

/// Executor whose every attempt fails.
pub struct AlwaysFailingExecutor;

#[async_trait]
impl PaymentExecutor for AlwaysFailingExecutor {
    async fn attempt(
        &self,
        _transaction_id: &TransactionId,
        _rail: &str,
        _amount: Decimal,
    ) -> std::result::Result<ExecutionReceipt, TransientError> {
        Err(TransientError::new("rail timeout"))
    }
}

/// Sink that rejects every write, standing in for an unavailable log store.
pub struct BrokenSink;

#[async_trait]
impl EventSink for BrokenSink {
    async fn append(&self, _event: PipelineEvent) -> Result<()> {
        Err(PayoutError::Io(std::io::Error::other("disk full")))
    }

    async fn list_recent(&self, _limit: usize) -> Result<Vec<PipelineEvent>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl RetryAuditStore for BrokenSink {
    async fn record_retry(&self, _entry: RetryAuditEntry) -> Result<()> {
        Err(PayoutError::Io(std::io::Error::other("disk full")))
    }

    async fn list_recent_retries(&self, _limit: usize) -> Result<Vec<RetryAuditEntry>> {
        Ok(Vec::new())
    }
}
