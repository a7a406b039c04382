use super::record_event;
use crate::config::RetryConfig;
use crate::domain::event::{EventStatus, PipelineEvent, RetryAuditEntry, Stage};
use crate::domain::outcome::ExecutionReceipt;
use crate::domain::ports::{EventSinkRef, PaymentExecutorRef, RetryAuditStoreRef};
use crate::domain::request::TransactionId;
use crate::error::{PayoutError, Result};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Bounds and pacing of payment re-attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Values below 1 are treated as 1.
    pub max_attempts: u32,
    pub backoff: Duration,
    /// 1 keeps the delay fixed; 2 doubles it after every retry.
    pub backoff_multiplier: u32,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
            backoff_multiplier: 1,
            max_backoff: backoff,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff: config.backoff(),
            backoff_multiplier: config.backoff_multiplier,
            max_backoff: config.max_backoff(),
        }
    }

    pub fn attempt_limit(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after the `failures`-th failed attempt.
    pub fn delay_for(&self, failures: u32) -> Duration {
        let factor = self
            .backoff_multiplier
            .max(1)
            .saturating_pow(failures.saturating_sub(1));
        self.backoff.saturating_mul(factor).min(self.max_backoff)
    }
}

/// Attempt bookkeeping for one in-flight transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryRecord {
    pub transaction_id: TransactionId,
    pub attempts: u32,
    pub last_failure: Option<String>,
}

impl RetryRecord {
    fn new(transaction_id: TransactionId) -> Self {
        Self {
            transaction_id,
            attempts: 0,
            last_failure: None,
        }
    }
}

/// Removes the in-flight record when the attempt sequence ends, including when
/// the owning future is dropped mid-backoff.
struct InFlightGuard<'a> {
    records: &'a DashMap<TransactionId, RetryRecord>,
    transaction_id: TransactionId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.records.remove(&self.transaction_id);
    }
}

/// Drives a [`PaymentExecutor`](crate::domain::ports::PaymentExecutor) until it
/// succeeds or the retry budget is spent.
///
/// Each transaction id moves through `Pending -> Retrying(n) -> Pending` and ends
/// in `Succeeded` or `Exhausted`. Records are kept in a sharded concurrent map,
/// so payouts with different ids never contend on a common lock.
pub struct RetryCoordinator {
    executor: PaymentExecutorRef,
    events: EventSinkRef,
    audit: RetryAuditStoreRef,
    policy: RetryPolicy,
    records: DashMap<TransactionId, RetryRecord>,
}

impl RetryCoordinator {
    pub fn new(
        executor: PaymentExecutorRef,
        events: EventSinkRef,
        audit: RetryAuditStoreRef,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            executor,
            events,
            audit,
            policy,
            records: DashMap::new(),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Snapshot of the record for a transaction that is currently executing.
    pub fn in_flight(&self, transaction_id: &TransactionId) -> Option<RetryRecord> {
        self.records
            .get(transaction_id)
            .map(|record| record.value().clone())
    }

    pub fn in_flight_count(&self) -> usize {
        self.records.len()
    }

    /// Executes the payment, retrying transient failures with backoff.
    ///
    /// Fails with `AlreadyInFlight` if another call is executing the same id and
    /// with `ExecutionExhausted` once `max_attempts` attempts have failed.
    pub async fn execute(
        &self,
        transaction_id: &TransactionId,
        rail: &str,
        amount: Decimal,
    ) -> Result<ExecutionReceipt> {
        let _guard = self.register(transaction_id)?;
        let limit = self.policy.attempt_limit();

        loop {
            match self.executor.attempt(transaction_id, rail, amount).await {
                Ok(receipt) => {
                    record_event(
                        self.events.as_ref(),
                        PipelineEvent::new(
                            transaction_id.clone(),
                            Stage::Payout,
                            EventStatus::Success,
                            json!({
                                "status": "success",
                                "rail": receipt.rail,
                                "reference": receipt.reference,
                                "attempts": receipt.attempts,
                            }),
                        ),
                    )
                    .await;
                    info!(
                        transaction_id = %transaction_id,
                        attempts = receipt.attempts,
                        "Payment executed"
                    );
                    return Ok(receipt);
                }
                Err(err) => {
                    let attempts = self.note_failure(transaction_id, &err.reason);
                    if attempts >= limit {
                        warn!(
                            transaction_id = %transaction_id,
                            attempts,
                            error = %err,
                            "Retry budget exhausted"
                        );
                        return Err(PayoutError::ExecutionExhausted {
                            attempts,
                            reason: err.reason,
                        });
                    }

                    record_event(
                        self.events.as_ref(),
                        PipelineEvent::new(
                            transaction_id.clone(),
                            Stage::Payout,
                            EventStatus::Retry,
                            json!({
                                "tx_id": transaction_id,
                                "error": err.reason,
                                "attempt": attempts,
                            }),
                        ),
                    )
                    .await;
                    let entry = RetryAuditEntry::new(transaction_id.clone(), &err.reason, attempts);
                    if let Err(audit_err) = self.audit.record_retry(entry).await {
                        warn!(transaction_id = %transaction_id, error = %audit_err, "Failed to record retry");
                    }

                    let delay = self.policy.delay_for(attempts);
                    warn!(
                        transaction_id = %transaction_id,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Payment attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    fn register(&self, transaction_id: &TransactionId) -> Result<InFlightGuard<'_>> {
        match self.records.entry(transaction_id.clone()) {
            Entry::Occupied(_) => Err(PayoutError::AlreadyInFlight(transaction_id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(RetryRecord::new(transaction_id.clone()));
                debug!(transaction_id = %transaction_id, "Registered in-flight payment");
                Ok(InFlightGuard {
                    records: &self.records,
                    transaction_id: transaction_id.clone(),
                })
            }
        }
    }

    fn note_failure(&self, transaction_id: &TransactionId, reason: &str) -> u32 {
        let mut record = self
            .records
            .entry(transaction_id.clone())
            .or_insert_with(|| RetryRecord::new(transaction_id.clone()));
        record.attempts += 1;
        record.last_failure = Some(reason.to_string());
        record.attempts
    }
}
