use crate::domain::outcome::ExecutionReceipt;
use crate::domain::ports::{PaymentExecutor, TransientError};
use crate::domain::request::TransactionId;
use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;

/// Stand-in payment rail that fails a fixed number of times per transaction.
///
/// The first `failures_before_success` attempts for a transaction id return a
/// `TransientError`; every later attempt succeeds.
#[derive(Debug, Default)]
pub struct SimulatedPaymentExecutor {
    failures_before_success: u32,
    attempts: DashMap<TransactionId, u32>,
}

impl SimulatedPaymentExecutor {
    pub fn new(failures_before_success: u32) -> Self {
        Self {
            failures_before_success,
            attempts: DashMap::new(),
        }
    }

    /// Attempts seen so far for a transaction.
    pub fn attempts(&self, transaction_id: &TransactionId) -> u32 {
        self.attempts
            .get(transaction_id)
            .map(|count| *count)
            .unwrap_or(0)
    }
}

#[async_trait]
impl PaymentExecutor for SimulatedPaymentExecutor {
    async fn attempt(
        &self,
        transaction_id: &TransactionId,
        rail: &str,
        amount: Decimal,
    ) -> Result<ExecutionReceipt, TransientError> {
        let attempt = {
            let mut count = self.attempts.entry(transaction_id.clone()).or_insert(0);
            *count += 1;
            *count
        };

        if attempt <= self.failures_before_success {
            return Err(TransientError::new(format!("Simulated failure #{attempt}")));
        }

        Ok(ExecutionReceipt {
            transaction_id: transaction_id.clone(),
            rail: rail.to_string(),
            amount,
            reference: format!("sim-{transaction_id}-{attempt}"),
            attempts: attempt,
        })
    }
}
