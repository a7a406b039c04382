use super::request::TransactionId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Proof that one executor attempt moved the funds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    pub transaction_id: TransactionId,
    pub rail: String,
    pub amount: Decimal,
    /// Reference assigned by the rail.
    pub reference: String,
    /// Attempt number that succeeded, starting at 1.
    pub attempts: u32,
}

/// Terminal result of one payout request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PayoutOutcome {
    Success {
        transaction_id: TransactionId,
        rail: String,
        converted_amount: Decimal,
        rate: Decimal,
    },
    ValidationFailed {
        transaction_id: TransactionId,
        reason: String,
    },
    ComplianceBlocked {
        transaction_id: TransactionId,
        reason: String,
    },
    ConversionUnavailable {
        transaction_id: TransactionId,
        reason: String,
    },
    ExecutionFailed {
        transaction_id: TransactionId,
        attempts: u32,
        reason: String,
    },
}

impl PayoutOutcome {
    pub fn transaction_id(&self) -> &TransactionId {
        match self {
            PayoutOutcome::Success { transaction_id, .. }
            | PayoutOutcome::ValidationFailed { transaction_id, .. }
            | PayoutOutcome::ComplianceBlocked { transaction_id, .. }
            | PayoutOutcome::ConversionUnavailable { transaction_id, .. }
            | PayoutOutcome::ExecutionFailed { transaction_id, .. } => transaction_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PayoutOutcome::Success { .. })
    }

    /// HTTP-style status code a network front end should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            PayoutOutcome::Success { .. } => 200,
            PayoutOutcome::ValidationFailed { .. } | PayoutOutcome::ConversionUnavailable { .. } => 400,
            PayoutOutcome::ComplianceBlocked { .. } => 403,
            PayoutOutcome::ExecutionFailed { .. } => 502,
        }
    }

    /// Short status label: `success`, `fail` or `blocked`.
    pub fn status(&self) -> &'static str {
        match self {
            PayoutOutcome::Success { .. } => "success",
            PayoutOutcome::ComplianceBlocked { .. } => "blocked",
            _ => "fail",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            PayoutOutcome::Success { .. } => None,
            PayoutOutcome::ValidationFailed { reason, .. }
            | PayoutOutcome::ComplianceBlocked { reason, .. }
            | PayoutOutcome::ConversionUnavailable { reason, .. }
            | PayoutOutcome::ExecutionFailed { reason, .. } => Some(reason),
        }
    }
}
