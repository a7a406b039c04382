use super::request::TransactionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Received,
    Validation,
    Compliance,
    Fx,
    Routing,
    Payout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Start,
    Success,
    Fail,
    Retry,
    Blocked,
    Selected,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Validation => "validation",
            Stage::Compliance => "compliance",
            Stage::Fx => "fx",
            Stage::Routing => "routing",
            Stage::Payout => "payout",
        };
        f.write_str(name)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventStatus::Start => "start",
            EventStatus::Success => "success",
            EventStatus::Fail => "fail",
            EventStatus::Retry => "retry",
            EventStatus::Blocked => "blocked",
            EventStatus::Selected => "selected",
        };
        f.write_str(name)
    }
}

/// One entry of the audit trail. Events are append-only and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub transaction_id: TransactionId,
    pub stage: Stage,
    pub status: EventStatus,
    pub timestamp: DateTime<Utc>,
    /// Stage-specific payload (request body, rejection reason, rate, rail...).
    pub detail: Value,
}

impl PipelineEvent {
    pub fn new(
        transaction_id: TransactionId,
        stage: Stage,
        status: EventStatus,
        detail: Value,
    ) -> Self {
        Self {
            transaction_id,
            stage,
            status,
            timestamp: Utc::now(),
            detail,
        }
    }
}

/// Persisted record of a failed payment attempt that was scheduled for retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryAuditEntry {
    pub transaction_id: TransactionId,
    pub reason: String,
    pub attempt: u32,
    pub timestamp: DateTime<Utc>,
}

impl RetryAuditEntry {
    pub fn new(transaction_id: TransactionId, reason: impl Into<String>, attempt: u32) -> Self {
        Self {
            transaction_id,
            reason: reason.into(),
            attempt,
            timestamp: Utc::now(),
        }
    }
}
