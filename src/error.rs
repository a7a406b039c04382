use crate::domain::request::TransactionId;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayoutError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Compliance blocked: {0}")]
    ComplianceBlocked(String),
    #[error("FX rate unavailable for {from} -> {to}")]
    ConversionUnavailable { from: String, to: String },
    #[error("Converted amount out of range: {amount} at rate {rate}")]
    ConversionOutOfRange { amount: Decimal, rate: Decimal },
    #[error("Execution failed after {attempts} attempts: {reason}")]
    ExecutionExhausted { attempts: u32, reason: String },
    #[error("Transaction {0} already has an attempt in flight")]
    AlreadyInFlight(TransactionId),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for PayoutError {
    fn from(err: rocksdb::Error) -> Self {
        PayoutError::Storage(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, PayoutError>;
