use crate::error::PayoutError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Represents a strictly positive payout amount in the source currency.
///
/// Zero and negative amounts are rejected at construction, so every accepted
/// `PayoutRequest` carries a usable amount.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PayoutError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PayoutError::Validation("Amount must be positive".to_string()))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PayoutError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Correlation key for one payout across every stage and retry.
///
/// Formatted as `tx_<ULID>`: the ULID carries a millisecond timestamp plus 80
/// random bits, so ids generated concurrently in one process do not collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn generate() -> Self {
        Self(format!("tx_{}", Ulid::new()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TransactionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// How fast the payout must settle. Anything other than `"high"` is normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Normal,
    High,
}

impl From<String> for Urgency {
    fn from(value: String) -> Self {
        if value == "high" {
            Urgency::High
        } else {
            Urgency::Normal
        }
    }
}

/// Chain whose address grammar the destination wallet must follow.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Chain {
    #[default]
    Ethereum,
    Tron,
    Unsupported(String),
}

impl From<String> for Chain {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" | "ethereum" => Chain::Ethereum,
            "tron" => Chain::Tron,
            _ => Chain::Unsupported(value),
        }
    }
}

impl From<Chain> for String {
    fn from(chain: Chain) -> Self {
        match chain {
            Chain::Ethereum => "ethereum".to_string(),
            Chain::Tron => "tron".to_string(),
            Chain::Unsupported(other) => other,
        }
    }
}

/// An inbound payout instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRequest {
    pub wallet_address: String,
    pub amount: Amount,
    pub currency: String,
    pub destination_country: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub chain: Chain,
}

impl PayoutRequest {
    pub fn new(
        wallet_address: impl Into<String>,
        amount: Amount,
        currency: impl Into<String>,
        destination_country: impl Into<String>,
        urgency: Urgency,
    ) -> Self {
        Self {
            wallet_address: wallet_address.into(),
            amount,
            currency: currency.into(),
            destination_country: destination_country.into(),
            urgency,
            chain: Chain::default(),
        }
    }

    pub fn with_chain(mut self, chain: Chain) -> Self {
        self.chain = chain;
        self
    }
}
