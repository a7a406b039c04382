use crate::config::FxConfig;
use crate::error::{PayoutError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Amount after conversion together with the rate that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub converted_amount: Decimal,
    pub rate: Decimal,
}

/// Converts amounts using a static table of (source, target) rates.
///
/// Pairs are directional: a `USDC -> KES` entry does not imply `KES -> USDC`.
#[derive(Debug, Clone, Default)]
pub struct RateConverter {
    rates: HashMap<(String, String), Decimal>,
}

impl RateConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &FxConfig) -> Self {
        let mut converter = Self::new();
        for entry in &config.rates {
            converter = converter.with_rate(&entry.source, &entry.target, entry.rate);
        }
        converter
    }

    pub fn with_rate(mut self, source: &str, target: &str, rate: Decimal) -> Self {
        self.rates
            .insert((source.to_string(), target.to_string()), rate);
        self
    }

    pub fn rate(&self, source: &str, target: &str) -> Option<Decimal> {
        self.rates
            .get(&(source.to_string(), target.to_string()))
            .copied()
    }

    /// Converts `amount`, rounding half-up to two decimal places.
    ///
    /// Fails with `ConversionOutOfRange` when the product overflows or rounds
    /// down to zero.
    pub fn convert(&self, amount: Decimal, source: &str, target: &str) -> Result<ConversionResult> {
        let rate = self
            .rate(source, target)
            .ok_or_else(|| PayoutError::ConversionUnavailable {
                from: source.to_string(),
                to: target.to_string(),
            })?;

        let converted_amount = amount
            .checked_mul(rate)
            .map(|product| product.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
            .filter(|converted| *converted > Decimal::ZERO)
            .ok_or(PayoutError::ConversionOutOfRange { amount, rate })?;

        Ok(ConversionResult {
            converted_amount,
            rate,
        })
    }
}
