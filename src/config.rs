//! Runtime configuration.
//!
//! Every section has defaults matching the reference deployment, so an empty
//! configuration is valid. Values are layered: struct defaults, then an optional
//! TOML file, then `PAYRAIL_`-prefixed environment variables using `__` for
//! nesting (`PAYRAIL_RETRY__MAX_ATTEMPTS=3`).

use crate::error::Result;
use config::{Config, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub retry: RetryConfig,
    pub compliance: ComplianceConfig,
    pub fx: FxConfig,
    pub rails: RailConfig,
    pub executor: ExecutorConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads configuration from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("PAYRAIL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per payout, including the first one.
    pub max_attempts: u32,
    pub backoff_ms: u64,
    /// Growth factor applied to the delay after each retry; 1 keeps it fixed.
    pub backoff_multiplier: u32,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_ms: 1_000,
            backoff_multiplier: 1,
            max_backoff_ms: 30_000,
        }
    }
}

impl RetryConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    pub blocked_wallets: Vec<String>,
    pub blocked_countries: Vec<String>,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            blocked_wallets: vec!["0xblockedwallet".to_string()],
            blocked_countries: vec!["IRN".to_string(), "RUS".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub source: String,
    pub target: String,
    pub rate: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    /// Currency every payout is converted to before execution.
    pub settlement_currency: String,
    pub rates: Vec<RateEntry>,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            settlement_currency: "KES".to_string(),
            rates: vec![RateEntry {
                source: "USDC".to_string(),
                target: "KES".to_string(),
                rate: dec!(142.00),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RailConfig {
    pub expedited: String,
    pub standard: String,
}

impl Default for RailConfig {
    fn default() -> Self {
        Self {
            expedited: "expedited rail".to_string(),
            standard: "standard rail".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Attempts the simulated executor fails per transaction before succeeding.
    pub failures_before_success: u32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            failures_before_success: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { max_concurrency: 16 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
