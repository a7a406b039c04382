use crate::config::ComplianceConfig;
use crate::error::{PayoutError, Result};
use std::collections::HashSet;

/// Static blocklist screening for wallets and destination countries.
///
/// A pass means "no known block", not legal clearance: this gate has no
/// sanctions-feed integration.
#[derive(Debug, Clone, Default)]
pub struct ComplianceGate {
    blocked_wallets: HashSet<String>,
    blocked_countries: HashSet<String>,
}

impl ComplianceGate {
    pub fn new<W, C>(blocked_wallets: W, blocked_countries: C) -> Self
    where
        W: IntoIterator<Item = String>,
        C: IntoIterator<Item = String>,
    {
        Self {
            blocked_wallets: blocked_wallets.into_iter().collect(),
            blocked_countries: blocked_countries
                .into_iter()
                .map(|country| country.to_uppercase())
                .collect(),
        }
    }

    pub fn from_config(config: &ComplianceConfig) -> Self {
        Self::new(
            config.blocked_wallets.iter().cloned(),
            config.blocked_countries.iter().cloned(),
        )
    }

    /// Returns `true` when the payout is allowed.
    pub fn check(&self, wallet: &str, country: &str) -> bool {
        !self.blocked_wallets.contains(wallet)
            && !self.blocked_countries.contains(&country.to_uppercase())
    }

    /// Like [`check`](Self::check), but names the matching rule on failure.
    pub fn screen(&self, wallet: &str, country: &str) -> Result<()> {
        if self.blocked_wallets.contains(wallet) {
            return Err(PayoutError::ComplianceBlocked(format!(
                "wallet {wallet} is blocklisted"
            )));
        }
        if self.blocked_countries.contains(&country.to_uppercase()) {
            return Err(PayoutError::ComplianceBlocked(format!(
                "destination country {country} is blocked"
            )));
        }
        Ok(())
    }
}
