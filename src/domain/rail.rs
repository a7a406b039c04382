use super::request::Urgency;
use crate::config::RailConfig;

/// Picks the settlement rail for a payout from its urgency.
#[derive(Debug, Clone)]
pub struct RailSelector {
    expedited: String,
    standard: String,
}

impl Default for RailSelector {
    fn default() -> Self {
        Self::from_config(&RailConfig::default())
    }
}

impl RailSelector {
    pub fn from_config(config: &RailConfig) -> Self {
        Self {
            expedited: config.expedited.clone(),
            standard: config.standard.clone(),
        }
    }

    pub fn select(&self, urgency: Urgency) -> &str {
        match urgency {
            Urgency::High => &self.expedited,
            Urgency::Normal => &self.standard,
        }
    }
}
