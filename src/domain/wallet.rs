use super::request::Chain;
use regex::Regex;
use std::sync::LazyLock;

static ETHEREUM_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A0x[a-fA-F0-9]{40}\z").expect("valid ethereum pattern"));
static TRON_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\AT[a-zA-Z0-9]{33}\z").expect("valid tron pattern"));

/// Checks wallet addresses against the grammar of their chain.
///
/// This is a syntactic check only; no checksum or signature is verified.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalletValidator;

impl WalletValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, address: &str, chain: &Chain) -> bool {
        match chain {
            Chain::Ethereum => ETHEREUM_ADDRESS.is_match(address),
            Chain::Tron => TRON_ADDRESS.is_match(address),
            Chain::Unsupported(_) => false,
        }
    }
}
