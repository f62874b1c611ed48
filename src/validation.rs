//! Syntactic wallet address checks. No checksum or on-chain lookups.

use regex::Regex;
use std::sync::LazyLock;

use crate::networks::{ChainFamily, NetworkDescriptor};

static EVM_ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("valid regex"));

// Base58 alphabet: no 0, O, I or l.
static SOLANA_ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").expect("valid regex"));

/// Whether `address` has the right shape for the network's chain family.
///
/// The address is matched as given; see [`sanitize_wallet_address`].
pub fn is_valid_wallet_address(address: &str, network: &NetworkDescriptor) -> bool {
    match network.civic_chain {
        ChainFamily::Solana => SOLANA_ADDRESS_RE.is_match(address),
        ChainFamily::Ethereum => EVM_ADDRESS_RE.is_match(address),
    }
}

/// Trimmed, lowercased address. Never applied implicitly before validation.
pub fn sanitize_wallet_address(address: &str) -> String {
    address.trim().to_lowercase()
}

pub fn expected_format(family: ChainFamily) -> &'static str {
    match family {
        ChainFamily::Solana => "Base58 encoded address (32-44 characters)",
        ChainFamily::Ethereum => "0x followed by 40 hexadecimal characters",
    }
}
