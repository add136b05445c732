//! Node capability detection
//!
//! Probes the node for reachability, chain id and an unlocked account.

use serde::{Deserialize, Serialize};

/// What the connected node lets us do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CapabilityTier {
    /// On the expected chain with an account able to sign
    Signing,
    /// On the expected chain, no account exposed
    ReadOnly,
    /// Reachable but serving a different chain
    WrongChain,
    Offline,
}

impl CapabilityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signing => "Signing",
            Self::ReadOnly => "ReadOnly",
            Self::WrongChain => "WrongChain",
            Self::Offline => "Offline",
        }
    }
}

/// Node capabilities detected through probing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeCapabilities {
    /// Node is reachable and responding
    pub is_online: bool,

    /// Chain id reported by the node
    pub chain_id: Option<u64>,

    /// Chain id the configuration expects
    pub expected_chain_id: u64,

    /// Latest block number
    pub block_number: Option<u64>,

    /// First account exposed by `eth_accounts`
    pub account: Option<String>,

    pub capability_tier: CapabilityTier,
}

impl NodeCapabilities {
    pub fn offline(expected_chain_id: u64) -> Self {
        Self {
            is_online: false,
            chain_id: None,
            expected_chain_id,
            block_number: None,
            account: None,
            capability_tier: CapabilityTier::Offline,
        }
    }

    pub fn chain_matches(&self) -> bool {
        self.chain_id == Some(self.expected_chain_id)
    }
}

/// Classify probe results into a tier
pub fn classify(chain_id: u64, expected_chain_id: u64, has_account: bool) -> CapabilityTier {
    if chain_id != expected_chain_id {
        CapabilityTier::WrongChain
    } else if has_account {
        CapabilityTier::Signing
    } else {
        CapabilityTier::ReadOnly
    }
}
