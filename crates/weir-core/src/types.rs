//! Core type definitions for Weir

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction hash
pub type TxHash = B256;

/// Network type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Kovan,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Kovan => "kovan",
        }
    }

    /// EIP-155 chain id
    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Mainnet => 1,
            Self::Kovan => 42,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Check whether an address is the native asset sentinel
pub fn is_native(address: &Address) -> bool {
    *address == constants::NATIVE_ASSET
}

/// Constants
pub mod constants {
    use alloy::primitives::{address, Address, U256};

    /// Decimal precision of every token handled by the protocol
    pub const TOKEN_PRECISION: u8 = 18;

    /// Sentinel the exchange proxy uses for the native asset
    pub const NATIVE_ASSET: Address = address!("0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

    /// Allowance granted by an unlimited approval
    pub const MAX_UINT256: U256 = U256::MAX;
}
