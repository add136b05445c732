//! Transaction requests and receipts
//!
//! A `TxRequest` is what the orchestrator hands to the signer; a `TxReceipt`
//! is what comes back after a single await. `settle` turns a receipt (or a
//! failed submission) into either a `TransactionResult` or a `FailureCause`.

use std::fmt;

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use serde::{Deserialize, Serialize};
use weir_core::{RpcError, TxHash};

/// Unsigned contract call submitted by the connected account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRequest {
    pub from: Address,
    pub to: Address,
    /// Native value attached to the call, in wei
    pub value: U256,
    /// ABI-encoded calldata
    pub data: Bytes,
}

impl TxRequest {
    /// Encode `call` against the contract at `to`
    pub fn contract_call<C: SolCall>(from: Address, to: Address, call: &C) -> Self {
        Self {
            from,
            to,
            value: U256::ZERO,
            data: Bytes::from(call.abi_encode()),
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// First four bytes of the calldata
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.data.get(..4).and_then(|s| s.try_into().ok())
    }
}

/// Lifecycle of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Submitted,
    Confirmed,
    Reverted,
    /// Never mined within the receipt timeout
    Dropped,
}

/// Receipt returned by the signer for a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revert_reason: Option<String>,
}

impl TxReceipt {
    pub fn confirmed(tx_hash: TxHash, block_number: u64) -> Self {
        Self {
            tx_hash,
            status: TxStatus::Confirmed,
            block_number: Some(block_number),
            gas_used: None,
            revert_reason: None,
        }
    }

    pub fn reverted(tx_hash: TxHash, revert_reason: Option<String>) -> Self {
        Self {
            tx_hash,
            status: TxStatus::Reverted,
            block_number: None,
            gas_used: None,
            revert_reason,
        }
    }

    pub fn dropped(tx_hash: TxHash) -> Self {
        Self {
            tx_hash,
            status: TxStatus::Dropped,
            block_number: None,
            gas_used: None,
            revert_reason: None,
        }
    }
}

/// Outcome of a transaction that landed successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
}

/// Why a submitted (or attempted) transaction did not land
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureCause {
    /// Mined but reverted
    Reverted {
        tx_hash: TxHash,
        reason: Option<String>,
    },
    /// Submitted but never mined
    Dropped { tx_hash: TxHash },
    /// Refused before submission (wallet rejection, gas estimation revert)
    Rejected { message: String },
    /// Node or transport failure while submitting or awaiting
    Transport { message: String },
}

impl FailureCause {
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Reverted { tx_hash, .. } | Self::Dropped { tx_hash } => Some(*tx_hash),
            Self::Rejected { .. } | Self::Transport { .. } => None,
        }
    }

    /// Revert reason, if the chain gave one
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Reverted { reason, .. } => reason.as_deref(),
            Self::Rejected { message } => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reverted { tx_hash, reason } => match reason {
                Some(r) => write!(f, "transaction {} reverted: {}", tx_hash, r),
                None => write!(f, "transaction {} reverted", tx_hash),
            },
            Self::Dropped { tx_hash } => write!(f, "transaction {} was dropped", tx_hash),
            Self::Rejected { message } => write!(f, "transaction rejected: {}", message),
            Self::Transport { message } => write!(f, "transport failure: {}", message),
        }
    }
}

impl From<RpcError> for FailureCause {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Rejected { message } => Self::Rejected { message },
            other => Self::Transport {
                message: other.to_string(),
            },
        }
    }
}

/// Resolve the outcome of a single send into a result or a failure cause.
pub fn settle(
    outcome: Result<TxReceipt, RpcError>,
) -> Result<TransactionResult, FailureCause> {
    let receipt = outcome.map_err(FailureCause::from)?;
    match receipt.status {
        TxStatus::Confirmed => Ok(TransactionResult {
            tx_hash: receipt.tx_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        }),
        TxStatus::Reverted => Err(FailureCause::Reverted {
            tx_hash: receipt.tx_hash,
            reason: receipt.revert_reason,
        }),
        TxStatus::Submitted | TxStatus::Dropped => Err(FailureCause::Dropped {
            tx_hash: receipt.tx_hash,
        }),
    }
}
