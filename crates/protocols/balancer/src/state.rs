//! Balancer State Types
//!
//! Routes, quotes, indexed pools and the protocol error taxonomy.

use std::fmt;

use alloy::primitives::{Address, U256};
use bigdecimal::BigDecimal;
use evm_tx::{FailureCause, TransactionResult, UnitError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use weir_core::RpcError;

use crate::constants::{describe_revert, IExchangeProxy};

/// Which side of a trade the caller fixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapSide {
    /// Spend an exact input, receive at least a minimum output
    ExactIn,
    /// Receive an exact output, spend at most a maximum input
    ExactOut,
}

impl SwapSide {
    /// Swap type name understood by the routing oracle
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactIn => "swapExactIn",
            Self::ExactOut => "swapExactOut",
        }
    }
}

impl fmt::Display for SwapSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hop through one pool (ExchangeProxy `Swap` struct)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapHop {
    pub pool: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub swap_amount: U256,
    pub limit_return_amount: U256,
    pub max_price: U256,
}

impl From<&SwapHop> for IExchangeProxy::Swap {
    fn from(hop: &SwapHop) -> Self {
        Self {
            pool: hop.pool,
            tokenIn: hop.token_in,
            tokenOut: hop.token_out,
            swapAmount: hop.swap_amount,
            limitReturnAmount: hop.limit_return_amount,
            maxPrice: hop.max_price,
        }
    }
}

/// Execution route returned by the routing oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Parallel sequences of chained hops
    pub sequences: Vec<Vec<SwapHop>>,
    /// Expected output for `ExactIn`, expected input for `ExactOut`
    pub return_amount: U256,
    pub spot_price: BigDecimal,
}

impl Route {
    pub fn hop_count(&self) -> usize {
        self.sequences.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.hop_count() == 0
    }

    /// Sequences in the shape the ExchangeProxy expects
    pub fn swap_sequences(&self) -> Vec<Vec<IExchangeProxy::Swap>> {
        self.sequences
            .iter()
            .map(|sequence| sequence.iter().map(IExchangeProxy::Swap::from).collect())
            .collect()
    }
}

/// Priced trade, ready to submit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapQuote {
    pub side: SwapSide,
    pub token_in: Address,
    pub token_out: Address,
    /// Fixed amount in base units (input for `ExactIn`, output for `ExactOut`)
    pub amount: U256,
    /// Oracle estimate for the other side, in base units
    pub return_amount: U256,
    /// Minimum output (`ExactIn`) or maximum input (`ExactOut`) after slippage
    pub limit_amount: U256,
    pub max_slippage: BigDecimal,
    pub route: Route,
}

/// Token bound to an indexed pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolToken {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
    pub balance: BigDecimal,
    pub denorm_weight: BigDecimal,
}

/// Pool as reported by the indexer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    pub address: Address,
    pub tokens: Vec<PoolToken>,
    pub swap_fee: BigDecimal,
    pub total_weight: BigDecimal,
    pub total_shares: BigDecimal,
    pub liquidity: BigDecimal,
    pub finalized: bool,
    pub public_swap: bool,
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<&str> = self.tokens.iter().map(|t| t.symbol.as_str()).collect();
        write!(
            f,
            "Pool {} | {} | fee {} | liquidity {}",
            self.address,
            symbols.join("/"),
            self.swap_fee,
            self.liquidity
        )
    }
}

/// An account's share of a pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolShare {
    pub pool_id: String,
    pub balance: BigDecimal,
}

/// Outcome of a pool creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolCreation {
    /// Proxy that executed the creation (and controls the pool)
    pub proxy: Address,
    pub result: TransactionResult,
}

/// Balancer protocol errors
#[derive(Debug, Error)]
pub enum BalancerError {
    #[error("Node error: {0}")]
    Rpc(#[from] RpcError),

    #[error("No account connected")]
    NoAccount,

    #[error("Invalid amount: {0}")]
    Units(#[from] UnitError),

    #[error("Invalid parameters: {reason}")]
    InvalidParams { reason: String },

    #[error("Approval of {token} for {spender} failed: {cause}")]
    Approval {
        token: Address,
        spender: Address,
        cause: FailureCause,
    },

    #[error("Proxy creation for {account} failed: {cause}")]
    ProxyCreation {
        account: Address,
        cause: FailureCause,
    },

    #[error("Routing oracle failed: {message}")]
    Oracle { message: String },

    #[error("No route from {token_in} to {token_out}")]
    NoRoute { token_in: Address, token_out: Address },

    #[error("Swap failed (minimum out {min_amount_out}): {cause}")]
    SwapExecution {
        min_amount_out: U256,
        route: Box<Route>,
        cause: FailureCause,
    },

    #[error("Wrapping native asset failed: {cause}")]
    Wrap { cause: FailureCause },

    #[error("Pool {operation} failed: {cause}")]
    PoolOperation {
        operation: &'static str,
        cause: FailureCause,
    },

    #[error("Pool indexer failed: {message}")]
    Indexer { message: String },
}

impl BalancerError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            reason: reason.into(),
        }
    }

    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Rpc(e) => e.error_code(),
            Self::NoAccount => "no_account",
            Self::Units(_) => "invalid_amount",
            Self::InvalidParams { .. } => "invalid_params",
            Self::Approval { .. } => "approval_failed",
            Self::ProxyCreation { .. } => "proxy_creation_failed",
            Self::Oracle { .. } => "oracle_error",
            Self::NoRoute { .. } => "no_route",
            Self::SwapExecution { .. } => "swap_failed",
            Self::Wrap { .. } => "wrap_failed",
            Self::PoolOperation { .. } => "pool_operation_failed",
            Self::Indexer { .. } => "indexer_error",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Units(_) | Self::InvalidParams { .. } => 400,
            Self::NoAccount => 401,
            Self::NoRoute { .. } => 404,
            Self::Approval { .. }
            | Self::ProxyCreation { .. }
            | Self::SwapExecution { .. }
            | Self::Wrap { .. }
            | Self::PoolOperation { .. } => 422,
            Self::Rpc(RpcError::Rejected { .. }) => 422,
            Self::Rpc(RpcError::Decode(_)) | Self::Oracle { .. } | Self::Indexer { .. } => 502,
            Self::Rpc(_) => 503,
        }
    }

    /// Failure cause of a transaction that did not land
    pub fn cause(&self) -> Option<&FailureCause> {
        match self {
            Self::Approval { cause, .. }
            | Self::ProxyCreation { cause, .. }
            | Self::SwapExecution { cause, .. }
            | Self::Wrap { cause }
            | Self::PoolOperation { cause, .. } => Some(cause),
            _ => None,
        }
    }

    /// Readable explanation of a pool revert, when the chain gave a known reason
    pub fn revert_hint(&self) -> Option<&'static str> {
        self.cause()
            .and_then(FailureCause::reason)
            .and_then(describe_revert)
    }
}
