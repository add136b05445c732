//! Chain access capabilities
//!
//! Everything above this crate talks to the chain through these two traits:
//! read-only `eth_call`s and balance lookups, and transactions sent from the
//! connected account. `NodeClient` implements both against a JSON-RPC node;
//! tests implement them against in-memory state.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use evm_tx::{TxReceipt, TxRequest};
use weir_core::RpcError;

/// Read-only access to chain state
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Execute a call against the latest block and return the raw return data
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, RpcError>;

    /// Native asset balance of `account`, in wei
    async fn native_balance(&self, account: Address) -> Result<U256, RpcError>;
}

/// Transaction submission from the connected account
#[async_trait]
pub trait TransactionSender: Send + Sync {
    /// The connected account, if the signer exposes one
    async fn account(&self) -> Result<Option<Address>, RpcError>;

    /// Submit `request` and wait for its receipt
    async fn send(&self, request: TxRequest) -> Result<TxReceipt, RpcError>;
}

/// Encode `call`, execute it against `to` and decode the typed return value.
pub async fn call_contract<R, C>(reader: &R, to: Address, call: &C) -> Result<C::Return, RpcError>
where
    R: ChainReader + ?Sized,
    C: SolCall + Sync,
{
    let data = reader.call(to, Bytes::from(call.abi_encode())).await?;
    C::abi_decode_returns(&data)
        .map_err(|e| RpcError::Decode(format!("{} on {}: {}", C::SIGNATURE, to, e)))
}
