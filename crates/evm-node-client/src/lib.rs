//! evm-node-client: JSON-RPC node access with capability detection
//!
//! This crate provides the chain capabilities the protocol layer is written
//! against (`ChainReader`, `TransactionSender`) and a node-backed
//! implementation of both.

pub mod capabilities;
pub mod chain;

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use alloy::network::{Ethereum, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{PendingTransactionError, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::{RpcError as TransportRpcError, TransportErrorKind};
use async_trait::async_trait;
use evm_tx::{decode_revert_data, TxReceipt, TxRequest};
use weir_core::{ChainConfig, RpcError};

pub use capabilities::{CapabilityTier, NodeCapabilities};
pub use chain::{call_contract, ChainReader, TransactionSender};

/// Result type for node client operations
pub type Result<T> = std::result::Result<T, RpcError>;

type SharedProvider = Arc<dyn Provider<Ethereum> + Send + Sync>;
type TransportError = TransportRpcError<TransportErrorKind>;

/// JSON-RPC node client
#[derive(Clone)]
pub struct NodeClient {
    provider: SharedProvider,
    url: String,
    expected_chain_id: u64,
    request_timeout: Duration,
    receipt_timeout: Duration,
}

impl NodeClient {
    /// Create a client for the configured endpoint without probing it
    pub fn new(config: &ChainConfig) -> Result<Self> {
        let url: reqwest::Url = config
            .rpc_url
            .parse()
            .map_err(|e| RpcError::InvalidUrl(format!("{}: {}", config.rpc_url, e)))?;

        let provider: SharedProvider = Arc::new(ProviderBuilder::new().connect_http(url));

        Ok(Self {
            provider,
            url: config.rpc_url.clone(),
            expected_chain_id: config.chain_id(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            receipt_timeout: Duration::from_secs(config.receipt_timeout_secs),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Probe the node for its chain and signing account
    pub async fn probe_capabilities(&self) -> NodeCapabilities {
        let caps = self.detect_capabilities().await;
        tracing::info!(
            url = %self.url,
            tier = caps.capability_tier.as_str(),
            chain_id = ?caps.chain_id,
            "Node capabilities detected"
        );
        caps
    }

    async fn detect_capabilities(&self) -> NodeCapabilities {
        let chain_id = match self.timed(self.provider.get_chain_id()).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Node probe failed");
                return NodeCapabilities::offline(self.expected_chain_id);
            }
        };

        let block_number = self.timed(self.provider.get_block_number()).await.ok();
        let account = self.account().await.ok().flatten();

        NodeCapabilities {
            is_online: true,
            chain_id: Some(chain_id),
            expected_chain_id: self.expected_chain_id,
            block_number,
            account: account.map(|a| a.to_string()),
            capability_tier: capabilities::classify(
                chain_id,
                self.expected_chain_id,
                account.is_some(),
            ),
        }
    }

    /// Apply the request timeout and map transport failures
    async fn timed<T>(
        &self,
        fut: impl Future<Output = std::result::Result<T, TransportError>>,
    ) -> Result<T> {
        tokio::time::timeout(self.request_timeout, fut)
            .await
            .map_err(|_| RpcError::Timeout {
                seconds: self.request_timeout.as_secs(),
            })?
            .map_err(|e| self.read_error(e))
    }

    fn read_error(&self, err: TransportError) -> RpcError {
        match err {
            TransportRpcError::Transport(kind) => RpcError::Unreachable {
                url: format!("{}: {}", self.url, kind),
            },
            TransportRpcError::DeserError { err, .. } => RpcError::Decode(err.to_string()),
            other => RpcError::Node {
                message: other.to_string(),
            },
        }
    }

    /// An error payload on submission means the node or wallet refused the
    /// transaction (gas estimation revert, user rejection).
    fn send_error(&self, err: TransportError) -> RpcError {
        match err {
            TransportRpcError::ErrorResp(payload) => {
                let reason = payload
                    .as_revert_data()
                    .and_then(|data| decode_revert_data(&data));
                RpcError::Rejected {
                    message: reason.unwrap_or_else(|| payload.message.to_string()),
                }
            }
            other => self.read_error(other),
        }
    }

    /// Replay a reverted transaction as a call at its block to recover the reason
    async fn replay_revert_reason(&self, tx: TransactionRequest, block: u64) -> Option<String> {
        let replay = self.provider.call(tx).block(block.into());
        match tokio::time::timeout(self.request_timeout, replay).await {
            Ok(Err(TransportRpcError::ErrorResp(payload))) => payload
                .as_revert_data()
                .and_then(|data| decode_revert_data(&data))
                .or_else(|| Some(payload.message.to_string())),
            _ => None,
        }
    }
}

fn transaction_request(from: Option<Address>, to: Address, value: U256, data: Bytes) -> TransactionRequest {
    let tx = TransactionRequest::default()
        .with_to(to)
        .with_value(value)
        .with_input(data);
    match from {
        Some(from) => tx.with_from(from),
        None => tx,
    }
}

#[async_trait]
impl ChainReader for NodeClient {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx = transaction_request(None, to, U256::ZERO, data);
        self.timed(self.provider.call(tx).into_future()).await
    }

    async fn native_balance(&self, account: Address) -> Result<U256> {
        self.timed(self.provider.get_balance(account).into_future())
            .await
    }
}

#[async_trait]
impl TransactionSender for NodeClient {
    async fn account(&self) -> Result<Option<Address>> {
        let accounts = self.timed(self.provider.get_accounts()).await?;
        Ok(accounts.first().copied())
    }

    async fn send(&self, request: TxRequest) -> Result<TxReceipt> {
        let tx = transaction_request(Some(request.from), request.to, request.value, request.data);

        let pending = tokio::time::timeout(
            self.request_timeout,
            self.provider.send_transaction(tx.clone()),
        )
        .await
        .map_err(|_| RpcError::Timeout {
            seconds: self.request_timeout.as_secs(),
        })?
        .map_err(|e| self.send_error(e))?;

        let tx_hash = *pending.tx_hash();
        tracing::debug!(%tx_hash, to = %request.to, "Transaction submitted");

        let receipt = match pending
            .with_timeout(Some(self.receipt_timeout))
            .get_receipt()
            .await
        {
            Ok(receipt) => receipt,
            Err(PendingTransactionError::TxWatcher(e)) => {
                tracing::warn!(%tx_hash, error = %e, "Transaction not mined before timeout");
                return Ok(TxReceipt::dropped(tx_hash));
            }
            Err(PendingTransactionError::TransportError(e)) => return Err(self.read_error(e)),
            Err(e) => {
                return Err(RpcError::Node {
                    message: e.to_string(),
                })
            }
        };

        let block_number = ReceiptResponse::block_number(&receipt);
        let gas_used = ReceiptResponse::gas_used(&receipt);

        if ReceiptResponse::status(&receipt) {
            tracing::debug!(%tx_hash, ?block_number, gas_used, "Transaction confirmed");
            let mut confirmed = TxReceipt::confirmed(tx_hash, block_number.unwrap_or_default());
            confirmed.gas_used = Some(gas_used);
            return Ok(confirmed);
        }

        let reason = match block_number {
            Some(block) => self.replay_revert_reason(tx, block).await,
            None => None,
        };
        tracing::warn!(%tx_hash, reason = ?reason, "Transaction reverted");

        let mut reverted = TxReceipt::reverted(tx_hash, reason);
        reverted.block_number = block_number;
        reverted.gas_used = Some(gas_used);
        Ok(reverted)
    }
}
