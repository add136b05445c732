//! Balancer orchestrator
//!
//! Holds the chain capabilities and configuration every operation runs
//! against. Operations are implemented in their own modules as `impl Balancer`
//! blocks.

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use bigdecimal::BigDecimal;
use evm_node_client::{ChainReader, TransactionSender};
use evm_tx::{settle, FailureCause, TransactionResult, TxRequest};
use weir_core::ChainConfig;

use crate::proxy::ProxyManager;
use crate::sor::RouteOracle;
use crate::state::BalancerError;

/// Result type for Balancer operations
pub type Result<T> = std::result::Result<T, BalancerError>;

/// Orchestrates reads, approvals, swaps and pool operations for the
/// connected account.
#[derive(Clone)]
pub struct Balancer {
    pub(crate) config: Arc<ChainConfig>,
    pub(crate) reader: Arc<dyn ChainReader>,
    pub(crate) sender: Arc<dyn TransactionSender>,
    pub(crate) oracle: Arc<dyn RouteOracle>,
    pub(crate) proxies: ProxyManager,
}

impl Balancer {
    pub fn new(
        config: ChainConfig,
        reader: Arc<dyn ChainReader>,
        sender: Arc<dyn TransactionSender>,
        oracle: Arc<dyn RouteOracle>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            reader,
            sender,
            oracle,
            proxies: ProxyManager::default(),
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// The connected account, or `NoAccount`
    pub async fn account(&self) -> Result<Address> {
        self.sender.account().await?.ok_or(BalancerError::NoAccount)
    }

    /// Configured default slippage, validated
    pub fn default_slippage(&self) -> Result<BigDecimal> {
        let raw = &self.config.defaults.max_slippage;
        BigDecimal::from_str(raw)
            .map_err(|e| BalancerError::invalid(format!("default slippage '{}': {}", raw, e)))
    }

    /// Submit `call` to `to` from `from` and settle the single receipt.
    pub(crate) async fn submit<C: SolCall>(
        &self,
        from: Address,
        to: Address,
        call: &C,
        value: U256,
    ) -> std::result::Result<TransactionResult, FailureCause> {
        let request = TxRequest::contract_call(from, to, call).with_value(value);
        tracing::debug!(
            %from,
            %to,
            call = C::SIGNATURE,
            value = %value,
            "Submitting transaction"
        );
        settle(self.sender.send(request).await)
    }
}
