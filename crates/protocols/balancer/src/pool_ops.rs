//! Pool Lifecycle Operations
//!
//! Pool creation goes through the account's DSProxy, which delegate-calls
//! BActions so the new pool is created, bound, funded and finalized in a
//! single transaction. Exits go straight to the pool from the account.

use std::collections::HashSet;

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use bigdecimal::BigDecimal;
use evm_node_client::call_contract;
use evm_tx::{to_base_units, TransactionResult};
use weir_core::is_native;

use crate::client::{Balancer, Result};
use crate::constants::{bounds, IBActions, IBPool, IDSProxy};
use crate::state::{BalancerError, PoolCreation};

/// Pool parameters in base units, checked against BPool bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolParams {
    pub tokens: Vec<Address>,
    pub balances: Vec<U256>,
    pub weights: Vec<U256>,
    pub swap_fee: U256,
}

/// Scale and validate pool creation inputs.
///
/// Balances and weights are human amounts; `fee_fraction` is the swap fee as
/// a fraction of the trade (0.001 is 0.1%).
pub fn pool_params(
    tokens: &[Address],
    initial_balances: &[BigDecimal],
    weights: &[BigDecimal],
    fee_fraction: &BigDecimal,
) -> Result<PoolParams> {
    if tokens.len() != initial_balances.len() || tokens.len() != weights.len() {
        return Err(BalancerError::invalid(format!(
            "got {} tokens, {} balances and {} weights",
            tokens.len(),
            initial_balances.len(),
            weights.len()
        )));
    }
    if !(bounds::MIN_BOUND_TOKENS..=bounds::MAX_BOUND_TOKENS).contains(&tokens.len()) {
        return Err(BalancerError::invalid(format!(
            "a pool holds {} to {} tokens, got {}",
            bounds::MIN_BOUND_TOKENS,
            bounds::MAX_BOUND_TOKENS,
            tokens.len()
        )));
    }

    let mut seen = HashSet::new();
    for token in tokens {
        if *token == Address::ZERO || is_native(token) {
            return Err(BalancerError::invalid(format!(
                "{} cannot be bound to a pool",
                token
            )));
        }
        if !seen.insert(*token) {
            return Err(BalancerError::invalid(format!("duplicate token {}", token)));
        }
    }

    let balances = initial_balances
        .iter()
        .map(to_base_units)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    if let Some(i) = balances.iter().position(|b| *b < bounds::MIN_BALANCE) {
        return Err(BalancerError::invalid(format!(
            "balance of {} is below the pool minimum",
            tokens[i]
        )));
    }

    let weights = weights
        .iter()
        .map(to_base_units)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    if let Some(i) = weights
        .iter()
        .position(|w| *w < bounds::MIN_WEIGHT || *w > bounds::MAX_WEIGHT)
    {
        return Err(BalancerError::invalid(format!(
            "weight of {} must be between 1 and 50",
            tokens[i]
        )));
    }
    let total_weight = weights.iter().fold(U256::ZERO, |acc, w| acc.saturating_add(*w));
    if total_weight > bounds::MAX_TOTAL_WEIGHT {
        return Err(BalancerError::invalid("total weight must not exceed 50"));
    }

    let swap_fee = to_base_units(fee_fraction)?;
    if swap_fee < bounds::MIN_FEE || swap_fee > bounds::MAX_FEE {
        return Err(BalancerError::invalid(format!(
            "swap fee {} must be between 0.000001 and 0.1",
            fee_fraction
        )));
    }

    Ok(PoolParams {
        tokens: tokens.to_vec(),
        balances,
        weights,
        swap_fee,
    })
}

impl Balancer {
    /// Create and finalize a pool through the account's proxy
    pub async fn create_pool(
        &self,
        tokens: &[Address],
        initial_balances: &[BigDecimal],
        weights: &[BigDecimal],
        fee_fraction: &BigDecimal,
    ) -> Result<PoolCreation> {
        let params = pool_params(tokens, initial_balances, weights, fee_fraction)?;

        let account = self.account().await?;
        let proxy = self.ensure_proxy(account).await?;

        let contracts = &self.config.contracts;
        let create = IBActions::createCall {
            factory: contracts.bfactory,
            tokens: params.tokens,
            balances: params.balances,
            weights: params.weights,
            swapFee: params.swap_fee,
            finalize: true,
        };
        let execute = IDSProxy::executeCall {
            target: contracts.bactions,
            data: Bytes::from(create.abi_encode()),
        };

        tracing::info!(
            %account,
            %proxy,
            tokens = tokens.len(),
            swap_fee = %params.swap_fee,
            "Creating pool"
        );

        let result = self
            .submit(account, proxy, &execute, U256::ZERO)
            .await
            .map_err(|cause| {
                tracing::warn!(%cause, "Pool creation failed");
                BalancerError::PoolOperation {
                    operation: "create",
                    cause,
                }
            })?;

        Ok(PoolCreation { proxy, result })
    }

    /// Redeem the account's whole share of `pool`
    pub async fn exit_pool(&self, pool: Address) -> Result<TransactionResult> {
        if pool == Address::ZERO {
            return Err(BalancerError::invalid("pool address must not be zero"));
        }
        let account = self.account().await?;

        let share = call_contract(
            self.reader.as_ref(),
            pool,
            &IBPool::balanceOfCall { owner: account },
        )
        .await?;
        if share.is_zero() {
            return Err(BalancerError::invalid(format!(
                "{} holds no shares of pool {}",
                account, pool
            )));
        }

        let tokens = call_contract(self.reader.as_ref(), pool, &IBPool::getCurrentTokensCall {})
            .await?;

        tracing::info!(%account, %pool, %share, tokens = tokens.len(), "Exiting pool");

        let call = IBPool::exitPoolCall {
            poolAmountIn: share,
            minAmountsOut: vec![U256::ZERO; tokens.len()],
        };
        self.submit(account, pool, &call, U256::ZERO)
            .await
            .map_err(|cause| BalancerError::PoolOperation {
                operation: "exit",
                cause,
            })
    }
}
