//! Account balances and token allowances
//!
//! Every read goes to the chain; nothing is cached.

use alloy::primitives::{Address, U256};
use bigdecimal::BigDecimal;
use evm_node_client::call_contract;
use evm_tx::{from_base_units, TransactionResult};
use futures::future::try_join_all;
use weir_core::constants::MAX_UINT256;
use weir_core::is_native;

use crate::client::{Balancer, Result};
use crate::constants::IERC20;
use crate::state::BalancerError;

impl Balancer {
    /// Balance of `token` held by `account`, in human units
    pub async fn get_balance(&self, token: Address, account: Address) -> Result<BigDecimal> {
        let raw = if is_native(&token) {
            self.reader.native_balance(account).await?
        } else {
            call_contract(
                self.reader.as_ref(),
                token,
                &IERC20::balanceOfCall { owner: account },
            )
            .await?
        };
        Ok(from_base_units(raw))
    }

    /// Balances of several tokens, read concurrently, in input order
    pub async fn get_balances(
        &self,
        tokens: &[Address],
        account: Address,
    ) -> Result<Vec<BigDecimal>> {
        try_join_all(tokens.iter().map(|token| self.get_balance(*token, account))).await
    }

    /// Amount of `token` that `spender` may pull from `account`, in human units.
    /// The native asset needs no approval and reports an unlimited allowance.
    pub async fn get_allowance(
        &self,
        token: Address,
        account: Address,
        spender: Address,
    ) -> Result<BigDecimal> {
        if is_native(&token) {
            return Ok(from_base_units(MAX_UINT256));
        }

        let raw = call_contract(
            self.reader.as_ref(),
            token,
            &IERC20::allowanceCall {
                owner: account,
                spender,
            },
        )
        .await?;
        Ok(from_base_units(raw))
    }

    /// Approve `spender` for an unlimited amount of `token`
    pub async fn approve(&self, token: Address, spender: Address) -> Result<TransactionResult> {
        if is_native(&token) {
            return Err(BalancerError::invalid("the native asset cannot be approved"));
        }
        if spender == Address::ZERO {
            return Err(BalancerError::invalid("spender must not be the zero address"));
        }

        let account = self.account().await?;
        tracing::info!(%account, %token, %spender, "Approving token");

        let call = IERC20::approveCall {
            spender,
            amount: MAX_UINT256,
        };
        self.submit(account, token, &call, U256::ZERO)
            .await
            .map_err(|cause| {
                tracing::warn!(%token, %spender, %cause, "Approval failed");
                BalancerError::Approval {
                    token,
                    spender,
                    cause,
                }
            })
    }

    /// Approve both the exchange proxy (swaps) and the account's proxy
    /// (pool creation) for `token`, building the proxy if needed.
    pub async fn unlock_token(&self, token: Address) -> Result<Vec<TransactionResult>> {
        let account = self.account().await?;

        let exchange = self.approve(token, self.config.contracts.exchange_proxy).await?;
        let proxy = self.ensure_proxy(account).await?;
        let own_proxy = self.approve(token, proxy).await?;

        Ok(vec![exchange, own_proxy])
    }
}
