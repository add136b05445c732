//! Route & Swap Executor
//!
//! Prices a trade through the routing oracle, bounds it by the caller's
//! slippage tolerance and submits it to the ExchangeProxy in one
//! transaction. The native asset is traded through its sentinel address;
//! the oracle is asked about the wrapped token because pools only hold that.

use alloy::primitives::{Address, U256};
use bigdecimal::BigDecimal;
use evm_tx::{slippage_ceil, slippage_floor, to_base_units, TransactionResult};
use weir_core::is_native;

use crate::client::{Balancer, Result};
use crate::constants::{IExchangeProxy, IWETH};
use crate::sor::validate_route;
use crate::state::{BalancerError, SwapQuote, SwapSide};

/// Validated trade inputs, computed before any network access
#[derive(Debug, Clone)]
struct TradeParams {
    side: SwapSide,
    token_in: Address,
    token_out: Address,
    oracle_in: Address,
    oracle_out: Address,
    amount: U256,
    max_slippage: BigDecimal,
}

impl Balancer {
    /// Token the routing oracle knows `token` as
    fn oracle_token(&self, token: Address) -> Address {
        if is_native(&token) {
            self.config.contracts.weth
        } else {
            token
        }
    }

    fn resolve_slippage(&self, max_slippage: Option<&BigDecimal>) -> Result<BigDecimal> {
        let slippage = match max_slippage {
            Some(s) => s.clone(),
            None => self.default_slippage()?,
        };
        if slippage < BigDecimal::from(0) || slippage >= BigDecimal::from(1) {
            return Err(BalancerError::invalid(format!(
                "max slippage must be in [0, 1), got {}",
                slippage
            )));
        }
        Ok(slippage)
    }

    fn trade_params(
        &self,
        token_in: Address,
        token_out: Address,
        amount: &BigDecimal,
        side: SwapSide,
        max_slippage: Option<&BigDecimal>,
    ) -> Result<TradeParams> {
        let max_slippage = self.resolve_slippage(max_slippage)?;

        if token_in == Address::ZERO || token_out == Address::ZERO {
            return Err(BalancerError::invalid("token address must not be zero"));
        }
        let oracle_in = self.oracle_token(token_in);
        let oracle_out = self.oracle_token(token_out);
        if oracle_in == oracle_out {
            return Err(BalancerError::invalid(
                "input and output token are the same; use wrap/unwrap for the native asset",
            ));
        }

        let amount = to_base_units(amount)?;
        if amount.is_zero() {
            return Err(BalancerError::invalid("amount must be greater than zero"));
        }

        Ok(TradeParams {
            side,
            token_in,
            token_out,
            oracle_in,
            oracle_out,
            amount,
            max_slippage,
        })
    }

    async fn price(&self, params: TradeParams) -> Result<SwapQuote> {
        let route = self
            .oracle
            .get_swaps(params.oracle_in, params.oracle_out, params.side, params.amount)
            .await?;

        if route.is_empty() {
            tracing::info!(
                token_in = %params.token_in,
                token_out = %params.token_out,
                "Routing oracle found no route"
            );
            return Err(BalancerError::NoRoute {
                token_in: params.token_in,
                token_out: params.token_out,
            });
        }
        validate_route(&route, params.oracle_in, params.oracle_out)?;

        let limit_amount = match params.side {
            SwapSide::ExactIn => slippage_floor(route.return_amount, &params.max_slippage)?,
            SwapSide::ExactOut => slippage_ceil(route.return_amount, &params.max_slippage)?,
        };

        tracing::debug!(
            side = %params.side,
            amount = %params.amount,
            return_amount = %route.return_amount,
            limit = %limit_amount,
            hops = route.hop_count(),
            "Trade priced"
        );

        Ok(SwapQuote {
            side: params.side,
            token_in: params.token_in,
            token_out: params.token_out,
            amount: params.amount,
            return_amount: route.return_amount,
            limit_amount,
            max_slippage: params.max_slippage,
            route,
        })
    }

    /// Price a trade without submitting it
    pub async fn quote(
        &self,
        token_in: Address,
        token_out: Address,
        amount: &BigDecimal,
        side: SwapSide,
        max_slippage: Option<&BigDecimal>,
    ) -> Result<SwapQuote> {
        let params = self.trade_params(token_in, token_out, amount, side, max_slippage)?;
        self.price(params).await
    }

    /// Swap an exact `amount` of `token_in` for at least
    /// `floor(expected / (1 + max_slippage))` of `token_out`.
    pub async fn swap(
        &self,
        token_in: Address,
        token_out: Address,
        amount: &BigDecimal,
        max_slippage: Option<&BigDecimal>,
    ) -> Result<TransactionResult> {
        let params =
            self.trade_params(token_in, token_out, amount, SwapSide::ExactIn, max_slippage)?;
        let account = self.account().await?;
        let quote = self.price(params).await?;

        let value = if is_native(&token_in) {
            quote.amount
        } else {
            U256::ZERO
        };
        let call = IExchangeProxy::multihopBatchSwapExactInCall {
            swapSequences: quote.route.swap_sequences(),
            tokenIn: token_in,
            tokenOut: token_out,
            totalAmountIn: quote.amount,
            minTotalAmountOut: quote.limit_amount,
        };

        tracing::info!(
            %account,
            %token_in,
            %token_out,
            amount_in = %quote.amount,
            min_amount_out = %quote.limit_amount,
            "Submitting exact-in swap"
        );

        let outcome = self
            .submit(account, self.config.contracts.exchange_proxy, &call, value)
            .await;
        outcome.map_err(|cause| {
            tracing::warn!(%cause, "Swap failed");
            BalancerError::SwapExecution {
                min_amount_out: quote.limit_amount,
                route: Box::new(quote.route),
                cause,
            }
        })
    }

    /// Buy an exact `amount_out` of `token_out`, spending at most
    /// `ceil(expected_in * (1 + max_slippage))` of `token_in`.
    pub async fn swap_exact_out(
        &self,
        token_in: Address,
        token_out: Address,
        amount_out: &BigDecimal,
        max_slippage: Option<&BigDecimal>,
    ) -> Result<TransactionResult> {
        let params =
            self.trade_params(token_in, token_out, amount_out, SwapSide::ExactOut, max_slippage)?;
        let account = self.account().await?;
        let quote = self.price(params).await?;

        let value = if is_native(&token_in) {
            quote.limit_amount
        } else {
            U256::ZERO
        };
        let call = IExchangeProxy::multihopBatchSwapExactOutCall {
            swapSequences: quote.route.swap_sequences(),
            tokenIn: token_in,
            tokenOut: token_out,
            maxTotalAmountIn: quote.limit_amount,
        };

        tracing::info!(
            %account,
            %token_in,
            %token_out,
            amount_out = %quote.amount,
            max_amount_in = %quote.limit_amount,
            "Submitting exact-out swap"
        );

        let outcome = self
            .submit(account, self.config.contracts.exchange_proxy, &call, value)
            .await;
        outcome.map_err(|cause| {
            tracing::warn!(%cause, "Swap failed");
            BalancerError::SwapExecution {
                min_amount_out: quote.amount,
                route: Box::new(quote.route),
                cause,
            }
        })
    }

    /// Wrap `amount` of the native asset into WETH
    pub async fn wrap_native(&self, amount: &BigDecimal) -> Result<TransactionResult> {
        let amount = to_base_units(amount)?;
        if amount.is_zero() {
            return Err(BalancerError::invalid("amount must be greater than zero"));
        }
        let account = self.account().await?;
        tracing::info!(%account, %amount, "Wrapping native asset");

        self.submit(account, self.config.contracts.weth, &IWETH::depositCall {}, amount)
            .await
            .map_err(|cause| BalancerError::Wrap { cause })
    }

    /// Unwrap `amount` of WETH back into the native asset
    pub async fn unwrap_native(&self, amount: &BigDecimal) -> Result<TransactionResult> {
        let amount = to_base_units(amount)?;
        if amount.is_zero() {
            return Err(BalancerError::invalid("amount must be greater than zero"));
        }
        let account = self.account().await?;
        tracing::info!(%account, %amount, "Unwrapping native asset");

        self.submit(
            account,
            self.config.contracts.weth,
            &IWETH::withdrawCall { wad: amount },
            U256::ZERO,
        )
        .await
        .map_err(|cause| BalancerError::Wrap { cause })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::mock::{balancer_with_oracle, single_hop_route, MockChain, MockOracle};
    use crate::state::Route;
    use alloy::sol_types::SolCall;
    use evm_tx::FailureCause;
    use weir_core::constants::NATIVE_ASSET;

    const DAI: Address = Address::new([0xda; 20]);
    const MKR: Address = Address::new([0x3c; 20]);

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn one() -> U256 {
        U256::from(1_000_000_000_000_000_000u64)
    }

    #[tokio::test]
    async fn test_erc20_swap_bounds_output() {
        let chain = MockChain::new();
        let oracle = MockOracle::returning(single_hop_route(DAI, MKR, one(), U256::from(2000)));
        let balancer = balancer_with_oracle(&chain, &oracle);

        balancer.swap(DAI, MKR, &dec("1"), None).await.unwrap();

        let sent = chain.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, balancer.config().contracts.exchange_proxy);
        assert_eq!(sent[0].value, U256::ZERO);

        let call = IExchangeProxy::multihopBatchSwapExactInCall::abi_decode(&sent[0].data).unwrap();
        assert_eq!(call.tokenIn, DAI);
        assert_eq!(call.tokenOut, MKR);
        assert_eq!(call.totalAmountIn, one());
        // floor(2000 / 1.005)
        assert_eq!(call.minTotalAmountOut, U256::from(1990));
        assert_eq!(call.swapSequences.len(), 1);
    }

    #[tokio::test]
    async fn test_native_input_attaches_value_and_queries_weth() {
        let chain = MockChain::new();
        let weth = chain.config().contracts.weth;
        let oracle = MockOracle::returning(single_hop_route(weth, MKR, one(), U256::from(1000)));
        let balancer = balancer_with_oracle(&chain, &oracle);

        balancer
            .swap(NATIVE_ASSET, MKR, &dec("1"), Some(&dec("0.005")))
            .await
            .unwrap();

        let queries = oracle.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].0, weth);
        assert_eq!(queries[0].2, SwapSide::ExactIn);

        let sent = chain.sent();
        assert_eq!(sent[0].value, one());
        let call = IExchangeProxy::multihopBatchSwapExactInCall::abi_decode(&sent[0].data).unwrap();
        assert_eq!(call.tokenIn, NATIVE_ASSET);
        assert_eq!(call.minTotalAmountOut, U256::from(995));
    }

    #[tokio::test]
    async fn test_no_route_submits_nothing() {
        let chain = MockChain::new();
        let oracle = MockOracle::returning(Route {
            sequences: vec![],
            return_amount: U256::ZERO,
            spot_price: BigDecimal::from(0),
        });
        let balancer = balancer_with_oracle(&chain, &oracle);

        let err = balancer.swap(DAI, MKR, &dec("1"), None).await.unwrap_err();
        assert!(matches!(
            err,
            BalancerError::NoRoute { token_in, token_out } if token_in == DAI && token_out == MKR
        ));
        assert!(chain.sent().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_slippage_rejected_before_network() {
        let chain = MockChain::new();
        let oracle = MockOracle::returning(single_hop_route(DAI, MKR, one(), one()));
        let balancer = balancer_with_oracle(&chain, &oracle);

        for slippage in ["1", "1.5", "-0.1"] {
            let err = balancer
                .swap(DAI, MKR, &dec("1"), Some(&dec(slippage)))
                .await
                .unwrap_err();
            assert!(matches!(err, BalancerError::InvalidParams { .. }));
        }
        assert!(oracle.queries().is_empty());
        assert!(chain.sent().is_empty());
    }

    #[tokio::test]
    async fn test_same_token_and_zero_amount_rejected() {
        let chain = MockChain::new();
        let weth = chain.config().contracts.weth;
        let oracle = MockOracle::returning(single_hop_route(DAI, MKR, one(), one()));
        let balancer = balancer_with_oracle(&chain, &oracle);

        let err = balancer.swap(NATIVE_ASSET, weth, &dec("1"), None).await.unwrap_err();
        assert!(matches!(err, BalancerError::InvalidParams { .. }));

        let err = balancer.swap(DAI, MKR, &dec("0"), None).await.unwrap_err();
        assert!(matches!(err, BalancerError::InvalidParams { .. }));
        assert!(oracle.queries().is_empty());
    }

    #[tokio::test]
    async fn test_oracle_failure_is_oracle_error() {
        let chain = MockChain::new();
        let oracle = MockOracle::failing("connection refused");
        let balancer = balancer_with_oracle(&chain, &oracle);

        let err = balancer.swap(DAI, MKR, &dec("1"), None).await.unwrap_err();
        assert!(matches!(err, BalancerError::Oracle { .. }));
        assert!(chain.sent().is_empty());
    }

    #[tokio::test]
    async fn test_revert_is_swap_execution_error() {
        let chain = MockChain::new();
        chain.revert_next("ERR_LIMIT_OUT");
        let oracle = MockOracle::returning(single_hop_route(DAI, MKR, one(), U256::from(1000)));
        let balancer = balancer_with_oracle(&chain, &oracle);

        let err = balancer.swap(DAI, MKR, &dec("1"), None).await.unwrap_err();
        match &err {
            BalancerError::SwapExecution {
                min_amount_out,
                route,
                cause,
            } => {
                assert_eq!(*min_amount_out, U256::from(995));
                assert_eq!(route.hop_count(), 1);
                assert!(matches!(cause, FailureCause::Reverted { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.revert_hint(), Some("Output fell below the slippage limit"));
    }

    #[tokio::test]
    async fn test_exact_out_bounds_input() {
        let chain = MockChain::new();
        let weth = chain.config().contracts.weth;
        let oracle = MockOracle::returning(single_hop_route(weth, MKR, one(), U256::from(999)));
        let balancer = balancer_with_oracle(&chain, &oracle);

        balancer
            .swap_exact_out(NATIVE_ASSET, MKR, &dec("1"), None)
            .await
            .unwrap();

        assert_eq!(oracle.queries()[0].2, SwapSide::ExactOut);
        assert_eq!(oracle.queries()[0].3, one());

        let sent = chain.sent();
        let call =
            IExchangeProxy::multihopBatchSwapExactOutCall::abi_decode(&sent[0].data).unwrap();
        // ceil(999 * 1.005)
        assert_eq!(call.maxTotalAmountIn, U256::from(1004));
        assert_eq!(sent[0].value, U256::from(1004));
    }

    #[tokio::test]
    async fn test_quote_does_not_submit() {
        let chain = MockChain::new();
        let oracle = MockOracle::returning(single_hop_route(DAI, MKR, one(), U256::from(2000)));
        let balancer = balancer_with_oracle(&chain, &oracle);

        let quote = balancer
            .quote(DAI, MKR, &dec("1"), SwapSide::ExactIn, Some(&dec("0.1")))
            .await
            .unwrap();
        assert_eq!(quote.return_amount, U256::from(2000));
        assert_eq!(quote.limit_amount, U256::from(1818));
        assert!(chain.sent().is_empty());
    }

    #[tokio::test]
    async fn test_wrap_and_unwrap() {
        let chain = MockChain::new();
        let oracle = MockOracle::failing("unused");
        let balancer = balancer_with_oracle(&chain, &oracle);
        let weth = balancer.config().contracts.weth;

        balancer.wrap_native(&dec("0.5")).await.unwrap();
        balancer.unwrap_native(&dec("0.25")).await.unwrap();

        let sent = chain.sent();
        assert_eq!(sent[0].to, weth);
        assert_eq!(sent[0].value, U256::from(500_000_000_000_000_000u64));
        assert_eq!(sent[0].selector(), Some(IWETH::depositCall::SELECTOR));

        assert_eq!(sent[1].value, U256::ZERO);
        let call = IWETH::withdrawCall::abi_decode(&sent[1].data).unwrap();
        assert_eq!(call.wad, U256::from(250_000_000_000_000_000u64));
    }

    #[tokio::test]
    async fn test_wrap_revert_is_wrap_error() {
        let chain = MockChain::new();
        chain.revert_next("insufficient funds");
        let oracle = MockOracle::failing("unused");
        let balancer = balancer_with_oracle(&chain, &oracle);

        let err = balancer.wrap_native(&dec("1")).await.unwrap_err();
        assert!(matches!(err, BalancerError::Wrap { .. }));
    }
}
