//! Routing oracle
//!
//! The smart order router finds how to split a trade across pools. Its
//! algorithm lives elsewhere; this module only asks it for a route and
//! checks that what comes back is well formed before anything is signed.

use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use weir_core::ChainConfig;

use crate::client::Result;
use crate::state::{BalancerError, Route, SwapHop, SwapSide};

/// Route-optimization oracle capability
#[async_trait]
pub trait RouteOracle: Send + Sync {
    /// Best route for trading `amount` base units on the given `side`
    async fn get_swaps(
        &self,
        token_in: Address,
        token_out: Address,
        side: SwapSide,
        amount: U256,
    ) -> Result<Route>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SorRequest {
    token_in: String,
    token_out: String,
    swap_type: &'static str,
    amount: String,
    max_pools: u32,
    gas_price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSwap {
    pool: String,
    token_in: String,
    token_out: String,
    swap_amount: String,
    limit_return_amount: String,
    max_price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRoute {
    #[serde(default)]
    swaps: Vec<Vec<RawSwap>>,
    return_amount: String,
    #[serde(default)]
    spot_price: Option<String>,
}

/// HTTP client for a SOR service
#[derive(Clone)]
pub struct SorClient {
    http: reqwest::Client,
    url: String,
    max_pools: u32,
    gas_price_wei: u64,
}

impl SorClient {
    pub fn new(config: &ChainConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| BalancerError::Oracle {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            url: config.sor_url.clone(),
            max_pools: config.defaults.max_pools,
            gas_price_wei: config.defaults.gas_price_wei,
        })
    }
}

#[async_trait]
impl RouteOracle for SorClient {
    async fn get_swaps(
        &self,
        token_in: Address,
        token_out: Address,
        side: SwapSide,
        amount: U256,
    ) -> Result<Route> {
        let request = SorRequest {
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
            swap_type: side.as_str(),
            amount: amount.to_string(),
            max_pools: self.max_pools,
            gas_price: self.gas_price_wei.to_string(),
        };

        let transport = |e: reqwest::Error| oracle_error(e.to_string());

        let raw: RawRoute = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?
            .json()
            .await
            .map_err(transport)?;

        parse_route(raw)
    }
}

fn oracle_error(message: impl Into<String>) -> BalancerError {
    BalancerError::Oracle {
        message: message.into(),
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address> {
    Address::from_str(value)
        .map_err(|e| oracle_error(format!("invalid {} '{}': {}", field, value, e)))
}

fn parse_u256(field: &str, value: &str) -> Result<U256> {
    U256::from_str(value).map_err(|e| oracle_error(format!("invalid {} '{}': {}", field, value, e)))
}

fn parse_route(raw: RawRoute) -> Result<Route> {
    let sequences = raw
        .swaps
        .iter()
        .map(|sequence| {
            sequence
                .iter()
                .map(|swap| {
                    Ok(SwapHop {
                        pool: parse_address("pool", &swap.pool)?,
                        token_in: parse_address("tokenIn", &swap.token_in)?,
                        token_out: parse_address("tokenOut", &swap.token_out)?,
                        swap_amount: parse_u256("swapAmount", &swap.swap_amount)?,
                        limit_return_amount: parse_u256(
                            "limitReturnAmount",
                            &swap.limit_return_amount,
                        )?,
                        max_price: parse_u256("maxPrice", &swap.max_price)?,
                    })
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let spot_price = match raw.spot_price.as_deref() {
        Some(s) => BigDecimal::from_str(s)
            .map_err(|e| oracle_error(format!("invalid spotPrice '{}': {}", s, e)))?,
        None => BigDecimal::from(0),
    };

    Ok(Route {
        sequences,
        return_amount: parse_u256("returnAmount", &raw.return_amount)?,
        spot_price,
    })
}

/// Check an oracle route before it is signed.
///
/// A route with no hops means no liquidity path exists. Otherwise every
/// sequence must start at `token_in`, end at `token_out` and chain each hop's
/// output into the next hop's input.
pub fn validate_route(route: &Route, token_in: Address, token_out: Address) -> Result<()> {
    if route.is_empty() {
        return Err(BalancerError::NoRoute {
            token_in,
            token_out,
        });
    }

    for (index, sequence) in route.sequences.iter().enumerate() {
        let (Some(first), Some(last)) = (sequence.first(), sequence.last()) else {
            return Err(oracle_error(format!("sequence {} is empty", index)));
        };
        if first.token_in != token_in {
            return Err(oracle_error(format!(
                "sequence {} starts at {}, expected {}",
                index, first.token_in, token_in
            )));
        }
        if last.token_out != token_out {
            return Err(oracle_error(format!(
                "sequence {} ends at {}, expected {}",
                index, last.token_out, token_out
            )));
        }
        if let Some(broken) = sequence
            .windows(2)
            .position(|pair| pair[0].token_out != pair[1].token_in)
        {
            return Err(oracle_error(format!(
                "sequence {} breaks between hop {} and {}",
                index,
                broken,
                broken + 1
            )));
        }
    }

    Ok(())
}
