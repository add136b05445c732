//! Pool indexer
//!
//! Pool and share listings come from the Balancer subgraph. Responses are
//! untrusted JSON and are validated into typed records here.

use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use weir_core::ChainConfig;

use crate::client::Result;
use crate::state::{BalancerError, Pool, PoolShare, PoolToken};

/// Largest page the subgraph serves
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Default page size for pool listings
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Pool ordering (always descending)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolOrder {
    #[default]
    Liquidity,
    SwapFee,
    TotalShares,
}

impl PoolOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liquidity => "liquidity",
            Self::SwapFee => "swapFee",
            Self::TotalShares => "totalShares",
        }
    }
}

/// Pool listing request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolQuery {
    /// Restrict to these pool ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    /// Zero-based page index
    #[serde(default)]
    pub page: u32,
    pub page_size: u32,
    #[serde(default)]
    pub order_by: PoolOrder,
}

impl Default for PoolQuery {
    fn default() -> Self {
        Self {
            ids: None,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            order_by: PoolOrder::default(),
        }
    }
}

impl PoolQuery {
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(BalancerError::invalid(format!(
                "page size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }

    fn skip(&self) -> u64 {
        self.page as u64 * self.page_size as u64
    }
}

/// Pool indexer capability
#[async_trait]
pub trait PoolIndexer: Send + Sync {
    /// Pools with at least one bound token, ordered descending
    async fn list_pools(&self, query: &PoolQuery) -> Result<Vec<Pool>>;

    /// Non-zero pool shares held by `account`
    async fn list_pool_shares(&self, account: Address) -> Result<Vec<PoolShare>>;
}

/// Pools the account holds shares in
pub async fn my_pools<I>(indexer: &I, account: Address, page_size: u32) -> Result<Vec<Pool>>
where
    I: PoolIndexer + ?Sized,
{
    let shares = indexer.list_pool_shares(account).await?;
    if shares.is_empty() {
        return Ok(Vec::new());
    }

    let query = PoolQuery {
        ids: Some(shares.into_iter().map(|share| share.pool_id).collect()),
        page_size,
        ..PoolQuery::default()
    };
    indexer.list_pools(&query).await
}

const POOLS_QUERY: &str = r#"
query Pools($first: Int!, $skip: Int!, $orderBy: Pool_orderBy!, $where: Pool_filter!) {
  pools(first: $first, skip: $skip, orderBy: $orderBy, orderDirection: desc, where: $where) {
    id
    publicSwap
    finalized
    swapFee
    totalWeight
    totalShares
    liquidity
    tokens {
      address
      balance
      decimals
      symbol
      denormWeight
    }
  }
}
"#;

const POOL_SHARES_QUERY: &str = r#"
query PoolShares($user: String!) {
  poolShares(where: { userAddress: $user, balance_gt: 0 }) {
    poolId {
      id
    }
    balance
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphError>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PoolsData {
    pools: Vec<RawPool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPool {
    id: String,
    public_swap: bool,
    finalized: bool,
    swap_fee: String,
    total_weight: String,
    total_shares: String,
    liquidity: String,
    #[serde(default)]
    tokens: Vec<RawPoolToken>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPoolToken {
    address: String,
    balance: String,
    decimals: u8,
    #[serde(default)]
    symbol: Option<String>,
    denorm_weight: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PoolSharesData {
    pool_shares: Vec<RawPoolShare>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPoolShare {
    pool_id: RawPoolRef,
    balance: String,
}

#[derive(Debug, Deserialize)]
struct RawPoolRef {
    id: String,
}

fn indexer_error(message: impl Into<String>) -> BalancerError {
    BalancerError::Indexer {
        message: message.into(),
    }
}

fn parse_decimal(field: &str, value: &str) -> Result<BigDecimal> {
    BigDecimal::from_str(value)
        .map_err(|e| indexer_error(format!("invalid {} '{}': {}", field, value, e)))
}

fn parse_address(field: &str, value: &str) -> Result<Address> {
    Address::from_str(value)
        .map_err(|e| indexer_error(format!("invalid {} '{}': {}", field, value, e)))
}

fn parse_pool(raw: RawPool) -> Result<Pool> {
    let tokens = raw
        .tokens
        .into_iter()
        .map(|token| {
            Ok(PoolToken {
                address: parse_address("token address", &token.address)?,
                symbol: token.symbol.unwrap_or_default(),
                decimals: token.decimals,
                balance: parse_decimal("token balance", &token.balance)?,
                denorm_weight: parse_decimal("denormWeight", &token.denorm_weight)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Pool {
        address: parse_address("pool id", &raw.id)?,
        id: raw.id,
        tokens,
        swap_fee: parse_decimal("swapFee", &raw.swap_fee)?,
        total_weight: parse_decimal("totalWeight", &raw.total_weight)?,
        total_shares: parse_decimal("totalShares", &raw.total_shares)?,
        liquidity: parse_decimal("liquidity", &raw.liquidity)?,
        finalized: raw.finalized,
        public_swap: raw.public_swap,
    })
}

fn parse_share(raw: RawPoolShare) -> Result<PoolShare> {
    Ok(PoolShare {
        balance: parse_decimal("share balance", &raw.balance)?,
        pool_id: raw.pool_id.id,
    })
}

fn unwrap_response<T>(response: GraphResponse<T>) -> Result<T> {
    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(indexer_error(messages.join("; ")));
    }
    response
        .data
        .ok_or_else(|| indexer_error("response carried no data"))
}

/// GraphQL client for the Balancer subgraph
#[derive(Clone)]
pub struct SubgraphClient {
    http: reqwest::Client,
    url: String,
}

impl SubgraphClient {
    pub fn new(config: &ChainConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| indexer_error(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: config.subgraph_url.clone(),
        })
    }

    async fn query<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let transport = |e: reqwest::Error| indexer_error(e.to_string());

        let response: GraphResponse<T> = self
            .http
            .post(&self.url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?
            .json()
            .await
            .map_err(transport)?;

        unwrap_response(response)
    }
}

fn pools_variables(query: &PoolQuery) -> serde_json::Value {
    let mut filter = json!({ "tokensList_not": [] });
    if let Some(ids) = &query.ids {
        filter["id_in"] = json!(ids);
    }
    json!({
        "first": query.page_size,
        "skip": query.skip(),
        "orderBy": query.order_by.as_str(),
        "where": filter,
    })
}

#[async_trait]
impl PoolIndexer for SubgraphClient {
    async fn list_pools(&self, query: &PoolQuery) -> Result<Vec<Pool>> {
        query.validate()?;
        tracing::debug!(page = query.page, page_size = query.page_size, "Querying pools");

        let data: PoolsData = self.query(POOLS_QUERY, pools_variables(query)).await?;
        data.pools.into_iter().map(parse_pool).collect()
    }

    async fn list_pool_shares(&self, account: Address) -> Result<Vec<PoolShare>> {
        // The subgraph stores addresses lowercased
        let user = format!("{:#x}", account);
        tracing::debug!(%user, "Querying pool shares");

        let data: PoolSharesData = self
            .query(POOL_SHARES_QUERY, json!({ "user": user }))
            .await?;
        data.pool_shares.into_iter().map(parse_share).collect()
    }
}
