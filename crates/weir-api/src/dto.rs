//! Data Transfer Objects for API requests and responses
//!
//! Amounts cross the API as decimal strings in human units.

use alloy::primitives::Address;
use axum::{http::StatusCode, Json};
use balancer::{BalancerError, Pool, PoolOrder, SwapQuote, SwapSide};
use bigdecimal::BigDecimal;
use evm_tx::{from_base_units, parse_amount, TransactionResult};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub network: String,
}

/// Node status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeStatusResponse {
    pub connected: bool,
    pub url: String,
    pub network: String,
    pub chain_id: Option<u64>,
    pub expected_chain_id: u64,
    pub block_number: Option<u64>,
    pub capability_tier: String,
}

/// Connected account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub account: Option<Address>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountQuery {
    pub account: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllowanceQuery {
    pub account: Address,
    pub spender: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub token: Address,
    pub account: Address,
    pub balance: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalancesRequest {
    pub account: Address,
    pub tokens: Vec<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancesResponse {
    pub account: Address,
    pub balances: Vec<TokenBalanceDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBalanceDto {
    pub token: Address,
    pub balance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowanceResponse {
    pub token: Address,
    pub account: Address,
    pub spender: Address,
    pub allowance: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApproveRequest {
    pub spender: Address,
}

/// Transaction that landed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxResponse {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
}

impl From<TransactionResult> for TxResponse {
    fn from(result: TransactionResult) -> Self {
        Self {
            tx_hash: result.tx_hash.to_string(),
            block_number: result.block_number,
            gas_used: result.gas_used,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxListResponse {
    pub transactions: Vec<TxResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyResponse {
    pub account: Address,
    pub proxy: Option<Address>,
}

/// Swap request (exact in or exact out depending on the route)
#[derive(Debug, Clone, Deserialize)]
pub struct SwapRequest {
    pub token_in: Address,
    pub token_out: Address,
    /// Input amount for exact-in, output amount for exact-out
    pub amount: String,
    #[serde(default)]
    pub max_slippage: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    pub token_in: Address,
    pub token_out: Address,
    pub amount: String,
    #[serde(default = "default_side")]
    pub side: SwapSide,
    #[serde(default)]
    pub max_slippage: Option<String>,
}

fn default_side() -> SwapSide {
    SwapSide::ExactIn
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub side: SwapSide,
    pub token_in: Address,
    pub token_out: Address,
    pub amount: String,
    /// Expected output (exact-in) or input (exact-out)
    pub return_amount: String,
    /// Minimum output (exact-in) or maximum input (exact-out)
    pub limit_amount: String,
    pub spot_price: String,
    pub max_slippage: String,
    pub hops: usize,
}

impl From<SwapQuote> for QuoteResponse {
    fn from(quote: SwapQuote) -> Self {
        Self {
            side: quote.side,
            token_in: quote.token_in,
            token_out: quote.token_out,
            amount: from_base_units(quote.amount).to_string(),
            return_amount: from_base_units(quote.return_amount).to_string(),
            limit_amount: from_base_units(quote.limit_amount).to_string(),
            spot_price: quote.route.spot_price.to_string(),
            max_slippage: quote.max_slippage.to_string(),
            hops: quote.route.hop_count(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WrapRequest {
    pub amount: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolsParams {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub order_by: PoolOrder,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MyPoolsParams {
    pub account: Address,
    #[serde(default)]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolsResponse {
    pub pools: Vec<Pool>,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePoolRequest {
    pub tokens: Vec<Address>,
    pub balances: Vec<String>,
    pub weights: Vec<String>,
    /// Swap fee as a fraction (0.001 = 0.1%)
    pub swap_fee: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePoolResponse {
    pub proxy: Address,
    pub transaction: TxResponse,
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }
}

/// Error half of every handler result
pub type ApiFailure = (StatusCode, Json<ApiError>);

/// Convert BalancerError to API error response
pub fn balancer_error_to_api(error: BalancerError) -> ApiFailure {
    let status = StatusCode::from_u16(error.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut body = ApiError::new(error.error_code(), error.to_string());
    body.hint = error.revert_hint().map(str::to_string);

    if status.is_server_error() {
        tracing::warn!(code = %body.code, "{}", body.message);
    }
    (status, Json(body))
}

/// Parse a human amount field, naming it in the error
pub fn parse_amount_field(field: &str, value: &str) -> Result<BigDecimal, ApiFailure> {
    parse_amount(value).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request(format!("{}: {}", field, e))),
        )
    })
}

/// Parse an optional slippage fraction
pub fn parse_slippage(value: Option<&str>) -> Result<Option<BigDecimal>, ApiFailure> {
    value
        .map(|s| parse_amount_field("max_slippage", s))
        .transpose()
}
