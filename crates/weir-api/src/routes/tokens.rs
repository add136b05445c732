//! Token balance and allowance endpoints

use alloy::primitives::Address;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::dto::{
    balancer_error_to_api, AccountQuery, AllowanceQuery, AllowanceResponse, ApiFailure,
    ApproveRequest, BalanceResponse, BalancesRequest, BalancesResponse, TokenBalanceDto,
    TxListResponse, TxResponse,
};
use crate::AppState;

/// Create token routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/balances", post(get_balances))
        .route("/:token/balance", get(get_balance))
        .route("/:token/allowance", get(get_allowance))
        .route("/:token/approve", post(approve))
        .route("/:token/unlock", post(unlock))
}

/// GET /tokens/:token/balance?account= - Balance in human units
async fn get_balance(
    State(state): State<AppState>,
    Path(token): Path<Address>,
    Query(query): Query<AccountQuery>,
) -> Result<Json<BalanceResponse>, ApiFailure> {
    let balance = state
        .balancer()
        .get_balance(token, query.account)
        .await
        .map_err(balancer_error_to_api)?;

    Ok(Json(BalanceResponse {
        token,
        account: query.account,
        balance: balance.to_string(),
    }))
}

/// POST /tokens/balances - Several balances at once
async fn get_balances(
    State(state): State<AppState>,
    Json(request): Json<BalancesRequest>,
) -> Result<Json<BalancesResponse>, ApiFailure> {
    let balances = state
        .balancer()
        .get_balances(&request.tokens, request.account)
        .await
        .map_err(balancer_error_to_api)?;

    let balances = request
        .tokens
        .iter()
        .zip(balances)
        .map(|(token, balance)| TokenBalanceDto {
            token: *token,
            balance: balance.to_string(),
        })
        .collect();

    Ok(Json(BalancesResponse {
        account: request.account,
        balances,
    }))
}

/// GET /tokens/:token/allowance?account=&spender=
async fn get_allowance(
    State(state): State<AppState>,
    Path(token): Path<Address>,
    Query(query): Query<AllowanceQuery>,
) -> Result<Json<AllowanceResponse>, ApiFailure> {
    let allowance = state
        .balancer()
        .get_allowance(token, query.account, query.spender)
        .await
        .map_err(balancer_error_to_api)?;

    Ok(Json(AllowanceResponse {
        token,
        account: query.account,
        spender: query.spender,
        allowance: allowance.to_string(),
    }))
}

/// POST /tokens/:token/approve - Unlimited approval for a spender
async fn approve(
    State(state): State<AppState>,
    Path(token): Path<Address>,
    Json(request): Json<ApproveRequest>,
) -> Result<Json<TxResponse>, ApiFailure> {
    let result = state
        .balancer()
        .approve(token, request.spender)
        .await
        .map_err(balancer_error_to_api)?;
    Ok(Json(result.into()))
}

/// POST /tokens/:token/unlock - Approve the exchange proxy and the account proxy
async fn unlock(
    State(state): State<AppState>,
    Path(token): Path<Address>,
) -> Result<Json<TxListResponse>, ApiFailure> {
    let results = state
        .balancer()
        .unlock_token(token)
        .await
        .map_err(balancer_error_to_api)?;
    Ok(Json(TxListResponse {
        transactions: results.into_iter().map(TxResponse::from).collect(),
    }))
}
