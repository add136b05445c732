//! Connected account and proxy endpoints

use alloy::primitives::Address;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::dto::{balancer_error_to_api, AccountResponse, ApiFailure, ProxyResponse};
use crate::AppState;

/// Create account routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/account", get(get_account))
        .route("/proxy", post(ensure_proxy))
        .route("/proxy/:account", get(get_proxy))
}

/// GET /account - Account exposed by the signer, if any
async fn get_account(State(state): State<AppState>) -> Result<Json<AccountResponse>, ApiFailure> {
    let account = match state.balancer().account().await {
        Ok(account) => Some(account),
        Err(balancer::BalancerError::NoAccount) => None,
        Err(e) => return Err(balancer_error_to_api(e)),
    };
    Ok(Json(AccountResponse { account }))
}

/// GET /proxy/:account - Registered proxy of an account
async fn get_proxy(
    State(state): State<AppState>,
    Path(account): Path<Address>,
) -> Result<Json<ProxyResponse>, ApiFailure> {
    let proxy = state
        .balancer()
        .resolve_proxy(account)
        .await
        .map_err(balancer_error_to_api)?;
    Ok(Json(ProxyResponse { account, proxy }))
}

/// POST /proxy - Build the connected account's proxy if it has none
async fn ensure_proxy(State(state): State<AppState>) -> Result<Json<ProxyResponse>, ApiFailure> {
    let balancer = state.balancer();
    let account = balancer.account().await.map_err(balancer_error_to_api)?;
    let proxy = balancer
        .ensure_proxy(account)
        .await
        .map_err(balancer_error_to_api)?;
    Ok(Json(ProxyResponse {
        account,
        proxy: Some(proxy),
    }))
}
