//! Pool listing and lifecycle endpoints

use alloy::primitives::Address;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use balancer::{indexer::DEFAULT_PAGE_SIZE, my_pools, PoolQuery};

use crate::dto::{
    balancer_error_to_api, parse_amount_field, ApiError, ApiFailure, CreatePoolRequest,
    CreatePoolResponse, MyPoolsParams, PoolsParams, PoolsResponse, TxResponse,
};
use crate::AppState;

/// Create pool routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pools).post(create_pool))
        .route("/mine", get(list_my_pools))
        .route("/:pool/exit", post(exit_pool))
}

/// GET /pools?page=&page_size=&order_by= - Indexed pools, most liquid first
async fn list_pools(
    State(state): State<AppState>,
    Query(params): Query<PoolsParams>,
) -> Result<Json<PoolsResponse>, ApiFailure> {
    let query = PoolQuery {
        ids: None,
        page: params.page,
        page_size: params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        order_by: params.order_by,
    };

    let pools = state
        .indexer()
        .list_pools(&query)
        .await
        .map_err(balancer_error_to_api)?;
    let count = pools.len();
    Ok(Json(PoolsResponse { pools, count }))
}

/// GET /pools/mine?account= - Pools the account holds shares in
async fn list_my_pools(
    State(state): State<AppState>,
    Query(params): Query<MyPoolsParams>,
) -> Result<Json<PoolsResponse>, ApiFailure> {
    let pools = my_pools(
        state.indexer(),
        params.account,
        params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    )
    .await
    .map_err(balancer_error_to_api)?;
    let count = pools.len();
    Ok(Json(PoolsResponse { pools, count }))
}

/// POST /pools - Create and finalize a pool through the account proxy
async fn create_pool(
    State(state): State<AppState>,
    Json(request): Json<CreatePoolRequest>,
) -> Result<Json<CreatePoolResponse>, ApiFailure> {
    if request.tokens.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request("tokens must not be empty")),
        ));
    }

    let balances = request
        .balances
        .iter()
        .map(|b| parse_amount_field("balances", b))
        .collect::<Result<Vec<_>, _>>()?;
    let weights = request
        .weights
        .iter()
        .map(|w| parse_amount_field("weights", w))
        .collect::<Result<Vec<_>, _>>()?;
    let swap_fee = parse_amount_field("swap_fee", &request.swap_fee)?;

    let creation = state
        .balancer()
        .create_pool(&request.tokens, &balances, &weights, &swap_fee)
        .await
        .map_err(balancer_error_to_api)?;

    Ok(Json(CreatePoolResponse {
        proxy: creation.proxy,
        transaction: creation.result.into(),
    }))
}

/// POST /pools/:pool/exit - Redeem the account's whole pool share
async fn exit_pool(
    State(state): State<AppState>,
    Path(pool): Path<Address>,
) -> Result<Json<TxResponse>, ApiFailure> {
    let result = state
        .balancer()
        .exit_pool(pool)
        .await
        .map_err(balancer_error_to_api)?;
    Ok(Json(result.into()))
}
