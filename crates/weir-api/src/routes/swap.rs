//! Swap, quote and wrap endpoints

use axum::{extract::State, routing::post, Json, Router};

use crate::dto::{
    balancer_error_to_api, parse_amount_field, parse_slippage, ApiFailure, QuoteRequest,
    QuoteResponse, SwapRequest, TxResponse, WrapRequest,
};
use crate::AppState;

/// Create swap routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/swap", post(swap_exact_in))
        .route("/swap/exact-out", post(swap_exact_out))
        .route("/swap/quote", post(quote))
        .route("/wrap", post(wrap))
        .route("/unwrap", post(unwrap))
}

/// POST /swap/quote - Price a trade without submitting it
async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiFailure> {
    let amount = parse_amount_field("amount", &request.amount)?;
    let max_slippage = parse_slippage(request.max_slippage.as_deref())?;

    let quote = state
        .balancer()
        .quote(
            request.token_in,
            request.token_out,
            &amount,
            request.side,
            max_slippage.as_ref(),
        )
        .await
        .map_err(balancer_error_to_api)?;
    Ok(Json(quote.into()))
}

/// POST /swap - Spend an exact input amount
async fn swap_exact_in(
    State(state): State<AppState>,
    Json(request): Json<SwapRequest>,
) -> Result<Json<TxResponse>, ApiFailure> {
    let amount = parse_amount_field("amount", &request.amount)?;
    let max_slippage = parse_slippage(request.max_slippage.as_deref())?;

    let result = state
        .balancer()
        .swap(
            request.token_in,
            request.token_out,
            &amount,
            max_slippage.as_ref(),
        )
        .await
        .map_err(balancer_error_to_api)?;
    Ok(Json(result.into()))
}

/// POST /swap/exact-out - Receive an exact output amount
async fn swap_exact_out(
    State(state): State<AppState>,
    Json(request): Json<SwapRequest>,
) -> Result<Json<TxResponse>, ApiFailure> {
    let amount = parse_amount_field("amount", &request.amount)?;
    let max_slippage = parse_slippage(request.max_slippage.as_deref())?;

    let result = state
        .balancer()
        .swap_exact_out(
            request.token_in,
            request.token_out,
            &amount,
            max_slippage.as_ref(),
        )
        .await
        .map_err(balancer_error_to_api)?;
    Ok(Json(result.into()))
}

/// POST /wrap - Native asset into WETH
async fn wrap(
    State(state): State<AppState>,
    Json(request): Json<WrapRequest>,
) -> Result<Json<TxResponse>, ApiFailure> {
    let amount = parse_amount_field("amount", &request.amount)?;
    let result = state
        .balancer()
        .wrap_native(&amount)
        .await
        .map_err(balancer_error_to_api)?;
    Ok(Json(result.into()))
}

/// POST /unwrap - WETH back into the native asset
async fn unwrap(
    State(state): State<AppState>,
    Json(request): Json<WrapRequest>,
) -> Result<Json<TxResponse>, ApiFailure> {
    let amount = parse_amount_field("amount", &request.amount)?;
    let result = state
        .balancer()
        .unwrap_native(&amount)
        .await
        .map_err(balancer_error_to_api)?;
    Ok(Json(result.into()))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::routes::test_support::offline_state;
    use crate::server::create_app;

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_swap_rejects_bad_amount() {
        let app = create_app(offline_state());
        let body = serde_json::json!({
            "token_in": "0x0101010101010101010101010101010101010101",
            "token_out": "0x0202020202020202020202020202020202020202",
            "amount": "one"
        });
        let response = app.oneshot(post_json("/swap", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_swap_rejects_bad_slippage_before_account() {
        let app = create_app(offline_state());
        let body = serde_json::json!({
            "token_in": "0x0101010101010101010101010101010101010101",
            "token_out": "0x0202020202020202020202020202020202020202",
            "amount": "1",
            "max_slippage": "1.5"
        });
        let response = app.oneshot(post_json("/swap", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_quote_surfaces_oracle_failure() {
        let app = create_app(offline_state());
        let body = serde_json::json!({
            "token_in": "0x0101010101010101010101010101010101010101",
            "token_out": "0x0202020202020202020202020202020202020202",
            "amount": "1"
        });
        let response = app.oneshot(post_json("/swap/quote", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
