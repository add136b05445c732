//! HTTP server setup

use axum::http::Method;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use weir_core::AppConfig;

use crate::routes::create_router;
use crate::AppState;

/// Router with CORS and request tracing applied
pub fn create_app(state: AppState) -> Router {
    // Every route is a GET read or a POST action
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bind the configured API host and port
pub async fn bind(config: &AppConfig) -> std::io::Result<TcpListener> {
    TcpListener::bind((config.api_host.as_str(), config.api_port)).await
}

/// Serve the API on the configured address until the process stops
pub async fn start_server(state: AppState) -> std::io::Result<()> {
    let listener = bind(state.config()).await?;
    let addr = listener.local_addr()?;

    tracing::info!(
        %addr,
        network = %state.config().chain.network,
        "API server listening"
    );

    axum::serve(listener, create_app(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::routes::test_support::offline_state;

    #[tokio::test]
    async fn test_bind_uses_configured_host() {
        let config = AppConfig {
            api_host: "127.0.0.1".to_string(),
            api_port: 0,
            ..AppConfig::default()
        };
        let listener = bind(&config).await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_post() {
        let app = create_app(offline_state());
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/swap")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
