//! Node status endpoint

use axum::{extract::State, routing::get, Json, Router};
use evm_node_client::NodeCapabilities;

use crate::dto::NodeStatusResponse;
use crate::AppState;

/// Create node routes
pub fn router() -> Router<AppState> {
    Router::new().route("/status", get(get_status))
}

/// GET /node/status - Probe the node and report what it allows
pub async fn get_status(State(state): State<AppState>) -> Json<NodeStatusResponse> {
    let chain = &state.config().chain;

    let (url, caps) = match state.node_client() {
        Some(client) => (client.url().to_string(), client.probe_capabilities().await),
        None => (
            chain.rpc_url.clone(),
            NodeCapabilities::offline(chain.chain_id()),
        ),
    };

    Json(NodeStatusResponse {
        connected: caps.is_online,
        url,
        network: chain.network.as_str().to_string(),
        chain_id: caps.chain_id,
        expected_chain_id: caps.expected_chain_id,
        block_number: caps.block_number,
        capability_tier: caps.capability_tier.as_str().to_string(),
    })
}
