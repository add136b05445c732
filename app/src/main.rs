//! Weir service binary

use std::sync::Arc;

use anyhow::Context;
use balancer::{Balancer, SorClient, SubgraphClient};
use evm_node_client::NodeClient;
use weir_api::AppState;
use weir_core::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("weir=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    tracing::info!("Starting Weir");

    let config = load_config(&ConfigSources::from_env())?;

    tracing::info!(
        network = %config.chain.network,
        rpc_url = %config.chain.rpc_url,
        "Loaded configuration"
    );

    let node = NodeClient::new(&config.chain).context("creating node client")?;
    let oracle = SorClient::new(&config.chain).context("creating routing oracle client")?;
    let indexer = SubgraphClient::new(&config.chain).context("creating subgraph client")?;

    let caps = node.probe_capabilities().await;
    if caps.is_online && !caps.chain_matches() {
        tracing::warn!(
            chain_id = ?caps.chain_id,
            expected = caps.expected_chain_id,
            "Node is not on the configured network"
        );
    }

    let balancer = Balancer::new(
        config.chain.clone(),
        Arc::new(node.clone()),
        Arc::new(node.clone()),
        Arc::new(oracle),
    );

    let state = AppState::with_node_client(config, balancer, Arc::new(indexer), node);

    weir_api::start_server(state)
        .await
        .context("API server failed")?;
    Ok(())
}

/// Where the configuration comes from: an optional JSON file plus overrides
#[derive(Debug, Default)]
struct ConfigSources {
    path: Option<String>,
    api_host: Option<String>,
    api_port: Option<String>,
    rpc_url: Option<String>,
}

impl ConfigSources {
    fn from_env() -> Self {
        Self {
            path: std::env::var("WEIR_CONFIG").ok(),
            api_host: std::env::var("WEIR_API_HOST").ok(),
            api_port: std::env::var("WEIR_API_PORT").ok(),
            rpc_url: std::env::var("WEIR_RPC_URL").ok(),
        }
    }
}

/// Read the optional config file, then apply environment overrides
fn load_config(sources: &ConfigSources) -> anyhow::Result<AppConfig> {
    let mut config = match &sources.path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path))?;
            AppConfig::from_json(&json)?
        }
        None => AppConfig::default(),
    };

    if let Some(host) = &sources.api_host {
        config.api_host = host.clone();
    }
    if let Some(port) = &sources.api_port {
        config.api_port = port
            .parse()
            .with_context(|| format!("invalid WEIR_API_PORT '{}'", port))?;
    }
    if let Some(url) = &sources.rpc_url {
        config.chain.rpc_url = url.clone();
    }

    Ok(config)
}
