//! Application state shared across API handlers

use std::sync::Arc;

use balancer::{Balancer, PoolIndexer};
use evm_node_client::NodeClient;
use weir_core::AppConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    balancer: Balancer,
    indexer: Arc<dyn PoolIndexer>,
    node_client: Option<NodeClient>,
}

impl AppState {
    pub fn new(config: AppConfig, balancer: Balancer, indexer: Arc<dyn PoolIndexer>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                balancer,
                indexer,
                node_client: None,
            }),
        }
    }

    /// Attach the node client so `/node/status` can report on it
    pub fn with_node_client(
        config: AppConfig,
        balancer: Balancer,
        indexer: Arc<dyn PoolIndexer>,
        node_client: NodeClient,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                balancer,
                indexer,
                node_client: Some(node_client),
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn balancer(&self) -> &Balancer {
        &self.inner.balancer
    }

    pub fn indexer(&self) -> &dyn PoolIndexer {
        self.inner.indexer.as_ref()
    }

    pub fn node_client(&self) -> Option<&NodeClient> {
        self.inner.node_client.as_ref()
    }
}
