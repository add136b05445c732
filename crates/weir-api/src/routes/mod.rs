//! API route handlers

pub mod account;
pub mod health;
pub mod node;
pub mod pools;
pub mod swap;
pub mod tokens;

use axum::{routing::get, Router};

use crate::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(account::router())
        .nest("/node", node::router())
        .nest("/tokens", tokens::router())
        .nest("/pools", pools::router())
        .merge(swap::router())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use alloy::primitives::{Address, Bytes, U256};
    use async_trait::async_trait;
    use balancer::{
        Balancer, BalancerError, Pool, PoolIndexer, PoolQuery, PoolShare, Route, RouteOracle,
        SwapSide,
    };
    use evm_node_client::{ChainReader, TransactionSender};
    use evm_tx::{TxReceipt, TxRequest};
    use weir_core::{AppConfig, RpcError};

    use crate::AppState;

    /// Capabilities that fail every network call
    pub struct Offline;

    #[async_trait]
    impl ChainReader for Offline {
        async fn call(&self, _to: Address, _data: Bytes) -> Result<Bytes, RpcError> {
            Err(RpcError::Unreachable {
                url: "offline".into(),
            })
        }

        async fn native_balance(&self, _account: Address) -> Result<U256, RpcError> {
            Err(RpcError::Unreachable {
                url: "offline".into(),
            })
        }
    }

    #[async_trait]
    impl TransactionSender for Offline {
        async fn account(&self) -> Result<Option<Address>, RpcError> {
            Ok(None)
        }

        async fn send(&self, _request: TxRequest) -> Result<TxReceipt, RpcError> {
            Err(RpcError::Unreachable {
                url: "offline".into(),
            })
        }
    }

    #[async_trait]
    impl RouteOracle for Offline {
        async fn get_swaps(
            &self,
            _token_in: Address,
            _token_out: Address,
            _side: SwapSide,
            _amount: U256,
        ) -> balancer::Result<Route> {
            Err(BalancerError::Oracle {
                message: "offline".into(),
            })
        }
    }

    #[async_trait]
    impl PoolIndexer for Offline {
        async fn list_pools(&self, _query: &PoolQuery) -> balancer::Result<Vec<Pool>> {
            Ok(vec![])
        }

        async fn list_pool_shares(&self, _account: Address) -> balancer::Result<Vec<PoolShare>> {
            Ok(vec![])
        }
    }

    pub fn offline_state() -> AppState {
        let config = AppConfig::default();
        let balancer = Balancer::new(
            config.chain.clone(),
            Arc::new(Offline),
            Arc::new(Offline),
            Arc::new(Offline),
        );
        AppState::new(config, balancer, Arc::new(Offline))
    }
}
