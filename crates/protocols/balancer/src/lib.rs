//! Balancer Protocol Implementation
//!
//! This crate implements the Balancer v1 client flows: balances and
//! approvals, the per-account DSProxy, routed swaps through the
//! ExchangeProxy, and pool creation and exit.

pub mod allowance;
pub mod client;
pub mod constants;
pub mod indexer;
pub mod pool_ops;
pub mod proxy;
pub mod sor;
pub mod state;
pub mod swap;

#[cfg(test)]
mod mock;

// Re-exports
pub use client::{Balancer, Result};
pub use constants::{bounds, describe_revert};
pub use indexer::{my_pools, PoolIndexer, PoolOrder, PoolQuery, SubgraphClient};
pub use pool_ops::{pool_params, PoolParams};
pub use proxy::ProxyManager;
pub use sor::{validate_route, RouteOracle, SorClient};
pub use state::{
    BalancerError, Pool, PoolCreation, PoolShare, PoolToken, Route, SwapHop, SwapQuote, SwapSide,
};
