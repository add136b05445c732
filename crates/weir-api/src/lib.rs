//! weir-api: HTTP API layer for Weir
//!
//! Exposes balances, approvals, swaps and pool operations to the frontend
//! as JSON routes.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::AppState;
