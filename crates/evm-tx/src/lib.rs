//! evm-tx: Transaction building utilities for EVM chains
//!
//! Provides fixed-point amount scaling, transaction request/receipt
//! structures and revert decoding.

pub mod request;
pub mod revert;
pub mod units;

pub use request::{settle, FailureCause, TransactionResult, TxReceipt, TxRequest, TxStatus};
pub use revert::decode_revert_data;
pub use units::{
    from_base_units, from_base_units_with, parse_amount, scale, slippage_ceil, slippage_floor,
    to_base_units, to_base_units_with, UnitError,
};
