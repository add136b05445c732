//! Error types for Weir

use thiserror::Error;

/// Core errors that can occur in Weir
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Node transport and query errors
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Node unreachable at {url}")]
    Unreachable { url: String },

    #[error("Node request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Node returned error: {message}")]
    Node { message: String },

    /// The node or wallet refused the transaction before it was mined
    #[error("Transaction rejected: {message}")]
    Rejected { message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl RpcError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "node_unreachable",
            Self::Timeout { .. } => "node_timeout",
            Self::Node { .. } => "node_error",
            Self::Rejected { .. } => "tx_rejected",
            Self::Decode(_) => "decode_error",
            Self::InvalidUrl(_) => "invalid_url",
        }
    }
}
