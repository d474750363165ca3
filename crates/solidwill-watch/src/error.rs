//! Error types for the reconciliation loop.

use thiserror::Error;

use solidwill_contract::AbiError;

/// Errors that can occur while watching or acting on the contract.
#[derive(Debug, Error)]
pub enum WatchError {
    /// WebSocket connection or communication error.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(String),

    /// The node returned a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Return data decoding error.
    #[error("ABI error: {0}")]
    Abi(#[from] AbiError),

    /// User input rejected before any network attempt.
    #[error("{0}")]
    Validation(String),

    /// A write was requested but no account is connected.
    #[error("no connected account")]
    NoSigner,

    /// Head stream ended unexpectedly.
    #[error("head stream ended unexpectedly")]
    StreamEnded,
}

impl From<reqwest::Error> for WatchError {
    fn from(e: reqwest::Error) -> Self {
        WatchError::Http(e.to_string())
    }
}

impl From<serde_json::Error> for WatchError {
    fn from(e: serde_json::Error) -> Self {
        WatchError::Json(e.to_string())
    }
}
