//! Error types for vendor API calls

use thiserror::Error;

/// Failure of a single vendor API call
#[derive(Error, Debug)]
pub enum RpcError {
    /// The vendor answered with a non-2xx status; the body was not read
    #[error("HTTP status {status}")]
    Status { status: u16 },

    /// Connection, TLS or timeout failure
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The vendor answered 2xx with a JSON-RPC error object
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

pub type RpcResult<T> = std::result::Result<T, RpcError>;

impl RpcError {
    pub fn decode(msg: impl Into<String>) -> Self {
        RpcError::Decode(msg.into())
    }

    /// HTTP status when the vendor rejected the call outright
    pub fn status(&self) -> Option<u16> {
        match self {
            RpcError::Status { status } => Some(*status),
            RpcError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
