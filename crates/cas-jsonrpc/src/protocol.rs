//! JSON-RPC 2.0 protocol types

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RpcError, RpcResult};

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub id: Value,
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
}

impl JsonRpcRequest {
    /// Create with a specific ID
    pub fn with_id(method: impl Into<String>, params: Value, id: Value) -> Self {
        Self {
            id,
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 response as sent by the vendor
///
/// The vendor does not always echo `jsonrpc` and `id`.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
    #[serde(default)]
    pub id: Value,
}

impl JsonRpcResponse {
    /// Unwrap the `result` member, turning an `error` member into [`RpcError::Rpc`]
    pub fn into_result(self) -> RpcResult<Value> {
        if let Some(error) = self.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        self.result
            .ok_or_else(|| RpcError::decode("response carries neither result nor error"))
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Decode a `result` value into a typed shape
pub fn decode_result<T: DeserializeOwned>(method: &str, value: Value) -> RpcResult<T> {
    serde_json::from_value(value)
        .map_err(|e| RpcError::decode(format!("{} result: {}", method, e)))
}
