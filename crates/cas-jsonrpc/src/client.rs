//! Authenticated JSON-RPC client for the vendor API
//!
//! Every call is a single POST with no retries. A non-2xx status aborts the
//! call before the body is read.

use async_trait::async_trait;
use base64::Engine;
use cas_core::ReportConfig;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

use crate::error::{RpcError, RpcResult};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};

/// Vendor sub-API a method lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiDomain {
    /// Inventory, custom groups and endpoints
    Network,
    Licensing,
}

impl ApiDomain {
    pub fn path(&self) -> &'static str {
        match self {
            ApiDomain::Network => "/v1.0/jsonrpc/network",
            ApiDomain::Licensing => "/v1.0/jsonrpc/licensing",
        }
    }
}

impl fmt::Display for ApiDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiDomain::Network => write!(f, "network"),
            ApiDomain::Licensing => write!(f, "licensing"),
        }
    }
}

/// One vendor call: method + params in, `result` member out
#[async_trait]
pub trait RpcCall: Send + Sync {
    async fn call(&self, domain: ApiDomain, method: &str, params: Value) -> RpcResult<Value>;
}

/// reqwest-backed [`RpcCall`]
pub struct RpcClient {
    http_client: reqwest::Client,
    base_url: String,
    query_id: Value,
}

impl RpcClient {
    /// Create a client from the report configuration
    pub fn new(config: &ReportConfig) -> RpcResult<Self> {
        let credentials = base64::engine::general_purpose::STANDARD.encode(&config.api_key);
        let mut auth = HeaderValue::from_str(&format!("Basic {}", credentials))
            .map_err(|_| RpcError::Config("API key does not form a valid header".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RpcError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.domain.trim_end_matches('/').to_string(),
            query_id: Value::String(config.query_id.clone()),
        })
    }

    /// Full URL of a sub-API
    pub fn endpoint(&self, domain: ApiDomain) -> String {
        format!("{}{}", self.base_url, domain.path())
    }
}

#[async_trait]
impl RpcCall for RpcClient {
    async fn call(&self, domain: ApiDomain, method: &str, params: Value) -> RpcResult<Value> {
        let request = JsonRpcRequest::with_id(method, params, self.query_id.clone());
        let url = self.endpoint(domain);
        debug!("{} -> {} {}", domain, method, request.params);

        let response = self.http_client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} {} returned HTTP {}", domain, method, status.as_u16());
            return Err(RpcError::Status {
                status: status.as_u16(),
            });
        }

        let body: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::decode(format!("{} body: {}", method, e)))?;
        body.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Seen {
        calls: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
    }

    async fn spawn_vendor(status: StatusCode, reply: Value) -> (String, Seen) {
        let seen = Seen::default();
        let record = |path: &'static str| {
            let reply = reply.clone();
            move |State(seen): State<Seen>, headers: AxumHeaders, Json(body): Json<Value>| {
                let reply = reply.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    seen.calls.lock().unwrap().push((path.to_string(), auth, body));
                    (status, Json(reply))
                }
            }
        };
        let app = Router::new()
            .route("/v1.0/jsonrpc/network", post(record("network")))
            .route("/v1.0/jsonrpc/licensing", post(record("licensing")))
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), seen)
    }

    fn config(domain: &str) -> ReportConfig {
        ReportConfig {
            api_key: "secret-key".into(),
            query_id: "q-7".into(),
            domain: domain.into(),
            root_id: "root".into(),
            verbose: false,
            request_timeout: Duration::from_secs(5),
            monthly_usage: true,
            recursive_endpoints: false,
        }
    }

    #[test]
    fn test_domain_paths() {
        assert_eq!(ApiDomain::Network.path(), "/v1.0/jsonrpc/network");
        assert_eq!(ApiDomain::Licensing.path(), "/v1.0/jsonrpc/licensing");
    }

    #[tokio::test]
    async fn test_call_sends_envelope_and_basic_auth() {
        let (url, seen) = spawn_vendor(StatusCode::OK, json!({"id": "q-7", "jsonrpc": "2.0", "result": {"items": []}})).await;
        let client = RpcClient::new(&config(&url)).unwrap();

        let result = client
            .call(ApiDomain::Licensing, "getMonthlyUsagePerProductType", json!({"companyId": "c1"}))
            .await
            .unwrap();
        assert_eq!(result, json!({"items": []}));

        let calls = seen.calls.lock().unwrap();
        let (path, auth, body) = &calls[0];
        assert_eq!(path, "licensing");
        // base64("secret-key")
        assert_eq!(auth.as_deref(), Some("Basic c2VjcmV0LWtleQ=="));
        assert_eq!(body["id"], "q-7");
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["method"], "getMonthlyUsagePerProductType");
        assert_eq!(body["params"]["companyId"], "c1");
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let (url, _) = spawn_vendor(StatusCode::FORBIDDEN, json!({"result": {}})).await;
        let client = RpcClient::new(&config(&url)).unwrap();

        let err = client
            .call(ApiDomain::Network, "getCustomGroupsList", json!({"parentId": "c1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Status { status: 403 }));
        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test]
    async fn test_rpc_error_object_is_surfaced() {
        let (url, _) = spawn_vendor(
            StatusCode::OK,
            json!({"jsonrpc": "2.0", "id": "q-7", "error": {"code": -32602, "message": "Invalid params"}}),
        )
        .await;
        let client = RpcClient::new(&config(&url)).unwrap();

        let err = client
            .call(ApiDomain::Network, "getEndpointsList", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Rpc { code: -32602, .. }));
    }
}
