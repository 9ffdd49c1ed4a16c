//! Scripted in-memory vendor for pipeline tests

use async_trait::async_trait;
use cas_jsonrpc::methods::*;
use cas_jsonrpc::{ApiDomain, RpcCall, RpcError, RpcResult};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// Answers vendor calls from fixed tables and records every call.
///
/// Unknown parents list as empty, so a group without a script is a leaf.
#[derive(Default)]
pub(crate) struct ScriptedRpc {
    inventory: HashMap<String, Vec<Vec<Value>>>,
    groups: HashMap<String, Vec<Value>>,
    endpoints: HashMap<String, Vec<Vec<Value>>>,
    details: HashMap<String, Value>,
    failures: Vec<(&'static str, String, u16)>,
    calls: Mutex<Vec<(ApiDomain, String, Value)>>,
}

impl ScriptedRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inventory(self, parent: &str, items: Vec<Value>) -> Self {
        self.inventory_pages(parent, vec![items])
    }

    pub fn inventory_pages(mut self, parent: &str, pages: Vec<Vec<Value>>) -> Self {
        self.inventory.insert(parent.to_string(), pages);
        self
    }

    pub fn groups(mut self, parent: &str, groups: Vec<Value>) -> Self {
        self.groups.insert(parent.to_string(), groups);
        self
    }

    pub fn endpoints(self, parent: &str, items: Vec<Value>) -> Self {
        self.endpoint_pages(parent, vec![items])
    }

    pub fn endpoint_pages(mut self, parent: &str, pages: Vec<Vec<Value>>) -> Self {
        self.endpoints.insert(parent.to_string(), pages);
        self
    }

    pub fn licensed(mut self, endpoint_id: &str, licensed: i64) -> Self {
        self.details.insert(
            endpoint_id.to_string(),
            json!({"id": endpoint_id, "agent": {"licensed": licensed}}),
        );
        self
    }

    /// Reject calls of `method` keyed on `key` with an HTTP status
    pub fn fail(mut self, method: &'static str, key: &str, status: u16) -> Self {
        self.failures.push((method, key.to_string(), status));
        self
    }

    pub fn calls(&self) -> Vec<(ApiDomain, String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(_, m, _)| m == method)
            .map(|(_, _, params)| params)
            .collect()
    }

    /// Listing envelope for the requested `page` (1-based, default 1)
    fn page_of(pages: Option<&Vec<Vec<Value>>>, params: &Value) -> Value {
        let page = params.get("page").and_then(Value::as_u64).unwrap_or(1);
        let pages = pages.cloned().unwrap_or_default();
        let items = pages.get(page.saturating_sub(1) as usize).cloned().unwrap_or_default();
        let total: usize = pages.iter().map(Vec::len).sum();
        json!({"items": items, "page": page, "pagesCount": pages.len().max(1), "total": total})
    }

    fn key(params: &Value) -> String {
        ["parentId", "endpointId", "companyId"]
            .iter()
            .find_map(|k| params.get(*k).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string()
    }
}

#[async_trait]
impl RpcCall for ScriptedRpc {
    async fn call(&self, domain: ApiDomain, method: &str, params: Value) -> RpcResult<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((domain, method.to_string(), params.clone()));

        let key = Self::key(&params);
        if let Some((_, _, status)) = self
            .failures
            .iter()
            .find(|(m, k, _)| *m == method && *k == key)
        {
            return Err(RpcError::Status { status: *status });
        }

        match method {
            GET_NETWORK_INVENTORY_ITEMS => Ok(Self::page_of(self.inventory.get(&key), &params)),
            GET_CUSTOM_GROUPS_LIST => Ok(Value::Array(
                self.groups.get(&key).cloned().unwrap_or_default(),
            )),
            GET_ENDPOINTS_LIST => Ok(Self::page_of(self.endpoints.get(&key), &params)),
            GET_MANAGED_ENDPOINT_DETAILS => self.details.get(&key).cloned().ok_or(RpcError::Rpc {
                code: -32602,
                message: format!("unknown endpoint {}", key),
            }),
            GET_MONTHLY_USAGE_PER_PRODUCT_TYPE => Ok(json!({"companyId": key, "usage": []})),
            _ => Err(RpcError::Rpc {
                code: -32601,
                message: "Method not found".to_string(),
            }),
        }
    }
}
