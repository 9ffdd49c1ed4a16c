//! Paged vendor listings
//!
//! List methods answer `{ items, page, pagesCount, perPage, total }`. Pages
//! are requested one at a time until `pagesCount` is reached; a response
//! without `pagesCount` is a single page.

use cas_jsonrpc::protocol::decode_result;
use cas_jsonrpc::{ApiDomain, RpcCall, RpcResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Page size requested from the vendor
pub const PER_PAGE: u64 = 100;

/// One page of a vendor listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub pages_count: Option<u64>,
}

/// Call a list method once, without paging parameters
pub async fn fetch_page<T: DeserializeOwned>(
    rpc: &dyn RpcCall,
    method: &str,
    params: Value,
) -> RpcResult<Page<T>> {
    let result = rpc.call(ApiDomain::Network, method, params).await?;
    decode_result(method, result)
}

/// Walk every page of a list method and concatenate the items
pub async fn fetch_all<T: DeserializeOwned>(
    rpc: &dyn RpcCall,
    method: &str,
    params: Map<String, Value>,
) -> RpcResult<Vec<T>> {
    let mut items = Vec::new();
    let mut page = 1u64;

    loop {
        let mut page_params = params.clone();
        page_params.insert("page".to_string(), Value::from(page));
        page_params.insert("perPage".to_string(), Value::from(PER_PAGE));

        let current: Page<T> = fetch_page(rpc, method, Value::Object(page_params)).await?;
        items.extend(current.items);

        let pages_count = current.pages_count.unwrap_or(1);
        if page >= pages_count {
            break;
        }
        debug!("{}: fetched page {}/{}", method, page, pages_count);
        page += 1;
    }

    Ok(items)
}
