//! cas-jsonrpc: JSON-RPC client for the vendor management API
//!
//! This crate provides:
//! - JSON-RPC 2.0 request/response types
//! - The [`RpcCall`] seam the report pipeline is written against
//! - [`RpcClient`], the authenticated HTTP implementation of that seam

pub mod client;
pub mod error;
pub mod protocol;

pub use client::{ApiDomain, RpcCall, RpcClient};
pub use error::{RpcError, RpcResult};

/// Vendor method names consumed by the report
pub mod methods {
    pub const GET_NETWORK_INVENTORY_ITEMS: &str = "getNetworkInventoryItems";
    pub const GET_CUSTOM_GROUPS_LIST: &str = "getCustomGroupsList";
    pub const GET_ENDPOINTS_LIST: &str = "getEndpointsList";
    pub const GET_MANAGED_ENDPOINT_DETAILS: &str = "getManagedEndpointDetails";
    pub const GET_MONTHLY_USAGE_PER_PRODUCT_TYPE: &str = "getMonthlyUsagePerProductType";
}
