//! Report data model
//!
//! Everything here lives for a single report run. The web layer keeps the
//! finished [`Report`] in the caller's session and nowhere else.

use serde::{Deserialize, Serialize};

/// Name of the inventory folder whose contents never count towards billing
pub const DELETED_GROUP_NAME: &str = "Deleted";

/// A managed customer account listed under the "Companies" root group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub company_id: String,
}

/// Inventory item as returned by `getNetworkInventoryItems`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub is_suspended: bool,
}

impl InventoryItem {
    /// Project a listing item onto a [`Client`].
    ///
    /// Items without an id cannot be queried further and yield `None`.
    /// A missing company id falls back to the item's own id.
    pub fn into_client(self) -> Option<Client> {
        let id = self.id?;
        let company_id = self.company_id.unwrap_or_else(|| id.clone());
        Some(Client {
            id,
            name: self.name,
            company_id,
        })
    }
}

/// Custom group as returned by `getCustomGroupsList`
#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl Group {
    /// Whether this group takes part in billing
    pub fn is_valid(&self) -> bool {
        self.name != DELETED_GROUP_NAME
    }
}

/// Endpoint as returned by `getEndpointsList`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub id: String,
    #[serde(default)]
    pub is_managed: bool,
}

/// Subset of `getManagedEndpointDetails` used for license counting
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointDetails {
    #[serde(default)]
    pub agent: Option<AgentInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentInfo {
    #[serde(default)]
    pub licensed: Option<i64>,
}

impl EndpointDetails {
    /// A license seat is active only when the agent reports exactly `1`
    pub fn is_licensed(&self) -> bool {
        matches!(self.agent.as_ref().and_then(|a| a.licensed), Some(1))
    }
}

/// Machine and licensed-endpoint totals for one client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EndpointTally {
    pub machines: u64,
    pub licensed: u64,
}

/// One billing row per client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientReportRow {
    pub name: String,
    pub machines: u64,
    pub endpoints: u64,
}

impl ClientReportRow {
    pub fn new(name: impl Into<String>, tally: EndpointTally) -> Self {
        Self {
            name: name.into(),
            machines: tally.machines,
            endpoints: tally.licensed,
        }
    }
}

/// Rows in client listing order
pub type Report = Vec<ClientReportRow>;
