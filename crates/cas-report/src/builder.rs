//! Report Builder
//!
//! Top of the pipeline and its only recovery point: any failure below is
//! written to the caller's [`DiagnosticLog`] and the whole report is dropped.

use cas_core::{Client, InventoryItem, Report, ReportConfig};
use cas_jsonrpc::methods::GET_NETWORK_INVENTORY_ITEMS;
use cas_jsonrpc::RpcCall;
use chrono::{Datelike, Local};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::aggregate::ClientAggregator;
use crate::diagnostics::DiagnosticLog;
use crate::error::{ReportError, Result, Stage};
use crate::paging;
use crate::period::last_period;

/// Report settings taken from [`ReportConfig`]
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Inventory id whose first child is the "Companies" group
    pub root_id: String,
    pub monthly_usage: bool,
    pub recursive_endpoints: bool,
}

impl ReportOptions {
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            monthly_usage: true,
            recursive_endpoints: false,
        }
    }
}

impl From<&ReportConfig> for ReportOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            root_id: config.root_id.clone(),
            monthly_usage: config.monthly_usage,
            recursive_endpoints: config.recursive_endpoints,
        }
    }
}

pub struct ReportBuilder {
    rpc: Arc<dyn RpcCall>,
    options: ReportOptions,
}

impl ReportBuilder {
    pub fn new(rpc: Arc<dyn RpcCall>, options: ReportOptions) -> Self {
        Self { rpc, options }
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Build the report for last month.
    ///
    /// Returns `None` when any vendor call fails; the reason is appended to
    /// `diagnostics`.
    pub async fn build_report(&self, diagnostics: &mut DiagnosticLog) -> Option<Report> {
        self.build_report_on(&Local::now().date_naive(), diagnostics).await
    }

    /// Same as [`Self::build_report`], with the billing period derived from `today`
    pub async fn build_report_on<D: Datelike>(
        &self,
        today: &D,
        diagnostics: &mut DiagnosticLog,
    ) -> Option<Report> {
        match self.try_build(last_period(today)).await {
            Ok(report) => {
                info!("Report complete: {} clients", report.len());
                Some(report)
            }
            Err(e) => {
                error!(stage = e.stage(), status = ?e.upstream_status(), "Report failed: {}", e);
                diagnostics.push(&e);
                None
            }
        }
    }

    async fn try_build(&self, target_month: String) -> Result<Report> {
        let rpc = self.rpc.as_ref();

        let companies_id = self.companies_group_id().await?;
        debug!("Companies group id: {}", companies_id);

        let clients = self.managed_clients(&companies_id).await?;
        debug!("Managed clients ({} total): {:?}", clients.len(), clients);

        let aggregator = ClientAggregator::new(rpc, target_month)
            .monthly_usage(self.options.monthly_usage)
            .recursive_endpoints(self.options.recursive_endpoints);

        let mut report = Report::with_capacity(clients.len());
        for client in &clients {
            report.push(aggregator.build_client_row(client).await?);
        }
        Ok(report)
    }

    /// Id of the single "Companies" item under the configured root
    async fn companies_group_id(&self) -> Result<String> {
        let page: paging::Page<InventoryItem> = paging::fetch_page(
            self.rpc.as_ref(),
            GET_NETWORK_INVENTORY_ITEMS,
            json!({ "parentId": self.options.root_id }),
        )
        .await
        .map_err(ReportError::transport(Stage::RootLookup))?;

        page.items
            .into_iter()
            .next()
            .and_then(|item| item.id)
            .filter(|id| !id.is_empty())
            .ok_or(ReportError::MissingRootGroup)
    }

    /// Non-suspended members of the Companies group, in listing order
    async fn managed_clients(&self, companies_id: &str) -> Result<Vec<Client>> {
        let mut params = Map::new();
        params.insert("parentId".to_string(), Value::from(companies_id));

        let items: Vec<InventoryItem> =
            paging::fetch_all(self.rpc.as_ref(), GET_NETWORK_INVENTORY_ITEMS, params)
                .await
                .map_err(ReportError::transport(Stage::ClientListing))?;

        Ok(items
            .into_iter()
            .filter(|item| !item.is_suspended)
            .filter_map(|item| {
                let name = item.name.clone();
                let client = item.into_client();
                if client.is_none() {
                    warn!("Client {:?} has no id, left out of the report", name);
                }
                client
            })
            .collect())
    }
}
