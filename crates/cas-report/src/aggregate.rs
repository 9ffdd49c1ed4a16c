//! One report row per client

use cas_core::{Client, ClientReportRow};
use cas_jsonrpc::methods::GET_MONTHLY_USAGE_PER_PRODUCT_TYPE;
use cas_jsonrpc::{ApiDomain, RpcCall};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::endpoints::EndpointCounter;
use crate::error::{ReportError, Result, Stage};
use crate::groups::GroupResolver;

pub struct ClientAggregator<'a> {
    rpc: &'a dyn RpcCall,
    target_month: String,
    monthly_usage: bool,
    recursive_endpoints: bool,
}

impl<'a> ClientAggregator<'a> {
    /// `target_month` is the `MM/YYYY` period handed to the monthly usage lookup
    pub fn new(rpc: &'a dyn RpcCall, target_month: impl Into<String>) -> Self {
        Self {
            rpc,
            target_month: target_month.into(),
            monthly_usage: true,
            recursive_endpoints: false,
        }
    }

    pub fn monthly_usage(mut self, enabled: bool) -> Self {
        self.monthly_usage = enabled;
        self
    }

    pub fn recursive_endpoints(mut self, enabled: bool) -> Self {
        self.recursive_endpoints = enabled;
        self
    }

    pub async fn build_client_row(&self, client: &Client) -> Result<ClientReportRow> {
        let groups = GroupResolver::new(self.rpc)
            .resolve_valid_groups(&client.id)
            .await?;
        debug!("Client {}: valid groups {:?}", client.name, groups);

        if self.monthly_usage {
            let usage = self.monthly_usage_for(client).await?;
            debug!("Client {}: usage for {}: {}", client.name, self.target_month, usage);
        }

        let tally = EndpointCounter::new(self.rpc)
            .recursive(self.recursive_endpoints)
            .count_endpoints(&groups)
            .await?;
        info!(
            "Client {}: {} machines, {} licensed endpoints",
            client.name, tally.machines, tally.licensed
        );

        Ok(ClientReportRow::new(client.name.clone(), tally))
    }

    /// Usage per product type for the target period; logged, never billed
    async fn monthly_usage_for(&self, client: &Client) -> Result<Value> {
        self.rpc
            .call(
                ApiDomain::Licensing,
                GET_MONTHLY_USAGE_PER_PRODUCT_TYPE,
                json!({ "companyId": client.company_id, "targetMonth": self.target_month }),
            )
            .await
            .map_err(ReportError::transport(Stage::MonthlyUsage))
    }
}
