//! Application State

use anyhow::Context;
use cas_core::ReportConfig;
use cas_jsonrpc::{RpcCall, RpcClient};
use cas_report::{ReportBuilder, ReportOptions};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::session::ReportSessions;

/// Application state shared across all handlers
pub struct AppState {
    /// Report pipeline bound to the vendor API
    pub builder: ReportBuilder,
    pub sessions: ReportSessions,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// State talking to the real vendor API
    pub fn from_config(config: &ReportConfig) -> anyhow::Result<Self> {
        let client = RpcClient::new(config).context("Failed to create vendor API client")?;
        info!(
            "Vendor API at {} (timeout {:?}, monthly usage {}, recursive endpoints {})",
            config.domain, config.request_timeout, config.monthly_usage, config.recursive_endpoints
        );
        Ok(Self::with_rpc(Arc::new(client), ReportOptions::from(config)))
    }

    pub fn with_rpc(rpc: Arc<dyn RpcCall>, options: ReportOptions) -> Self {
        Self {
            builder: ReportBuilder::new(rpc, options),
            sessions: ReportSessions::new(),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
