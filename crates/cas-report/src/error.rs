//! Report failure taxonomy
//!
//! Every stage fails fast; only [`crate::ReportBuilder`] recovers.

use cas_jsonrpc::RpcError;
use std::fmt;
use thiserror::Error;

/// Pipeline step a vendor call belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RootLookup,
    ClientListing,
    MonthlyUsage,
    EndpointListing,
    EndpointDetails,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::RootLookup => "root group lookup",
            Stage::ClientListing => "client listing",
            Stage::MonthlyUsage => "monthly usage",
            Stage::EndpointListing => "endpoint listing",
            Stage::EndpointDetails => "endpoint details",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("{stage}: fetch error: {source}")]
    Transport { stage: Stage, source: RpcError },

    #[error("group listing under {parent_id}: fetch error: {source}")]
    GroupResolution { parent_id: String, source: RpcError },

    #[error("{stage} for {target}: fetch error: {source}")]
    EndpointFetch {
        stage: Stage,
        target: String,
        source: RpcError,
    },

    #[error("root group lookup: null id")]
    MissingRootGroup,
}

pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    pub fn transport(stage: Stage) -> impl FnOnce(RpcError) -> Self {
        move |source| ReportError::Transport { stage, source }
    }

    pub fn group_resolution(parent_id: &str) -> impl FnOnce(RpcError) -> Self + '_ {
        move |source| ReportError::GroupResolution {
            parent_id: parent_id.to_string(),
            source,
        }
    }

    pub fn endpoint_fetch(stage: Stage, target: &str) -> impl FnOnce(RpcError) -> Self + '_ {
        move |source| ReportError::EndpointFetch {
            stage,
            target: target.to_string(),
            source,
        }
    }

    /// Pipeline step that failed
    pub fn stage(&self) -> &'static str {
        match self {
            ReportError::Transport { .. } => "transport",
            ReportError::GroupResolution { .. } => "group_resolution",
            ReportError::EndpointFetch { .. } => "endpoint_fetch",
            ReportError::MissingRootGroup => "missing_root_group",
        }
    }

    /// Upstream HTTP status, when the failure was a rejected call
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ReportError::Transport { source, .. }
            | ReportError::GroupResolution { source, .. }
            | ReportError::EndpointFetch { source, .. } => source.status(),
            ReportError::MissingRootGroup => None,
        }
    }
}
