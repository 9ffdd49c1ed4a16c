//! Valid group discovery under a client

use cas_core::Group;
use cas_jsonrpc::methods::GET_CUSTOM_GROUPS_LIST;
use cas_jsonrpc::protocol::decode_result;
use cas_jsonrpc::{ApiDomain, RpcCall};
use serde_json::json;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

use crate::error::{ReportError, Result};

/// Finds every non-deleted group beneath a client's root group.
///
/// Only valid groups are expanded, so the subtree of a `"Deleted"` group is
/// never listed. The client id itself is not part of the result.
pub struct GroupResolver<'a> {
    rpc: &'a dyn RpcCall,
}

impl<'a> GroupResolver<'a> {
    pub fn new(rpc: &'a dyn RpcCall) -> Self {
        Self { rpc }
    }

    /// Resolve valid group ids under `client_id`, in discovery order.
    ///
    /// A client without valid groups yields an empty list.
    pub async fn resolve_valid_groups(&self, client_id: &str) -> Result<Vec<String>> {
        let mut resolved = Vec::new();
        let mut visited: HashSet<String> = HashSet::from([client_id.to_string()]);
        let mut pending = VecDeque::from([client_id.to_string()]);

        while let Some(parent_id) = pending.pop_front() {
            for group in self.list_subgroups(&parent_id).await? {
                if !group.is_valid() {
                    debug!("Skipping deleted group {} under {}", group.id, parent_id);
                    continue;
                }
                if !visited.insert(group.id.clone()) {
                    warn!("Group {} already visited, not expanding again", group.id);
                    continue;
                }
                resolved.push(group.id.clone());
                pending.push_back(group.id);
            }
        }

        Ok(resolved)
    }

    async fn list_subgroups(&self, parent_id: &str) -> Result<Vec<Group>> {
        let result = self
            .rpc
            .call(
                ApiDomain::Network,
                GET_CUSTOM_GROUPS_LIST,
                json!({ "parentId": parent_id }),
            )
            .await
            .map_err(ReportError::group_resolution(parent_id))?;

        decode_result(GET_CUSTOM_GROUPS_LIST, result).map_err(ReportError::group_resolution(parent_id))
    }
}
