//! Managed machine and licensed endpoint counting

use cas_core::{Endpoint, EndpointDetails, EndpointTally};
use cas_jsonrpc::methods::{GET_ENDPOINTS_LIST, GET_MANAGED_ENDPOINT_DETAILS};
use cas_jsonrpc::protocol::decode_result;
use cas_jsonrpc::{ApiDomain, RpcCall};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::{ReportError, Result, Stage};
use crate::paging;

/// Counts managed machines across a set of groups, then checks each one's
/// license seat with a detail lookup.
///
/// Machines listed under more than one group are counted once per group.
pub struct EndpointCounter<'a> {
    rpc: &'a dyn RpcCall,
    recursive: bool,
}

impl<'a> EndpointCounter<'a> {
    pub fn new(rpc: &'a dyn RpcCall) -> Self {
        Self {
            rpc,
            recursive: false,
        }
    }

    /// Also list endpoints of folders nested in each group
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub async fn count_endpoints(&self, group_ids: &[String]) -> Result<EndpointTally> {
        let mut managed: Vec<Endpoint> = Vec::new();
        for group_id in group_ids {
            let listed = self.list_managed(group_id).await?;
            debug!("Group {}: {} managed machines", group_id, listed.len());
            managed.extend(listed);
        }

        let mut licensed = 0u64;
        for endpoint in &managed {
            if self.details(&endpoint.id).await?.is_licensed() {
                licensed += 1;
            }
        }

        Ok(EndpointTally {
            machines: managed.len() as u64,
            licensed,
        })
    }

    async fn list_managed(&self, group_id: &str) -> Result<Vec<Endpoint>> {
        let items: Vec<Endpoint> = paging::fetch_all(self.rpc, GET_ENDPOINTS_LIST, self.list_params(group_id))
            .await
            .map_err(ReportError::endpoint_fetch(Stage::EndpointListing, group_id))?;

        Ok(items.into_iter().filter(|e| e.is_managed).collect())
    }

    fn list_params(&self, group_id: &str) -> Map<String, Value> {
        let mut filters = json!({
            "type": { "computers": true, "virtualMachines": true }
        });
        if self.recursive {
            filters["depth"] = json!({ "allItemsRecursively": true });
        }

        let mut params = Map::new();
        params.insert("parentId".to_string(), Value::from(group_id));
        params.insert("filters".to_string(), filters);
        params
    }

    async fn details(&self, endpoint_id: &str) -> Result<EndpointDetails> {
        let fetch = ReportError::endpoint_fetch(Stage::EndpointDetails, endpoint_id);
        let result = self
            .rpc
            .call(
                ApiDomain::Network,
                GET_MANAGED_ENDPOINT_DETAILS,
                json!({ "endpointId": endpoint_id }),
            )
            .await;

        match result {
            Ok(value) => decode_result(GET_MANAGED_ENDPOINT_DETAILS, value).map_err(fetch),
            Err(e) => Err(fetch(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRpc;

    fn machine(id: &str, managed: bool) -> Value {
        json!({ "id": id, "isManaged": managed })
    }

    fn ids(groups: &[&str]) -> Vec<String> {
        groups.iter().map(|g| g.to_string()).collect()
    }

    #[tokio::test]
    async fn test_counts_managed_and_licensed() {
        let rpc = ScriptedRpc::new()
            .endpoints("g1", vec![machine("e1", true), machine("e2", false), machine("e3", true)])
            .endpoints("g2", vec![machine("e4", true)])
            .licensed("e1", 1)
            .licensed("e3", 0)
            .licensed("e4", 1);

        let tally = EndpointCounter::new(&rpc).count_endpoints(&ids(&["g1", "g2"])).await.unwrap();
        assert_eq!(tally, EndpointTally { machines: 3, licensed: 2 });

        // unmanaged machines get no detail lookup
        let looked_up: Vec<_> = rpc
            .calls_to(GET_MANAGED_ENDPOINT_DETAILS)
            .iter()
            .map(|p| p["endpointId"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(looked_up, ["e1", "e3", "e4"]);
    }

    #[tokio::test]
    async fn test_duplicates_across_groups_are_kept() {
        let rpc = ScriptedRpc::new()
            .endpoints("g1", vec![machine("e1", true)])
            .endpoints("g2", vec![machine("e1", true)])
            .licensed("e1", 1);

        let tally = EndpointCounter::new(&rpc).count_endpoints(&ids(&["g1", "g2"])).await.unwrap();
        assert_eq!(tally.machines, 2);
        assert_eq!(tally.licensed, 2);
        assert!(tally.licensed <= tally.machines);
    }

    #[tokio::test]
    async fn test_no_groups_issue_no_calls() {
        let rpc = ScriptedRpc::new();
        let tally = EndpointCounter::new(&rpc).count_endpoints(&[]).await.unwrap();
        assert_eq!(tally, EndpointTally::default());
        assert!(rpc.calls().is_empty());
    }

    #[tokio::test]
    async fn test_listing_params() {
        let rpc = ScriptedRpc::new();
        EndpointCounter::new(&rpc).count_endpoints(&ids(&["g1"])).await.unwrap();
        EndpointCounter::new(&rpc)
            .recursive(true)
            .count_endpoints(&ids(&["g2"]))
            .await
            .unwrap();

        let calls = rpc.calls_to(GET_ENDPOINTS_LIST);
        assert_eq!(calls[0]["parentId"], "g1");
        assert_eq!(calls[0]["filters"]["type"]["virtualMachines"], true);
        assert!(calls[0]["filters"].get("depth").is_none());
        assert_eq!(calls[1]["filters"]["depth"]["allItemsRecursively"], true);
    }

    #[tokio::test]
    async fn test_detail_failure_aborts() {
        let rpc = ScriptedRpc::new()
            .endpoints("g1", vec![machine("e1", true), machine("e2", true)])
            .licensed("e1", 1)
            .fail(GET_MANAGED_ENDPOINT_DETAILS, "e2", 503);

        let err = EndpointCounter::new(&rpc).count_endpoints(&ids(&["g1"])).await.unwrap_err();
        assert!(matches!(
            err,
            ReportError::EndpointFetch { stage: Stage::EndpointDetails, .. }
        ));
        assert_eq!(err.upstream_status(), Some(503));
    }

    #[tokio::test]
    async fn test_listing_failure_aborts() {
        let rpc = ScriptedRpc::new().fail(GET_ENDPOINTS_LIST, "g1", 500);
        let err = EndpointCounter::new(&rpc).count_endpoints(&ids(&["g1"])).await.unwrap_err();
        assert!(matches!(
            err,
            ReportError::EndpointFetch { stage: Stage::EndpointListing, .. }
        ));
    }
}
