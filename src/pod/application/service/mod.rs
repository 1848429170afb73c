mod composition_service;
mod discovery_service;
mod lifecycle_service;
mod storage_service;

pub(crate) use composition_service::CompositionService;
pub(crate) use discovery_service::DiscoveryService;
pub(crate) use lifecycle_service::LifecycleService;

use crate::core::domain::error::RsdResult;
use crate::core::infrastructure::RedfishClient;
use serde_json::Value;

pub(crate) const REDFISH_SYSTEMS: &str = "redfish/v1/Systems";
pub(crate) const REDFISH_NODES: &str = "redfish/v1/Nodes";
pub(crate) const REDFISH_SERVICES: &str = "redfish/v1/Services";

/// Fetches a collection resource and returns the member paths, with the
/// leading slash stripped so they can be joined onto the base URL.
pub(crate) async fn list_resources(
    client: &RedfishClient,
    path: &str,
) -> RsdResult<Vec<String>> {
    let collection = client.get(path).await?;
    Ok(collection
        .get("Members")
        .and_then(Value::as_array)
        .map(|members| members.iter().filter_map(resource_path).collect())
        .unwrap_or_default())
}

/// Extracts the `@odata.id` reference of a linked resource.
pub(crate) fn resource_path(member: &Value) -> Option<String> {
    member
        .get("@odata.id")
        .and_then(Value::as_str)
        .map(|p| p.trim_start_matches('/').to_string())
}
