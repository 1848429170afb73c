//! Machine composition: allocation payloads, topology retries, assembly.

use super::discovery_service::DiscoveryService;
use super::lifecycle_service::LifecycleService;
use super::storage_service::{
    MasterDrive, RemoteStorage, StorageService, calculate_remote_storage,
    select_remote_master,
};
use super::REDFISH_NODES;
use crate::core::domain::error::{RsdError, RsdResult};
use crate::core::domain::model::{
    ClientConfig, DiscoveredMachine, DiscoveredPodHints, RequestedMachine,
};
use crate::core::domain::units::bytes_to_gib;
use crate::core::infrastructure::RedfishClient;
use reqwest::header::LOCATION;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::debug;

/// Candidate processor layouts for a core count, widest sockets last.
///
/// Starting from a single socket holding every core, each step doubles the
/// socket count and halves the cores per socket, stopping once the split
/// would stop being integral. Zero cores yields no candidates.
pub(crate) fn processor_topologies(cores: u32) -> Vec<(u32, u32)> {
    let mut topologies = Vec::new();
    if cores == 0 {
        return topologies;
    }
    let mut processors = 1u32;
    let mut per_processor = cores;
    loop {
        topologies.push((processors, per_processor));
        if per_processor % 2 != 0 {
            break;
        }
        processors *= 2;
        per_processor /= 2;
    }
    topologies
}

/// Maps a normalized architecture onto the provider's instruction set name.
fn instruction_set(architecture: &str) -> String {
    match architecture {
        "amd64/generic" => "x86-64".to_string(),
        other => other.to_string(),
    }
}

/// Drive type for an allocation payload; explicit requests win over the
/// generic default.
fn local_drive_type(tags: &[String]) -> &'static str {
    if tags.iter().any(|t| t == "ssd") {
        "SSD"
    } else if tags.iter().any(|t| t == "nvme") {
        "NVMe"
    } else {
        "HDD"
    }
}

/// Builds the allocation payload for one processor topology candidate.
///
/// Every remote device reserves capacity from `remote_storage`, so a request
/// with several iSCSI drives cannot oversubscribe a single volume group. A
/// request that cannot be backed by any group fails with `InvalidResources`.
fn convert_request_to_json_payload(
    processors: u32,
    cores_per_processor: u32,
    request: &RequestedMachine,
    remote_storage: &mut BTreeMap<String, RemoteStorage>,
) -> RsdResult<Value> {
    let speed = if request.cpu_speed == 0 {
        Value::Null
    } else {
        json!(request.cpu_speed)
    };
    let processor_entries: Vec<Value> = (0..processors)
        .map(|_| {
            json!({
                "Model": Value::Null,
                "TotalCores": cores_per_processor,
                "AchievableSpeedMHz": speed,
                "InstructionSet": instruction_set(&request.architecture),
            })
        })
        .collect();

    let memory = json!([{
        "SpeedMHz": Value::Null,
        "CapacityMiB": request.memory,
        "DataWidthBits": Value::Null,
    }]);

    let interfaces: Vec<Value> = request
        .interfaces
        .iter()
        .map(|interface| {
            json!({
                "SpeedMbps": Value::Null,
                "PrimaryVLAN": interface.vlan,
            })
        })
        .collect();

    let mut local_drives = Vec::new();
    let mut remote_drives = Vec::new();
    for (index, device) in request.block_devices.iter().enumerate() {
        if device.is_local() {
            local_drives.push(json!({
                "SerialNumber": Value::Null,
                "Type": local_drive_type(&device.tags),
                "CapacityGiB": bytes_to_gib(device.size),
                "MinRPM": Value::Null,
                "Interface": Value::Null,
            }));
        } else {
            let master = select_remote_master(remote_storage, device.size)
                .ok_or_else(|| {
                    RsdError::InvalidResources(format!(
                        "no remote storage can back a {} byte drive",
                        device.size
                    ))
                })?;
            remote_drives.push(remote_drive_entry(&request.hostname, index, device.size, &master));
        }
    }

    Ok(json!({
        "Name": request.hostname,
        "Processors": processor_entries,
        "Memory": memory,
        "EthernetInterfaces": interfaces,
        "LocalDrives": local_drives,
        "RemoteDrives": remote_drives,
    }))
}

fn remote_drive_entry(hostname: &str, index: usize, size: u64, master: &MasterDrive) -> Value {
    json!({
        "CapacityGiB": bytes_to_gib(size),
        "iSCSIAddress": format!("iqn.2010-08.io.maas:{hostname}-{index}"),
        "Master": {
            "Type": "Snapshot",
            "Resource": {"@odata.id": format!("/{}", master.path)},
        },
    })
}

/// Outcome of a single allocation attempt. Exhaustion is an expected result
/// that drives the topology retry loop; every other failure aborts it.
enum AllocationAttempt {
    Allocated(String),
    Exhausted(String),
}

fn location_to_path(location: &str) -> String {
    match url::Url::parse(location) {
        Ok(parsed) => parsed.path().trim_start_matches('/').to_string(),
        Err(_) => location.trim_start_matches('/').to_string(),
    }
}

/// Composes machines out of the pod's free resources.
pub(crate) struct CompositionService<'a> {
    client: &'a RedfishClient,
    config: &'a ClientConfig,
}

impl<'a> CompositionService<'a> {
    pub(crate) fn new(client: &'a RedfishClient, config: &'a ClientConfig) -> Self {
        Self { client, config }
    }

    async fn attempt_allocation(&self, payload: &Value) -> RsdResult<AllocationAttempt> {
        match self.client.post(REDFISH_NODES, Some(payload)).await {
            Ok((_, headers)) => {
                let location = headers
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| {
                        RsdError::Action(
                            "allocation response carried no Location header".to_string(),
                        )
                    })?;
                Ok(AllocationAttempt::Allocated(location_to_path(location)))
            }
            Err(RsdError::ResourceExhausted(message)) => {
                Ok(AllocationAttempt::Exhausted(message))
            }
            Err(error) => Err(error),
        }
    }

    /// Composes a machine matching `request`.
    ///
    /// Allocation is retried across processor topologies in increasing
    /// socket count; only provider-reported exhaustion triggers the next
    /// candidate. The allocated node is assembled, armed for PXE boot and
    /// resolved into a `DiscoveredMachine`, and a fresh discovery pass
    /// supplies the post-composition capacity hints.
    pub(crate) async fn compose(
        &self,
        request: &RequestedMachine,
    ) -> RsdResult<(DiscoveredMachine, DiscoveredPodHints)> {
        let topologies = processor_topologies(request.cores);
        if topologies.is_empty() {
            return Err(RsdError::InvalidResources(
                "a machine without cores cannot be composed".to_string(),
            ));
        }

        let storage = StorageService::new(self.client);
        let (logical_drives, targets) = storage.scrape_logical_drives_and_targets().await?;
        let in_use = storage.scrape_remote_drives().await?;
        let mut remote_storage = calculate_remote_storage(&in_use, &logical_drives);

        let mut node_path = None;
        for (processors, cores_per_processor) in topologies {
            let payload = convert_request_to_json_payload(
                processors,
                cores_per_processor,
                request,
                &mut remote_storage,
            )?;
            match self.attempt_allocation(&payload).await? {
                AllocationAttempt::Allocated(path) => {
                    node_path = Some(path);
                    break;
                }
                AllocationAttempt::Exhausted(message) => {
                    debug!(
                        processors,
                        cores_per_processor,
                        %message,
                        "allocation rejected, widening processor topology"
                    );
                }
            }
        }
        let Some(node_path) = node_path else {
            return Err(RsdError::InvalidResources(
                "no processor topology could satisfy the requested resources".to_string(),
            ));
        };

        let lifecycle = LifecycleService::new(self.client, self.config);
        lifecycle.assemble_node(&node_path).await?;
        lifecycle.set_pxe_boot(&node_path).await?;

        let discovery = DiscoveryService::new(self.client);
        let machine = discovery
            .get_pod_machine(&node_path, &logical_drives, &targets, Some(request))
            .await?;
        let pod = discovery.discover().await?;
        Ok((machine, pod.hints))
    }
}
