//! Pod inventory discovery: systems, composed nodes and their devices.

use super::storage_service::{
    StorageService, calculate_pod_remote_storage, calculate_remote_storage,
};
use super::{REDFISH_NODES, REDFISH_SYSTEMS, list_resources, resource_path};
use crate::core::domain::error::RsdResult;
use crate::core::domain::model::{
    BlockDeviceType, Capability, DiscoveredMachine, DiscoveredMachineBlockDevice,
    DiscoveredMachineInterface, DiscoveredPod, DiscoveredPodHints, PowerState,
    RequestedMachine, RequestedMachineBlockDevice, RequestedMachineInterface,
};
use crate::core::domain::units::gib_to_bytes;
use crate::core::infrastructure::RedfishClient;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

const LOCAL_BLOCK_SIZE: u64 = 512;

/// Maps provider architecture strings onto the canonical form consumers
/// expect.
fn normalize_architecture(raw: &str) -> String {
    match raw {
        "x86" | "x86_64" => "amd64/generic".to_string(),
        other => other.to_string(),
    }
}

/// Maps a provider power state string. Transitional states count as on; an
/// unrecognized string is reported rather than guessed.
fn system_power_state(raw: &str) -> PowerState {
    match raw {
        "On" | "PoweringOn" | "PoweringOff" => PowerState::On,
        "Off" => PowerState::Off,
        _ => PowerState::Unknown,
    }
}

/// Speed-class tags for an interface reporting `speed_mbps`.
fn interface_speed_tags(speed_mbps: u64) -> Vec<String> {
    if speed_mbps < 1000 {
        vec![format!("e{speed_mbps}")]
    } else if speed_mbps < 2000 {
        vec!["1g".to_string(), "e1000".to_string()]
    } else {
        vec![format!("{}g", speed_mbps / 1000)]
    }
}

/// Builds the `ip:port:lun:iqn` connection string of an iSCSI target.
fn iscsi_target_string(target: &Value) -> Option<String> {
    let iscsi = target.pointer("/Addresses/0/iSCSI")?;
    let ip = iscsi.get("TargetPortalIP").and_then(Value::as_str)?;
    let port = iscsi.get("TargetPortalPort").and_then(Value::as_u64)?;
    let lun = iscsi.pointer("/TargetLUN/0/LUN").and_then(Value::as_u64)?;
    let iqn = iscsi.get("TargetIQN").and_then(Value::as_str)?;
    Some(format!("{ip}:{port}:{lun}:{iqn}"))
}

fn linked_paths(document: &Value, pointer: &str) -> Vec<String> {
    document
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(|links| links.iter().filter_map(resource_path).collect())
        .unwrap_or_default()
}

/// Carries requested tags onto the matching discovered block devices.
///
/// Devices are matched by exact size, first unconsumed device wins; the
/// provider does not echo tags back, so identity can never be used.
fn merge_requested_tags(
    devices: &mut [DiscoveredMachineBlockDevice],
    requested: &[RequestedMachineBlockDevice],
) {
    let mut consumed = vec![false; devices.len()];
    for request in requested {
        for (idx, device) in devices.iter_mut().enumerate() {
            if consumed[idx] || device.size != request.size {
                continue;
            }
            consumed[idx] = true;
            for tag in &request.tags {
                if !device.tags.contains(tag) {
                    device.tags.push(tag.clone());
                }
            }
            break;
        }
    }
}

/// Carries requested interface tags onto the discovered interfaces.
///
/// Interfaces carry nothing to match on (the provider assigns MACs during
/// composition), so the request order is trusted: the n-th discovered
/// interface inherits the n-th requested entry's tags.
fn merge_requested_interface_tags(
    interfaces: &mut [DiscoveredMachineInterface],
    requested: &[RequestedMachineInterface],
) {
    for (interface, request) in interfaces.iter_mut().zip(requested) {
        for tag in &request.tags {
            if !interface.tags.contains(tag) {
                interface.tags.push(tag.clone());
            }
        }
    }
}

/// Subtracts the machines' consumption from the pod totals, clamping at zero.
pub(crate) fn get_pod_hints(
    pod: &DiscoveredPod,
    machines: &[DiscoveredMachine],
    iscsi_available: u64,
) -> DiscoveredPodHints {
    let mut cores = pod.cores;
    let mut memory = pod.memory;
    let mut local_storage = pod.local_storage;
    let mut local_disks = pod.local_disks;
    for machine in machines {
        cores = cores.saturating_sub(machine.cores);
        memory = memory.saturating_sub(machine.memory);
        for device in &machine.block_devices {
            local_storage = local_storage.saturating_sub(device.size);
            local_disks = local_disks.saturating_sub(1);
        }
    }
    DiscoveredPodHints {
        cores,
        cpu_speed: pod.cpu_speed,
        memory,
        local_storage,
        local_disks,
        iscsi_storage: iscsi_available,
    }
}

struct SystemScan {
    architecture: String,
    cores: u32,
    cpu_speed: u32,
    memory: u64,
    local_storage: u64,
    local_disks: u32,
}

/// Walks the pod's resource graph and assembles the discovery result.
pub(crate) struct DiscoveryService<'a> {
    client: &'a RedfishClient,
}

impl<'a> DiscoveryService<'a> {
    pub(crate) fn new(client: &'a RedfishClient) -> Self {
        Self { client }
    }

    /// Full discovery pass: remote storage, pod totals, composed machines
    /// and the remaining-capacity hints, all recomputed from scratch.
    pub(crate) async fn discover(&self) -> RsdResult<DiscoveredPod> {
        let storage = StorageService::new(self.client);
        let (logical_drives, targets) = storage.scrape_logical_drives_and_targets().await?;
        let in_use = storage.scrape_remote_drives().await?;
        let remote = calculate_remote_storage(&in_use, &logical_drives);
        let (iscsi_total, iscsi_available) = calculate_pod_remote_storage(&remote);

        let mut pod = self.get_pod_resources().await?;
        pod.iscsi_storage = iscsi_total;
        pod.machines = self
            .get_pod_machines(&logical_drives, &targets)
            .await?;
        let hints = get_pod_hints(&pod, &pod.machines, iscsi_available);
        pod.hints = hints;
        Ok(pod)
    }

    /// Sums every usable system into the pod totals.
    pub(crate) async fn get_pod_resources(&self) -> RsdResult<DiscoveredPod> {
        let mut pod = DiscoveredPod::default();
        for system_path in list_resources(self.client, REDFISH_SYSTEMS).await? {
            match self.scan_system(&system_path).await? {
                Some(scan) => {
                    pod.architectures.insert(scan.architecture);
                    pod.cores += scan.cores;
                    pod.cpu_speed = pod.cpu_speed.max(scan.cpu_speed);
                    pod.memory += scan.memory;
                    pod.local_storage += scan.local_storage;
                    pod.local_disks += scan.local_disks;
                }
                None => {
                    warn!(system = %system_path, "skipping system with incomplete inventory");
                }
            }
        }
        if pod.local_disks > 0 {
            pod.capabilities.insert(Capability::FixedLocalStorage);
        }
        Ok(pod)
    }

    /// Walks one system's inventory. Returns `None` when the system reports
    /// no memory or leaves required fields out, which marks it unusable for
    /// composition.
    async fn scan_system(&self, system_path: &str) -> RsdResult<Option<SystemScan>> {
        let memory_paths =
            list_resources(self.client, &format!("{system_path}/Memory")).await?;
        if memory_paths.is_empty() {
            return Ok(None);
        }
        let mut memory = 0u64;
        for path in memory_paths {
            let member = self.client.get(&path).await?;
            match member.get("CapacityMiB").and_then(Value::as_u64) {
                Some(capacity) => memory += capacity,
                None => return Ok(None),
            }
        }

        let mut cores = 0u32;
        let mut cpu_speed = 0u32;
        let mut architecture: Option<String> = None;
        for path in
            list_resources(self.client, &format!("{system_path}/Processors")).await?
        {
            let processor = self.client.get(&path).await?;
            let threads = processor.get("TotalThreads").and_then(Value::as_u64);
            let speed = processor.get("MaxSpeedMHz").and_then(Value::as_u64);
            let arch = processor
                .get("ProcessorArchitecture")
                .and_then(Value::as_str);
            let (Some(threads), Some(speed), Some(arch)) = (threads, speed, arch) else {
                return Ok(None);
            };
            cores += threads as u32;
            cpu_speed = cpu_speed.max(speed as u32);
            if architecture.is_none() {
                architecture = Some(normalize_architecture(arch));
            }
        }
        let Some(architecture) = architecture else {
            return Ok(None);
        };

        let mut local_storage = 0u64;
        let mut local_disks = 0u32;
        for adapter_path in
            list_resources(self.client, &format!("{system_path}/Adapters")).await?
        {
            for device_path in
                list_resources(self.client, &format!("{adapter_path}/Devices")).await?
            {
                let device = self.client.get(&device_path).await?;
                let Some(capacity) = device.get("CapacityGiB").and_then(Value::as_f64)
                else {
                    return Ok(None);
                };
                local_storage += gib_to_bytes(capacity);
                local_disks += 1;
            }
        }

        Ok(Some(SystemScan {
            architecture,
            cores,
            cpu_speed,
            memory,
            local_storage,
            local_disks,
        }))
    }

    /// Resolves one composed node into a `DiscoveredMachine`.
    ///
    /// `logical_drives` and `targets` are the pre-scraped storage maps;
    /// `request` is given right after composition so the requested tags can
    /// be carried onto the discovered devices.
    pub(crate) async fn get_pod_machine(
        &self,
        node_path: &str,
        logical_drives: &HashMap<String, Value>,
        targets: &HashMap<String, Value>,
        request: Option<&RequestedMachine>,
    ) -> RsdResult<DiscoveredMachine> {
        let node = self.client.get(node_path).await?;
        let node_id = node_path
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let hostname = node
            .get("Name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let power_state = system_power_state(
            node.get("PowerState").and_then(Value::as_str).unwrap_or(""),
        );

        let mut memory = 0u64;
        for path in linked_paths(&node, "/Links/Memory") {
            let member = self.client.get(&path).await?;
            memory += member
                .get("CapacityMiB")
                .and_then(Value::as_u64)
                .unwrap_or(0);
        }

        let mut cores = 0u32;
        let mut cpu_speed = 0u32;
        let mut architecture = String::new();
        for path in linked_paths(&node, "/Links/Processors") {
            let processor = self.client.get(&path).await?;
            cores += processor
                .get("TotalThreads")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32;
            cpu_speed = cpu_speed.max(
                processor
                    .get("MaxSpeedMHz")
                    .and_then(Value::as_u64)
                    .unwrap_or(0) as u32,
            );
            if architecture.is_empty() {
                if let Some(arch) = processor
                    .get("ProcessorArchitecture")
                    .and_then(Value::as_str)
                {
                    architecture = normalize_architecture(arch);
                }
            }
        }
        // Nodes without resolvable processors still need a usable arch string.
        if architecture.is_empty() {
            architecture = "amd64/generic".to_string();
        }

        let mut block_devices = Vec::new();
        for path in linked_paths(&node, "/Links/LocalDrives") {
            let drive = self.client.get(&path).await?;
            let mut tags = vec!["local".to_string()];
            if let Some(drive_type) = drive.get("Type").and_then(Value::as_str) {
                tags.push(drive_type.to_lowercase());
            }
            block_devices.push(DiscoveredMachineBlockDevice {
                model: drive
                    .get("Model")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                serial: drive
                    .get("SerialNumber")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                size: gib_to_bytes(
                    drive.get("CapacityGiB").and_then(Value::as_f64).unwrap_or(0.0),
                ),
                block_size: LOCAL_BLOCK_SIZE,
                tags,
                device_type: BlockDeviceType::Physical,
                iscsi_target: None,
            });
        }
        for target_path in linked_paths(&node, "/Links/RemoteDrives") {
            let size = logical_drives
                .values()
                .find(|drive| {
                    linked_paths(drive, "/Links/Targets")
                        .iter()
                        .any(|t| t == &target_path)
                })
                .and_then(|drive| drive.get("CapacityGiB").and_then(Value::as_f64))
                .map(gib_to_bytes)
                .unwrap_or(0);
            let iscsi_target = targets.get(&target_path).and_then(iscsi_target_string);
            block_devices.push(DiscoveredMachineBlockDevice {
                model: None,
                serial: None,
                size,
                block_size: LOCAL_BLOCK_SIZE,
                tags: vec!["iscsi".to_string()],
                device_type: BlockDeviceType::Iscsi,
                iscsi_target,
            });
        }
        if let Some(request) = request {
            merge_requested_tags(&mut block_devices, &request.block_devices);
        }

        let mut interfaces = Vec::new();
        for path in linked_paths(&node, "/Links/EthernetInterfaces") {
            let interface = self.client.get(&path).await?;
            let tags = interface
                .get("SpeedMbps")
                .and_then(Value::as_u64)
                .map(interface_speed_tags)
                .unwrap_or_default();
            let (vid, boot) = self.resolve_interface_vlan(&interface).await?;
            interfaces.push(DiscoveredMachineInterface {
                mac_address: interface
                    .get("MACAddress")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                vid,
                tags,
                boot,
            });
        }
        if let Some(request) = request {
            merge_requested_interface_tags(&mut interfaces, &request.interfaces);
        }

        let mut power_parameters = HashMap::new();
        power_parameters.insert("node_id".to_string(), node_id);

        Ok(DiscoveredMachine {
            hostname,
            architecture,
            cores,
            cpu_speed,
            memory,
            power_state,
            power_parameters,
            block_devices,
            interfaces,
        })
    }

    /// Follows the interface's switch-port link to its untagged VLAN.
    /// A break anywhere in the chain leaves the VLAN unknown and flags the
    /// interface bootable, so provisioning still has a path to it.
    async fn resolve_interface_vlan(&self, interface: &Value) -> RsdResult<(i64, bool)> {
        let port_path = interface
            .pointer("/Links/Oem/Intel_RackScale/NeighborPort/@odata.id")
            .and_then(Value::as_str)
            .map(|p| p.trim_start_matches('/').to_string());
        let Some(port_path) = port_path else {
            return Ok((-1, true));
        };
        let port = self.client.get(&port_path).await?;
        let vlan_path = port
            .pointer("/Links/PrimaryVLAN/@odata.id")
            .and_then(Value::as_str)
            .map(|p| p.trim_start_matches('/').to_string());
        let Some(vlan_path) = vlan_path else {
            return Ok((-1, true));
        };
        let vlan = self.client.get(&vlan_path).await?;
        match vlan.get("VLANId").and_then(Value::as_i64) {
            Some(vid) => Ok((vid, false)),
            None => Ok((-1, true)),
        }
    }

    /// Resolves every composed node in the pod.
    pub(crate) async fn get_pod_machines(
        &self,
        logical_drives: &HashMap<String, Value>,
        targets: &HashMap<String, Value>,
    ) -> RsdResult<Vec<DiscoveredMachine>> {
        let mut machines = Vec::new();
        for node_path in list_resources(self.client, REDFISH_NODES).await? {
            machines.push(
                self.get_pod_machine(&node_path, logical_drives, targets, None)
                    .await?,
            );
        }
        Ok(machines)
    }
}
