//! Domain models for machines already composed on the pod.
//!
//! A [`DiscoveredMachine`] is rebuilt from scratch on every discovery or
//! compose call and never mutated in place across calls; callers that need
//! change detection diff by the `node_id` entry in `power_parameters`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Normalized power state of a composed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
    Unknown,
}

/// How a block device is attached to a composed machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BlockDeviceType {
    /// A local drive behind one of the system's storage adapters.
    Physical,
    /// A logical-volume snapshot exported over iSCSI.
    Iscsi,
}

/// A block device attached to a composed machine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DiscoveredMachineBlockDevice {
    /// Drive model string, when the pod reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Drive serial number, when the pod reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    /// Capacity in bytes.
    pub size: u64,
    /// Logical block size in bytes.
    pub block_size: u64,
    /// Tags: attachment class (`local`/`iscsi`), media class (`ssd`/`hdd`),
    /// plus any caller tags correlated back from the compose request.
    pub tags: Vec<String>,
    /// Attachment type.
    #[serde(rename = "type")]
    pub device_type: BlockDeviceType,
    /// For iSCSI devices, the export address as `host:port:lun:iqn`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iscsi_target: Option<String>,
}

/// A network interface attached to a composed machine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DiscoveredMachineInterface {
    /// MAC address, when the pod reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    /// VLAN id of the neighbor switch port's primary VLAN; -1 means
    /// untagged/no VLAN discoverable.
    pub vid: i64,
    /// Speed-class tags derived from `SpeedMbps` (e.g. `1g`, `e1000`).
    pub tags: Vec<String>,
    /// True when the interface has no discoverable neighbor port or VLAN;
    /// internally-exposed NICs are conventionally the PXE-capable ones in
    /// this hardware family.
    pub boot: bool,
}

/// A machine already composed on the pod.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DiscoveredMachine {
    /// The composed node's name, used as hostname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Normalized architecture string (e.g. `amd64/generic`).
    pub architecture: String,
    /// Total hardware threads across the node's processors.
    pub cores: u32,
    /// Maximum processor speed in MHz.
    pub cpu_speed: u32,
    /// Memory in MiB.
    pub memory: u64,
    /// Current power state.
    pub power_state: PowerState,
    /// Opaque power-driver parameters; always carries `node_id`.
    pub power_parameters: HashMap<String, String>,
    /// Block devices in discovery order.
    pub block_devices: Vec<DiscoveredMachineBlockDevice>,
    /// Network interfaces in discovery order.
    pub interfaces: Vec<DiscoveredMachineInterface>,
}

impl DiscoveredMachine {
    /// Returns the provider node identifier, the machine's stable identity.
    pub fn node_id(&self) -> Option<&str> {
        self.power_parameters.get("node_id").map(String::as_str)
    }
}
