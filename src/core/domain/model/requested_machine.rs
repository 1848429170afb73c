//! Domain models for machine composition requests.
//!
//! A [`RequestedMachine`] is the caller's desired allocation. It is immutable
//! once handed to the composition engine; discovered devices are correlated
//! back to these entries by size and ordinal position, never by identity.

use serde::{Deserialize, Serialize};

/// A requested block device.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RequestedMachineBlockDevice {
    /// Requested capacity in bytes.
    pub size: u64,
    /// Caller tags. A `local` tag requests a physical drive; anything else
    /// is provisioned as an iSCSI-backed remote drive.
    pub tags: Vec<String>,
    /// iSCSI target address, carried when a discovered machine's devices are
    /// round-tripped back into a request. Not interpreted during allocation;
    /// remote drives are always cloned from a master snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iscsi_target: Option<String>,
}

impl RequestedMachineBlockDevice {
    /// True when the device should be allocated from local storage.
    pub fn is_local(&self) -> bool {
        self.tags.iter().any(|tag| tag == "local")
    }
}

/// Attachment hints for a requested network interface.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RequestedMachineInterface {
    /// Caller tags (not interpreted by the pod).
    #[serde(default)]
    pub tags: Vec<String>,
    /// Requested VLAN id; `None` means "don't care".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan: Option<i64>,
}

/// The caller's desired machine allocation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RequestedMachine {
    /// Hostname for the composed node, also used to derive initiator IQNs.
    pub hostname: String,
    /// Normalized architecture string (e.g. `amd64/generic`).
    pub architecture: String,
    /// Total requested hardware threads, split across processor sockets by
    /// the composition engine.
    pub cores: u32,
    /// Requested processor speed in MHz; 0 means "don't care".
    pub cpu_speed: u32,
    /// Requested memory in MiB.
    pub memory: u64,
    /// Requested block devices, in order.
    pub block_devices: Vec<RequestedMachineBlockDevice>,
    /// Requested interfaces, in order.
    pub interfaces: Vec<RequestedMachineInterface>,
}
