//! Remote (iSCSI) storage scraping and capacity accounting.

use super::{REDFISH_NODES, REDFISH_SERVICES, list_resources, resource_path};
use crate::core::domain::error::RsdResult;
use crate::core::domain::units::gib_to_bytes;
use crate::core::infrastructure::RedfishClient;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Provider mode of a logical drive. The provider only ever reports these
/// three; anything else is ignored during accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriveMode {
    LogicalVolumeGroup,
    LogicalVolume,
    PhysicalVolume,
}

impl DriveMode {
    fn from_provider(raw: &str) -> Option<Self> {
        match raw {
            "LVG" => Some(Self::LogicalVolumeGroup),
            "LV" => Some(Self::LogicalVolume),
            "PV" => Some(Self::PhysicalVolume),
            _ => None,
        }
    }
}

/// A logical volume eligible to serve as the clone source for new remote
/// drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MasterDrive {
    pub(crate) path: String,
    pub(crate) size: u64,
}

/// Capacity bookkeeping for one logical volume group, in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RemoteStorage {
    pub(crate) total: u64,
    pub(crate) available: u64,
    pub(crate) master: Option<MasterDrive>,
}

/// Scrapes the pod's storage services and nodes.
pub(crate) struct StorageService<'a> {
    client: &'a RedfishClient,
}

impl<'a> StorageService<'a> {
    pub(crate) fn new(client: &'a RedfishClient) -> Self {
        Self { client }
    }

    /// Enumerates every storage service's logical drives and iSCSI targets
    /// into two maps keyed by resource path.
    pub(crate) async fn scrape_logical_drives_and_targets(
        &self,
    ) -> RsdResult<(HashMap<String, Value>, HashMap<String, Value>)> {
        let mut logical_drives = HashMap::new();
        let mut targets = HashMap::new();
        for service_path in list_resources(self.client, REDFISH_SERVICES).await? {
            let drives_path = format!("{service_path}/LogicalDrives");
            for drive_path in list_resources(self.client, &drives_path).await? {
                let drive = self.client.get(&drive_path).await?;
                logical_drives.insert(drive_path, drive);
            }
            let targets_path = format!("{service_path}/Targets");
            for target_path in list_resources(self.client, &targets_path).await? {
                let target = self.client.get(&target_path).await?;
                targets.insert(target_path, target);
            }
        }
        Ok((logical_drives, targets))
    }

    /// Collects the target paths already claimed by composed nodes.
    pub(crate) async fn scrape_remote_drives(&self) -> RsdResult<HashSet<String>> {
        let mut in_use = HashSet::new();
        for node_path in list_resources(self.client, REDFISH_NODES).await? {
            let node = self.client.get(&node_path).await?;
            if let Some(remote) = node
                .pointer("/Links/RemoteDrives")
                .and_then(Value::as_array)
            {
                in_use.extend(remote.iter().filter_map(resource_path));
            }
        }
        Ok(in_use)
    }
}

fn drive_mode(drive: &Value) -> Option<DriveMode> {
    drive
        .get("Mode")
        .and_then(Value::as_str)
        .and_then(DriveMode::from_provider)
}

fn drive_capacity(drive: &Value) -> u64 {
    gib_to_bytes(drive.get("CapacityGiB").and_then(Value::as_f64).unwrap_or(0.0))
}

/// Computes per-LVG capacity from the scraped logical drives.
///
/// For each volume group: `total` is its raw capacity; every logical volume
/// child none of whose targets is in use reduces `available` and competes to
/// be the master (smallest wins). Children with claimed targets keep the
/// group's `total` intact. Groups without a single unused logical volume
/// cannot source new drives and are dropped.
pub(crate) fn calculate_remote_storage(
    in_use: &HashSet<String>,
    logical_drives: &HashMap<String, Value>,
) -> BTreeMap<String, RemoteStorage> {
    let mut remote = BTreeMap::new();
    for (path, drive) in logical_drives {
        match drive_mode(drive) {
            Some(DriveMode::LogicalVolumeGroup) => {}
            Some(DriveMode::LogicalVolume) | Some(DriveMode::PhysicalVolume) | None => continue,
        }
        let total = drive_capacity(drive);
        let mut available = total;
        let mut master: Option<MasterDrive> = None;

        let children = drive
            .pointer("/Links/LogicalDrives")
            .and_then(Value::as_array)
            .map(|links| links.iter().filter_map(resource_path).collect())
            .unwrap_or_else(Vec::new);
        for child_path in children {
            let Some(child) = logical_drives.get(&child_path) else {
                continue;
            };
            if drive_mode(child) != Some(DriveMode::LogicalVolume) {
                continue;
            }
            let claimed = child
                .pointer("/Links/Targets")
                .and_then(Value::as_array)
                .map(|targets| {
                    targets
                        .iter()
                        .filter_map(resource_path)
                        .any(|t| in_use.contains(&t))
                })
                .unwrap_or(false);
            if claimed {
                continue;
            }
            let size = drive_capacity(child);
            available = available.saturating_sub(size);
            match &master {
                Some(current) if current.size <= size => {}
                _ => {
                    master = Some(MasterDrive {
                        path: child_path,
                        size,
                    });
                }
            }
        }

        if master.is_none() {
            continue;
        }
        remote.insert(
            path.clone(),
            RemoteStorage {
                total,
                available,
                master,
            },
        );
    }
    remote
}

/// Sums the per-LVG totals into pod-level figures: `(total, available)`.
pub(crate) fn calculate_pod_remote_storage(
    remote: &BTreeMap<String, RemoteStorage>,
) -> (u64, u64) {
    remote
        .values()
        .fold((0, 0), |(total, available), storage| {
            (total + storage.total, available + storage.available)
        })
}

/// Picks the first volume group able to hold `size` bytes, decrementing its
/// available capacity so repeated selections within one composition attempt
/// stay consistent.
pub(crate) fn select_remote_master(
    remote: &mut BTreeMap<String, RemoteStorage>,
    size: u64,
) -> Option<MasterDrive> {
    for storage in remote.values_mut() {
        if storage.available < size {
            continue;
        }
        if let Some(master) = storage.master.clone() {
            storage.available -= size;
            return Some(master);
        }
    }
    None
}
