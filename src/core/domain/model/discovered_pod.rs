//! Domain models for the pod-wide capacity snapshot.

use crate::core::domain::model::discovered_machine::DiscoveredMachine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A capability tag advertised for the pod.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    /// Machines can be composed out of pooled resources.
    Composable,
    /// Local storage is fixed at composition time and cannot be resized
    /// afterwards; schedulers must respect this.
    FixedLocalStorage,
}

/// Remaining-capacity projection for a pod: what is left for future
/// composition after accounting for already-composed machines.
///
/// Every field is clamped at zero; providers may double count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DiscoveredPodHints {
    /// Free hardware threads.
    pub cores: u32,
    /// Representative processor speed in MHz.
    pub cpu_speed: u32,
    /// Free memory in MiB.
    pub memory: u64,
    /// Free local storage in bytes.
    pub local_storage: u64,
    /// Free local disk count.
    pub local_disks: u32,
    /// Free iSCSI-backed remote storage in bytes.
    pub iscsi_storage: u64,
}

/// Snapshot of a pod's total pool capacity plus its composed machines.
///
/// Totals are sums over all discovered systems and are recomputed wholesale
/// on every discovery pass; there is no incremental update.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DiscoveredPod {
    /// Architectures present across the pod's systems.
    pub architectures: BTreeSet<String>,
    /// Total hardware threads.
    pub cores: u32,
    /// Representative (maximum observed) processor speed in MHz.
    pub cpu_speed: u32,
    /// Total memory in MiB.
    pub memory: u64,
    /// Total local storage in bytes.
    pub local_storage: u64,
    /// Total local disk count.
    pub local_disks: u32,
    /// Total iSCSI-backed remote storage in bytes.
    pub iscsi_storage: u64,
    /// Capability tags.
    pub capabilities: BTreeSet<Capability>,
    /// Machines already composed on the pod.
    pub machines: Vec<DiscoveredMachine>,
    /// Remaining-capacity projection.
    pub hints: DiscoveredPodHints,
}

impl Default for DiscoveredPod {
    fn default() -> Self {
        Self {
            architectures: BTreeSet::new(),
            cores: 0,
            cpu_speed: 0,
            memory: 0,
            local_storage: 0,
            local_disks: 0,
            iscsi_storage: 0,
            capabilities: BTreeSet::from([Capability::Composable]),
            machines: Vec::new(),
            hints: DiscoveredPodHints::default(),
        }
    }
}
