mod client_config;
mod discovered_machine;
mod discovered_pod;
mod pod_connection;
mod requested_machine;

pub use client_config::{ClientConfig, RateLimitConfig};
pub use discovered_machine::{
    BlockDeviceType, DiscoveredMachine, DiscoveredMachineBlockDevice,
    DiscoveredMachineInterface, PowerState,
};
pub use discovered_pod::{Capability, DiscoveredPod, DiscoveredPodHints};
pub use pod_connection::PodConnection;
pub use requested_machine::{
    RequestedMachine, RequestedMachineBlockDevice, RequestedMachineInterface,
};
