//! Async client for composable-hardware pods speaking the Rack Scale Design
//! flavor of the redfish REST API.
//!
//! A pod pools disaggregated processors, memory, drives and network
//! interfaces; this crate discovers that inventory, composes machines out of
//! it, controls their power and decomposes them again. All operations are
//! stateless: every call re-reads the pod, so several clients can point at
//! the same pod without coordination.
//!
//! # Example
//!
//! ```no_run
//! use rsd_pod::{RsdClientBuilder, RsdResult};
//!
//! #[tokio::main]
//! async fn main() -> RsdResult<()> {
//!     let client = RsdClientBuilder::new()
//!         .host("10.0.0.25")
//!         .username("admin")
//!         .password("admin")
//!         .build()
//!         .await?;
//!
//!     let pod = client.discover().await?;
//!     println!(
//!         "pod has {} cores and {} MiB of memory free",
//!         pod.hints.cores, pod.hints.memory
//!     );
//!     Ok(())
//! }
//! ```

mod core;
mod pod;

#[cfg(test)]
mod tests;

pub use crate::core::domain::error::{RsdError, RsdResult, ValidationError};
pub use crate::core::domain::model::{
    BlockDeviceType, Capability, ClientConfig, DiscoveredMachine,
    DiscoveredMachineBlockDevice, DiscoveredMachineInterface, DiscoveredPod,
    DiscoveredPodHints, PowerState, RateLimitConfig, RequestedMachine,
    RequestedMachineBlockDevice, RequestedMachineInterface,
};
pub use crate::core::domain::value_object::{DEFAULT_POD_PORT, NodeId};

use crate::core::domain::model::PodConnection;
use crate::core::domain::value_object::{PodHost, PodPassword, PodPort, PodUrl, PodUsername};
use crate::core::infrastructure::RedfishClient;
use crate::pod::application::service::{
    CompositionService, DiscoveryService, LifecycleService,
};
use std::time::Duration;

/// Builder for [`RsdClient`].
///
/// Host, username and password are required; everything else has defaults
/// (HTTPS on port 8443, certificate verification on, no rate limiting).
#[derive(Debug, Clone)]
pub struct RsdClientBuilder {
    host: Option<String>,
    port: u16,
    username: Option<String>,
    password: Option<String>,
    secure: bool,
    accept_invalid_certs: bool,
    config: ClientConfig,
}

impl Default for RsdClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RsdClientBuilder {
    pub fn new() -> Self {
        Self {
            host: None,
            port: DEFAULT_POD_PORT,
            username: None,
            password: None,
            secure: true,
            accept_invalid_certs: false,
            config: ClientConfig::default(),
        }
    }

    /// Hostname or IP address of the pod management endpoint.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Toggles HTTPS. Lab pods and PSME emulators often run plain HTTP.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Accepts self-signed certificates on the management endpoint.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Enables client-side rate limiting of pod API requests.
    pub fn rate_limit(mut self, requests_per_second: u32, burst_size: u32) -> Self {
        self.config.rate_limit = Some(RateLimitConfig {
            requests_per_second,
            burst_size,
        });
        self
    }

    /// Delay between node state polls while waiting for assembly.
    pub fn assemble_poll_interval(mut self, interval: Duration) -> Self {
        self.config.assemble_poll_interval = interval;
        self
    }

    /// Upper bound on a single assembly wait.
    pub fn assemble_timeout(mut self, timeout: Duration) -> Self {
        self.config.assemble_timeout = timeout;
        self
    }

    /// Validates the connection parameters and builds the client.
    ///
    /// # Errors
    /// Returns [`RsdError::Validation`] when a required field is missing or
    /// malformed, and [`RsdError::Connection`] when the HTTP client cannot
    /// be constructed.
    pub async fn build(self) -> RsdResult<RsdClient> {
        let host = PodHost::new(self.host.ok_or_else(|| missing("host"))?).await?;
        let port = PodPort::new(self.port)?;
        let username = PodUsername::new(self.username.ok_or_else(|| missing("username"))?).await?;
        let password = PodPassword::new(self.password.ok_or_else(|| missing("password"))?).await?;
        let url = PodUrl::new(&host, &port, self.secure).await?;

        let connection =
            PodConnection::new(username, password, self.accept_invalid_certs, url);
        let client = RedfishClient::new(connection, &self.config)?;
        Ok(RsdClient {
            client,
            config: self.config,
        })
    }
}

fn missing(field: &str) -> RsdError {
    ValidationError::Field {
        field: field.to_string(),
        message: format!("{field} is required"),
    }
    .into()
}

/// Client for one composable-hardware pod.
#[derive(Debug)]
pub struct RsdClient {
    client: RedfishClient,
    config: ClientConfig,
}

impl RsdClient {
    pub fn builder() -> RsdClientBuilder {
        RsdClientBuilder::new()
    }

    /// Discovers the pod: total resources, composed machines and the
    /// remaining-capacity hints, all recomputed from the live resource graph.
    pub async fn discover(&self) -> RsdResult<DiscoveredPod> {
        DiscoveryService::new(&self.client).discover().await
    }

    /// Composes a machine matching `request` and returns it together with
    /// the pod's post-composition capacity hints.
    pub async fn compose(
        &self,
        request: &RequestedMachine,
    ) -> RsdResult<(DiscoveredMachine, DiscoveredPodHints)> {
        CompositionService::new(&self.client, &self.config)
            .compose(request)
            .await
    }

    /// Deletes a composed node, returning its resources to the pod.
    /// Deleting a node that is already gone succeeds.
    pub async fn decompose(&self, node_id: &str) -> RsdResult<DiscoveredPodHints> {
        let node_id = NodeId::new(node_id)?;
        self.client.delete(&node_path(&node_id)).await?;
        let pod = DiscoveryService::new(&self.client).discover().await?;
        Ok(pod.hints)
    }

    /// Powers the node on into a fresh PXE boot, assembling it first if it
    /// is still only allocated.
    pub async fn power_on(&self, node_id: &str) -> RsdResult<()> {
        let node_id = NodeId::new(node_id)?;
        self.lifecycle().power_on(&node_path(&node_id)).await
    }

    /// Powers the node off, leaving PXE armed for the next boot.
    pub async fn power_off(&self, node_id: &str) -> RsdResult<()> {
        let node_id = NodeId::new(node_id)?;
        self.lifecycle().power_off(&node_path(&node_id)).await
    }

    /// Reports the node's power state.
    pub async fn power_query(&self, node_id: &str) -> RsdResult<PowerState> {
        let node_id = NodeId::new(node_id)?;
        self.lifecycle().power_query(&node_path(&node_id)).await
    }

    fn lifecycle(&self) -> LifecycleService<'_> {
        LifecycleService::new(&self.client, &self.config)
    }
}

fn node_path(node_id: &NodeId) -> String {
    format!("redfish/v1/Nodes/{node_id}")
}
