//! Composed-node lifecycle: assembly, PXE boot ordering and power actions.

use crate::core::domain::error::{RsdError, RsdResult};
use crate::core::domain::model::{ClientConfig, PowerState};
use crate::core::infrastructure::RedfishClient;
use serde_json::json;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::warn;

/// Drives a composed node from allocation to a powered, PXE-bootable state.
pub(crate) struct LifecycleService<'a> {
    client: &'a RedfishClient,
    poll_interval: Duration,
    timeout: Duration,
}

impl<'a> LifecycleService<'a> {
    pub(crate) fn new(client: &'a RedfishClient, config: &ClientConfig) -> Self {
        Self {
            client,
            poll_interval: config.assemble_poll_interval,
            timeout: config.assemble_timeout,
        }
    }

    /// Reads the node's `ComposedNodeState`.
    pub(crate) async fn get_composed_node_state(&self, node_path: &str) -> RsdResult<String> {
        let node = self.client.get(node_path).await?;
        node.get("ComposedNodeState")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                RsdError::Action(format!("node {node_path} reports no composed state"))
            })
    }

    /// Assembles the node if it is not assembled yet, polling until the
    /// provider leaves the `Assembling` state or the configured timeout
    /// elapses.
    pub(crate) async fn assemble_node(&self, node_path: &str) -> RsdResult<()> {
        match self.get_composed_node_state(node_path).await?.as_str() {
            // Already assembled.
            "PoweredOn" | "PoweredOff" => return Ok(()),
            "Failed" => return self.discard_failed_node(node_path).await,
            "Allocated" => {
                let action = format!("{node_path}/Actions/ComposedNode.Assemble");
                self.client.post(&action, None).await?;
            }
            _ => {}
        }

        let deadline = Instant::now() + self.timeout;
        let final_state = loop {
            let state = self.get_composed_node_state(node_path).await?;
            if state != "Assembling" {
                break state;
            }
            if Instant::now() >= deadline {
                return Err(RsdError::Action(format!(
                    "timed out after {:?} waiting for node {node_path} to assemble",
                    self.timeout
                )));
            }
            sleep(self.poll_interval).await;
        };

        if final_state == "Failed" {
            return self.discard_failed_node(node_path).await;
        }
        Ok(())
    }

    /// Deletes a failed node so it stops pinning resources, then reports the
    /// failure. The deletion is best effort.
    async fn discard_failed_node(&self, node_path: &str) -> RsdResult<()> {
        if let Err(error) = self.client.delete(node_path).await {
            warn!(node = %node_path, %error, "could not delete failed node");
        }
        Err(RsdError::Action(format!(
            "node assembly failed: {node_path}"
        )))
    }

    /// Sets the node to PXE boot once on its next power-on.
    pub(crate) async fn set_pxe_boot(&self, node_path: &str) -> RsdResult<()> {
        let body = json!({
            "Boot": {
                "BootSourceOverrideEnabled": "Once",
                "BootSourceOverrideTarget": "Pxe"
            }
        });
        self.client.patch(node_path, &body).await?;
        Ok(())
    }

    async fn reset(&self, node_path: &str, reset_type: &str) -> RsdResult<()> {
        let action = format!("{node_path}/Actions/ComposedNode.Reset");
        self.client
            .post(&action, Some(&json!({"ResetType": reset_type})))
            .await?;
        Ok(())
    }

    /// Powers the node on into a fresh PXE boot. A node already running is
    /// forced off first so the boot override always takes effect.
    pub(crate) async fn power_on(&self, node_path: &str) -> RsdResult<()> {
        self.set_pxe_boot(node_path).await?;
        if self.power_query(node_path).await? == PowerState::On {
            self.reset(node_path, "ForceOff").await?;
        }
        self.reset(node_path, "On").await
    }

    /// Powers the node off, leaving the PXE override armed for the next boot.
    pub(crate) async fn power_off(&self, node_path: &str) -> RsdResult<()> {
        self.set_pxe_boot(node_path).await?;
        self.reset(node_path, "ForceOff").await
    }

    /// Reports the node's power state, assembling it first if needed.
    pub(crate) async fn power_query(&self, node_path: &str) -> RsdResult<PowerState> {
        self.assemble_node(node_path).await?;
        match self.get_composed_node_state(node_path).await?.as_str() {
            "PoweredOn" => Ok(PowerState::On),
            "PoweredOff" => Ok(PowerState::Off),
            other => Err(RsdError::Action(format!(
                "node {node_path} is in unexpected power state {other}"
            ))),
        }
    }
}
