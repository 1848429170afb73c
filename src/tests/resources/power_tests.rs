use super::{members, mount_json, pod_client};
use crate::{PowerState, RsdError};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_power_query_reports_powered_on() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/redfish/v1/Nodes/9",
        json!({"ComposedNodeState": "PoweredOn"}),
    )
    .await;

    let client = pod_client(&server).await;
    assert_eq!(client.power_query("9").await.unwrap(), PowerState::On);
}

#[tokio::test]
async fn test_power_on_running_node_forces_a_fresh_boot() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/redfish/v1/Nodes/9",
        json!({"ComposedNodeState": "PoweredOn"}),
    )
    .await;
    Mock::given(method("PATCH"))
        .and(path("/redfish/v1/Nodes/9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/redfish/v1/Nodes/9/Actions/ComposedNode.Reset"))
        .and(body_json(json!({"ResetType": "ForceOff"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/redfish/v1/Nodes/9/Actions/ComposedNode.Reset"))
        .and(body_json(json!({"ResetType": "On"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = pod_client(&server).await;
    client.power_on("9").await.unwrap();
}

#[tokio::test]
async fn test_power_off_keeps_pxe_armed() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/redfish/v1/Nodes/9"))
        .and(body_json(json!({
            "Boot": {
                "BootSourceOverrideEnabled": "Once",
                "BootSourceOverrideTarget": "Pxe"
            }
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/redfish/v1/Nodes/9/Actions/ComposedNode.Reset"))
        .and(body_json(json!({"ResetType": "ForceOff"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = pod_client(&server).await;
    client.power_off("9").await.unwrap();
}

#[tokio::test]
async fn test_decompose_is_idempotent() {
    let server = MockServer::start().await;
    // The node is already gone.
    Mock::given(method("DELETE"))
        .and(path("/redfish/v1/Nodes/9"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_json(&server, "/redfish/v1/Services", members(&[])).await;
    mount_json(&server, "/redfish/v1/Nodes", members(&[])).await;
    mount_json(&server, "/redfish/v1/Systems", members(&[])).await;

    let client = pod_client(&server).await;
    let hints = client.decompose("9").await.unwrap();
    assert_eq!(hints.cores, 0);
    assert_eq!(hints.iscsi_storage, 0);
}

#[tokio::test]
async fn test_malformed_node_id_is_rejected_without_traffic() {
    let server = MockServer::start().await;
    let client = pod_client(&server).await;

    let result = client.decompose("../Nodes/1").await;
    assert!(matches!(result, Err(RsdError::Validation { .. })));
    assert!(server.received_requests().await.unwrap().is_empty());
}
