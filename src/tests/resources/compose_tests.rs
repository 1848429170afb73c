use super::{members, mount_json, pod_client};
use crate::core::domain::units::BYTES_PER_GIB;
use crate::{
    BlockDeviceType, PowerState, RequestedMachine, RequestedMachineBlockDevice,
    RequestedMachineInterface, RsdError,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> RequestedMachine {
    RequestedMachine {
        hostname: "database-node".to_string(),
        architecture: "amd64/generic".to_string(),
        cores: 4,
        cpu_speed: 2300,
        memory: 4096,
        block_devices: vec![
            RequestedMachineBlockDevice {
                size: 40 * BYTES_PER_GIB,
                tags: vec!["local".to_string(), "ssd".to_string()],
                iscsi_target: None,
            },
            RequestedMachineBlockDevice {
                size: 20 * BYTES_PER_GIB,
                tags: vec!["database".to_string()],
                iscsi_target: None,
            },
        ],
        interfaces: vec![RequestedMachineInterface::default()],
    }
}

/// Storage layout: one 100 GiB volume group with one unused 20 GiB volume.
async fn mount_storage(server: &MockServer) {
    mount_json(server, "/redfish/v1/Services", members(&["/redfish/v1/Services/1"])).await;
    mount_json(
        server,
        "/redfish/v1/Services/1/LogicalDrives",
        members(&[
            "/redfish/v1/Services/1/LogicalDrives/1",
            "/redfish/v1/Services/1/LogicalDrives/2",
        ]),
    )
    .await;
    mount_json(
        server,
        "/redfish/v1/Services/1/LogicalDrives/1",
        json!({
            "Mode": "LVG",
            "CapacityGiB": 100,
            "Links": {
                "LogicalDrives": [
                    {"@odata.id": "/redfish/v1/Services/1/LogicalDrives/2"}
                ]
            }
        }),
    )
    .await;
    mount_json(
        server,
        "/redfish/v1/Services/1/LogicalDrives/2",
        json!({
            "Mode": "LV",
            "CapacityGiB": 20,
            "Links": {
                "Targets": [{"@odata.id": "/redfish/v1/Services/1/Targets/1"}]
            }
        }),
    )
    .await;
    mount_json(
        server,
        "/redfish/v1/Services/1/Targets",
        members(&["/redfish/v1/Services/1/Targets/1"]),
    )
    .await;
    mount_json(
        server,
        "/redfish/v1/Services/1/Targets/1",
        json!({
            "Addresses": [{
                "iSCSI": {
                    "TargetPortalIP": "10.0.0.100",
                    "TargetPortalPort": 3260,
                    "TargetLUN": [{"LUN": 0}],
                    "TargetIQN": "iqn.2010-08.io.maas:database-node"
                }
            }]
        }),
    )
    .await;
}

#[tokio::test]
async fn test_compose_end_to_end() {
    let server = MockServer::start().await;
    mount_storage(&server).await;
    mount_json(&server, "/redfish/v1/Nodes", members(&[])).await;
    mount_json(&server, "/redfish/v1/Systems", members(&[])).await;

    // The allocation must carry the requested name and a snapshot master for
    // the remote drive.
    Mock::given(method("POST"))
        .and(path("/redfish/v1/Nodes"))
        .and(body_partial_json(json!({
            "Name": "database-node",
            "RemoteDrives": [{
                "iSCSIAddress": "iqn.2010-08.io.maas:database-node-1",
                "Master": {
                    "Type": "Snapshot",
                    "Resource": {
                        "@odata.id": "/redfish/v1/Services/1/LogicalDrives/2"
                    }
                }
            }]
        })))
        .respond_with(
            ResponseTemplate::new(201).insert_header("Location", "/redfish/v1/Nodes/9"),
        )
        .expect(1)
        .mount(&server)
        .await;

    mount_json(
        &server,
        "/redfish/v1/Nodes/9",
        json!({
            "Name": "database-node",
            "ComposedNodeState": "PoweredOff",
            "PowerState": "Off",
            "Links": {
                "Memory": [{"@odata.id": "/redfish/v1/Systems/1/Memory/1"}],
                "Processors": [{"@odata.id": "/redfish/v1/Systems/1/Processors/1"}],
                "LocalDrives": [
                    {"@odata.id": "/redfish/v1/Systems/1/Adapters/1/Devices/1"}
                ],
                "RemoteDrives": [
                    {"@odata.id": "/redfish/v1/Services/1/Targets/1"}
                ],
                "EthernetInterfaces": []
            }
        }),
    )
    .await;
    mount_json(
        &server,
        "/redfish/v1/Systems/1/Memory/1",
        json!({"CapacityMiB": 4096}),
    )
    .await;
    mount_json(
        &server,
        "/redfish/v1/Systems/1/Processors/1",
        json!({
            "TotalThreads": 4,
            "MaxSpeedMHz": 2300,
            "ProcessorArchitecture": "x86_64"
        }),
    )
    .await;
    mount_json(
        &server,
        "/redfish/v1/Systems/1/Adapters/1/Devices/1",
        json!({
            "Model": "INTEL SSD",
            "SerialNumber": "CVLI3.14",
            "CapacityGiB": 40,
            "Type": "SSD"
        }),
    )
    .await;
    Mock::given(method("PATCH"))
        .and(path("/redfish/v1/Nodes/9"))
        .and(body_partial_json(json!({
            "Boot": {"BootSourceOverrideTarget": "Pxe"}
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = pod_client(&server).await;
    let (machine, hints) = client.compose(&request()).await.unwrap();

    assert_eq!(machine.hostname.as_deref(), Some("database-node"));
    assert_eq!(machine.cores, 4);
    assert_eq!(machine.memory, 4096);
    assert_eq!(machine.power_state, PowerState::Off);
    assert_eq!(machine.power_parameters["node_id"], "9");

    // Requested tags came back on the matching discovered devices.
    assert_eq!(machine.block_devices.len(), 2);
    let local = &machine.block_devices[0];
    assert_eq!(local.device_type, BlockDeviceType::Physical);
    assert_eq!(local.tags, vec!["local", "ssd"]);
    let remote = &machine.block_devices[1];
    assert_eq!(remote.device_type, BlockDeviceType::Iscsi);
    assert_eq!(remote.tags, vec!["iscsi", "database"]);
    assert_eq!(
        remote.iscsi_target.as_deref(),
        Some("10.0.0.100:3260:0:iqn.2010-08.io.maas:database-node")
    );

    // The nodes collection is still served empty, so the refreshed hints see
    // the full remote capacity minus the reserved master volume.
    assert_eq!(hints.iscsi_storage, 80 * BYTES_PER_GIB);
}

#[tokio::test]
async fn test_compose_surfaces_exhaustion_as_invalid_resources() {
    let server = MockServer::start().await;
    mount_storage(&server).await;
    mount_json(&server, "/redfish/v1/Nodes", members(&[])).await;

    Mock::given(method("POST"))
        .and(path("/redfish/v1/Nodes"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {
                "message": "conflict",
                "@Message.ExtendedInfo": [
                    {"Message": "There are no computer systems available for this allocation request."}
                ]
            }
        })))
        // cores = 4 gives three topology candidates.
        .expect(3)
        .mount(&server)
        .await;

    let client = pod_client(&server).await;
    let result = client.compose(&request()).await;
    assert!(matches!(result, Err(RsdError::InvalidResources(_))));
}
