use super::{members, mount_json, pod_client};
use crate::core::domain::units::BYTES_PER_GIB;
use crate::Capability;
use serde_json::json;
use wiremock::MockServer;

/// One usable system, one storage service with a volume group holding a
/// single unused 20 GiB volume, no composed nodes.
async fn mount_empty_pod(server: &MockServer) {
    mount_json(server, "/redfish/v1/Systems", members(&["/redfish/v1/Systems/1"])).await;
    mount_json(
        server,
        "/redfish/v1/Systems/1/Memory",
        members(&[
            "/redfish/v1/Systems/1/Memory/1",
            "/redfish/v1/Systems/1/Memory/2",
        ]),
    )
    .await;
    for idx in 1..=2 {
        mount_json(
            server,
            &format!("/redfish/v1/Systems/1/Memory/{idx}"),
            json!({"CapacityMiB": 3906}),
        )
        .await;
    }
    mount_json(
        server,
        "/redfish/v1/Systems/1/Processors",
        members(&[
            "/redfish/v1/Systems/1/Processors/1",
            "/redfish/v1/Systems/1/Processors/2",
        ]),
    )
    .await;
    for idx in 1..=2 {
        mount_json(
            server,
            &format!("/redfish/v1/Systems/1/Processors/{idx}"),
            json!({
                "TotalThreads": 14,
                "MaxSpeedMHz": 2300,
                "ProcessorArchitecture": "x86"
            }),
        )
        .await;
    }
    mount_json(
        server,
        "/redfish/v1/Systems/1/Adapters",
        members(&["/redfish/v1/Systems/1/Adapters/1"]),
    )
    .await;
    mount_json(
        server,
        "/redfish/v1/Systems/1/Adapters/1/Devices",
        members(&["/redfish/v1/Systems/1/Adapters/1/Devices/1"]),
    )
    .await;
    mount_json(
        server,
        "/redfish/v1/Systems/1/Adapters/1/Devices/1",
        json!({"CapacityGiB": 100}),
    )
    .await;

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
                    "TargetIQN": "iqn.2010-08.io.maas:compose-1"
                }
            }]
        }),
    )
    .await;

    mount_json(server, "/redfish/v1/Nodes", members(&[])).await;
}

#[tokio::test]
async fn test_discover_empty_pod() {
    let server = MockServer::start().await;
    mount_empty_pod(&server).await;
    let client = pod_client(&server).await;

    let pod = client.discover().await.unwrap();

    assert_eq!(pod.cores, 28);
    assert_eq!(pod.cpu_speed, 2300);
    assert_eq!(pod.memory, 7812);
    assert_eq!(pod.local_storage, 100 * BYTES_PER_GIB);
    assert_eq!(pod.local_disks, 1);
    assert!(pod.architectures.contains("amd64/generic"));
    assert!(pod.capabilities.contains(&Capability::Composable));
    assert!(pod.capabilities.contains(&Capability::FixedLocalStorage));
    assert!(pod.machines.is_empty());

    // The volume group counts in full; its unused volume is reserved as a
    // potential master and therefore excluded from the available figure.
    assert_eq!(pod.iscsi_storage, 100 * BYTES_PER_GIB);
    assert_eq!(pod.hints.iscsi_storage, 80 * BYTES_PER_GIB);

    // Nothing is composed, so the hints mirror the totals.
    assert_eq!(pod.hints.cores, 28);
    assert_eq!(pod.hints.cpu_speed, 2300);
    assert_eq!(pod.hints.memory, 7812);
    assert_eq!(pod.hints.local_storage, 100 * BYTES_PER_GIB);
    assert_eq!(pod.hints.local_disks, 1);
}
