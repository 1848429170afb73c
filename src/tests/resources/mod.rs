//! End-to-end tests through the public client against a mock pod.

mod compose_tests;
mod discover_tests;
mod power_tests;

use crate::{RsdClient, RsdClientBuilder};
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a client pointed at the mock server, plain HTTP.
pub(crate) async fn pod_client(server: &MockServer) -> RsdClient {
    let address = server.address();
    RsdClientBuilder::new()
        .host(address.ip().to_string())
        .port(address.port())
        .secure(false)
        .username("admin")
        .password("admin")
        .build()
        .await
        .expect("mock server address should build a client")
}

pub(crate) async fn mount_json(server: &MockServer, resource: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(resource))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub(crate) fn members(paths: &[&str]) -> Value {
    serde_json::json!({
        "Members": paths
            .iter()
            .map(|p| serde_json::json!({"@odata.id": p}))
            .collect::<Vec<_>>()
    })
}
