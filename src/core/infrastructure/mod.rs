mod redfish_client;

pub use redfish_client::RedfishClient;
