pub mod base_value_object;
mod node_id;
mod pod_host;
mod pod_password;
mod pod_port;
mod pod_url;
mod pod_username;

pub use node_id::NodeId;
pub use pod_host::PodHost;
pub use pod_password::PodPassword;
pub use pod_port::{DEFAULT_POD_PORT, PodPort};
pub use pod_url::PodUrl;
pub use pod_username::PodUsername;
