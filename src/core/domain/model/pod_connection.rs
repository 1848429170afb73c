use crate::core::domain::value_object::{PodPassword, PodUrl, PodUsername};

/// Connection details for one pod management endpoint.
///
/// The base URL already encodes host, port and scheme; what remains here is
/// what every request needs: credentials and the TLS trust policy.
#[derive(Debug, Clone)]
pub struct PodConnection {
    pod_username: PodUsername,
    pod_password: PodPassword,
    pod_accept_invalid_certs: bool,
    pod_url: PodUrl,
}

impl PodConnection {
    pub fn new(
        pod_username: PodUsername,
        pod_password: PodPassword,
        pod_accept_invalid_certs: bool,
        pod_url: PodUrl,
    ) -> Self {
        Self {
            pod_username,
            pod_password,
            pod_accept_invalid_certs,
            pod_url,
        }
    }

    pub fn pod_username(&self) -> &PodUsername {
        &self.pod_username
    }

    pub fn pod_password(&self) -> &PodPassword {
        &self.pod_password
    }

    pub fn accepts_invalid_certs(&self) -> bool {
        // Pods commonly ship self-signed certificates on their management
        // interface.
        self.pod_accept_invalid_certs
    }

    pub fn pod_url(&self) -> &PodUrl {
        &self.pod_url
    }
}
