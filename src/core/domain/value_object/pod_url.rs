use crate::core::domain::{
    error::{RsdResult, ValidationError},
    value_object::{
        base_value_object::ValueObject, pod_host::PodHost, pod_port::PodPort,
    },
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Represents the configuration for a pod base-URL value object.
#[derive(Debug, Clone)]
pub struct PodUrlConfig {
    allowed_schemes: HashSet<String>,
    max_length: usize,
}

impl PodUrlConfig {
    fn validate_url(&self, url: &str) -> Result<(), ValidationError> {
        if url.is_empty() {
            return Err(ValidationError::Field {
                field: "url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        }

        if url.len() > self.max_length {
            return Err(ValidationError::Format(format!(
                "URL exceeds maximum length of {} characters",
                self.max_length
            )));
        }

        let url_parts = url::Url::parse(url)
            .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;

        if !self.allowed_schemes.contains(url_parts.scheme()) {
            return Err(ValidationError::ConstraintViolation(format!(
                "Invalid scheme. Must be one of: {}",
                self.allowed_schemes
                    .iter()
                    .cloned()
                    .collect::<Vec<String>>()
                    .join(", ")
            )));
        }

        Ok(())
    }
}

impl Default for PodUrlConfig {
    fn default() -> Self {
        let mut schemes = HashSet::new();
        schemes.insert("https".to_string());
        // PSME emulators and lab pods frequently run plain HTTP.
        schemes.insert("http".to_string());

        Self {
            allowed_schemes: schemes,
            max_length: 2083,
        }
    }
}

/// Represents a validated pod base URL.
///
/// Combines [`PodHost`] and [`PodPort`] into the root every redfish resource
/// path is joined onto.
#[derive(Debug, Clone)]
pub struct PodUrl {
    value: Arc<RwLock<String>>,
}

impl PodUrl {
    pub async fn new(host: &PodHost, port: &PodPort, secure: bool) -> RsdResult<Self> {
        let host_str = host.as_inner().await;
        let scheme = if secure { "https" } else { "http" };
        let url = format!("{}://{}:{}/", scheme, host_str, port.get());
        <Self as ValueObject>::new(url).await
    }

    /// Creates a URL without validation.
    pub(crate) fn new_unchecked(url: String) -> Self {
        Self::create(url)
    }
}

#[async_trait]
impl ValueObject for PodUrl {
    type Value = String;
    type ValidationConfig = PodUrlConfig;

    fn value(&self) -> &Arc<RwLock<Self::Value>> {
        &self.value
    }

    fn validation_config() -> Self::ValidationConfig {
        PodUrlConfig::default()
    }

    async fn validate(
        value: &Self::Value,
        config: &Self::ValidationConfig,
    ) -> Result<(), ValidationError> {
        config.validate_url(value)
    }

    fn create(value: Self::Value) -> Self {
        Self {
            value: Arc::new(RwLock::new(value)),
        }
    }
}
