use crate::core::domain::{
    error::{RsdResult, ValidationError},
    value_object::base_value_object::ValueObject,
};
use async_trait::async_trait;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Represents the configuration for a pod host value object.
///
/// Pod management endpoints are usually addressed by a raw IP on a private
/// management network, so this accepts either an IP literal or an RFC 1035
/// hostname. No DNS lookup is performed.
#[derive(Debug, Clone)]
pub struct PodHostConfig {
    max_hostname_length: usize,
    max_label_length: usize,
}

impl PodHostConfig {
    fn validate_label(&self, label: &str) -> Result<(), ValidationError> {
        if label.is_empty() || label.len() > self.max_label_length {
            return Err(ValidationError::Format(format!(
                "Label must be between 1 and {} characters",
                self.max_label_length
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ValidationError::Format(
                "Label can only contain alphanumeric characters and hyphens".to_string(),
            ));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(ValidationError::Format(
                "Label cannot start or end with hyphen".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for PodHostConfig {
    fn default() -> Self {
        Self {
            max_hostname_length: 253,
            max_label_length: 63,
        }
    }
}

/// Represents a validated pod host address (hostname or IP literal).
#[derive(Debug, Clone)]
pub struct PodHost {
    value: Arc<RwLock<String>>,
}

impl PodHost {
    /// Creates a new PodHost instance with validation
    ///
    /// # Returns
    ///
    /// * `Ok(PodHost)` if validation succeeds
    /// * `Err(RsdError)` if validation fails
    pub async fn new(host: String) -> RsdResult<Self> {
        <Self as ValueObject>::new(host).await
    }

    /// Creates a host without validation.
    pub(crate) fn new_unchecked(host: String) -> Self {
        Self::create(host)
    }
}

#[async_trait]
impl ValueObject for PodHost {
    type Value = String;
    type ValidationConfig = PodHostConfig;

    fn value(&self) -> &Arc<RwLock<Self::Value>> {
        &self.value
    }

    fn validation_config() -> Self::ValidationConfig {
        PodHostConfig::default()
    }

    async fn validate(
        value: &Self::Value,
        config: &Self::ValidationConfig,
    ) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::Field {
                field: "host".to_string(),
                message: "Host cannot be empty".to_string(),
            });
        }

        // IP literals are accepted as-is.
        if value.parse::<IpAddr>().is_ok() {
            return Ok(());
        }

        if value.len() > config.max_hostname_length {
            return Err(ValidationError::ConstraintViolation(format!(
                "Host length exceeds maximum of {} characters",
                config.max_hostname_length
            )));
        }

        for label in value.split('.') {
            config.validate_label(label)?;
        }

        Ok(())
    }

    fn create(value: Self::Value) -> Self {
        Self {
            value: Arc::new(RwLock::new(value)),
        }
    }
}
