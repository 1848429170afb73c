use crate::core::domain::{
    error::{RsdResult, ValidationError},
    value_object::base_value_object::ValueObject,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Configuration for pod password validation.
///
/// Pod credentials are provisioned by the rack administrator rather than
/// chosen by an end user, so only structural checks apply here; no strength
/// scoring.
#[derive(Debug, Clone)]
pub struct PodPasswordConfig {
    max_length: usize,
}

impl Default for PodPasswordConfig {
    fn default() -> Self {
        Self { max_length: 1024 }
    }
}

/// Represents a validated pod API password.
#[derive(Clone)]
pub struct PodPassword {
    value: Arc<RwLock<String>>,
}

// Manual Debug so credentials never end up in logs.
impl std::fmt::Debug for PodPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PodPassword").field("value", &"***").finish()
    }
}

impl PodPassword {
    /// Creates a new PodPassword instance with validation.
    pub async fn new(password: String) -> RsdResult<Self> {
        <Self as ValueObject>::new(password).await
    }

    /// Creates a password without validation.
    pub(crate) fn new_unchecked(password: String) -> Self {
        Self::create(password)
    }
}

#[async_trait]
impl ValueObject for PodPassword {
    type Value = String;
    type ValidationConfig = PodPasswordConfig;

    fn value(&self) -> &Arc<RwLock<Self::Value>> {
        &self.value
    }

    fn validation_config() -> Self::ValidationConfig {
        PodPasswordConfig::default()
    }

    async fn validate(
        value: &Self::Value,
        config: &Self::ValidationConfig,
    ) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::Field {
                field: "password".to_string(),
                message: "Password cannot be empty".to_string(),
            });
        }

        if value.len() > config.max_length {
            return Err(ValidationError::ConstraintViolation(format!(
                "Password length exceeds maximum of {} characters",
                config.max_length
            )));
        }

        if value.chars().any(|c| c.is_control()) {
            return Err(ValidationError::Format(
                "Password cannot contain control characters".to_string(),
            ));
        }

        Ok(())
    }

    fn create(value: Self::Value) -> Self {
        Self {
            value: Arc::new(RwLock::new(value)),
        }
    }
}
