use crate::core::domain::{
    error::{RsdResult, ValidationError},
    value_object::base_value_object::ValueObject,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Configuration for pod username validation.
#[derive(Debug, Clone)]
pub struct PodUsernameConfig {
    max_length: usize,
}

impl Default for PodUsernameConfig {
    fn default() -> Self {
        Self { max_length: 255 }
    }
}

/// Represents a validated pod API username.
///
/// The username travels in an HTTP Basic `Authorization` header, so a colon
/// is rejected (RFC 7617 reserves it as the user-id/password separator).
#[derive(Debug, Clone)]
pub struct PodUsername {
    value: Arc<RwLock<String>>,
}

impl PodUsername {
    /// Creates a new PodUsername instance with validation.
    pub async fn new(username: String) -> RsdResult<Self> {
        <Self as ValueObject>::new(username).await
    }

    /// Creates a username without validation.
    pub(crate) fn new_unchecked(username: String) -> Self {
        Self::create(username)
    }
}

#[async_trait]
impl ValueObject for PodUsername {
    type Value = String;
    type ValidationConfig = PodUsernameConfig;

    fn value(&self) -> &Arc<RwLock<Self::Value>> {
        &self.value
    }

    fn validation_config() -> Self::ValidationConfig {
        PodUsernameConfig::default()
    }

    async fn validate(
        value: &Self::Value,
        config: &Self::ValidationConfig,
    ) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::Field {
                field: "username".to_string(),
                message: "Username cannot be empty".to_string(),
            });
        }

        if value.len() > config.max_length {
            return Err(ValidationError::ConstraintViolation(format!(
                "Username length exceeds maximum of {} characters",
                config.max_length
            )));
        }

        if value.contains(':') {
            return Err(ValidationError::Format(
                "Username cannot contain a colon".to_string(),
            ));
        }

        if value.chars().any(|c| c.is_control()) {
            return Err(ValidationError::Format(
                "Username cannot contain control characters".to_string(),
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
