use crate::core::domain::error::{RsdResult, ValidationError};

/// The port the PSME REST endpoint usually listens on.
pub const DEFAULT_POD_PORT: u16 = 8443;

/// A validated pod API port number.
#[derive(Debug, Clone, Copy)]
pub struct PodPort(u16);

impl PodPort {
    /// Creates a new validated port.
    pub fn new(port: u16) -> RsdResult<Self> {
        validate_port(port)?;
        Ok(Self(port))
    }

    /// Creates a new port without validation.
    pub(crate) fn new_unchecked(port: u16) -> Self {
        Self(port)
    }

    /// Returns the port number.
    pub fn get(&self) -> u16 {
        self.0
    }
}

/// Validates a port number.
pub(crate) fn validate_port(port: u16) -> Result<(), ValidationError> {
    if port == 0 {
        return Err(ValidationError::Field {
            field: "port".to_string(),
            message: "Port cannot be 0".to_string(),
        });
    }
    // All ports 1-65535 are valid.
    Ok(())
}
