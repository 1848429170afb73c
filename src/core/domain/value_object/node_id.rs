use crate::core::domain::error::{RsdResult, ValidationError};

/// A validated composed-node identifier, the last path segment of a
/// `/redfish/v1/Nodes/{id}` resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a new validated node id.
    pub fn new(id: impl Into<String>) -> RsdResult<Self> {
        let id = id.into();
        validate_node_id(&id)?;
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates a composed-node identifier.
pub(crate) fn validate_node_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::Field {
            field: "node_id".to_string(),
            message: "Node ID cannot be empty".to_string(),
        });
    }

    // A node id is a single path segment; separators or whitespace would
    // change the resource being addressed.
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ValidationError::Format(format!(
            "Node ID '{}' contains characters outside [A-Za-z0-9._-]",
            id
        )));
    }

    Ok(())
}
