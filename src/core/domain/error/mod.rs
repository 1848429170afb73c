use thiserror::Error;

/// The main error type for pod operations.
///
/// This enum represents all possible errors that can occur while talking to
/// a Rack Scale Design pod: transport failures, provider-reported allocation
/// conflicts, failed node actions, and input validation failures.
#[derive(Error, Debug)]
pub enum RsdError {
    /// Transport-level failure: connection error, unexpected HTTP status or
    /// a malformed response body. Never retried by this crate.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The requested resource does not exist on the pod (HTTP 404).
    ///
    /// `DELETE` of an already-missing node maps this to success so that
    /// decomposition stays idempotent; every other operation surfaces it.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The pod reported an allocation conflict (HTTP 409 with a structured
    /// error body). Caught only inside the composition retry loop, where it
    /// drives the next processor-topology candidate.
    #[error("Pod reported resource exhaustion: {0}")]
    ResourceExhausted(String),

    /// No processor topology could be allocated from the pod's free
    /// capacity. Distinct from [`RsdError::ResourceExhausted`] so callers can
    /// tell "shrink the request and retry" from a transient conflict.
    #[error("Pod is unable to allocate the requested machine: {0}")]
    InvalidResources(String),

    /// A node action failed on the provider side: a `Failed` composed-node
    /// state, an unrecognized power state, or a provider error object in an
    /// otherwise successful response.
    #[error("Pod action failed: {0}")]
    Action(String),

    /// Represents validation failures with detailed context.
    #[error("Validation error: {source}")]
    Validation {
        #[source]
        source: ValidationError,
    },
}

impl From<ValidationError> for RsdError {
    fn from(error: ValidationError) -> Self {
        RsdError::Validation { source: error }
    }
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Type alias for Results that may fail with an RsdError
pub type RsdResult<T> = Result<T, RsdError>;
