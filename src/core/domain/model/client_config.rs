use std::time::Duration;

/// Rate limit settings for outgoing pod API requests.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Sustained requests per second.
    pub requests_per_second: u32,
    /// Burst allowance above the sustained rate.
    pub burst_size: u32,
}

/// Tunables for the pod client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Optional client-side rate limiting; `None` disables it.
    pub rate_limit: Option<RateLimitConfig>,
    /// Delay between `ComposedNodeState` polls while a node assembles.
    pub assemble_poll_interval: Duration,
    /// Upper bound on a single assembly wait. Exceeding it is a fatal
    /// action error, not a resource-exhaustion condition.
    pub assemble_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rate_limit: None,
            assemble_poll_interval: Duration::from_secs(2),
            assemble_timeout: Duration::from_secs(120),
        }
    }
}
