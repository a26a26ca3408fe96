//! Poll policy — how long to wait for a rollout.

use std::time::Duration;

/// Fixed-interval polling budget.
///
/// The interval is constant between attempts; there is no backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Failed readiness checks tolerated before giving up.
    pub max_attempts: u32,
    /// Wait between checks.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 120,
            interval: Duration::from_secs(5),
        }
    }
}

impl PollPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    pub fn from_config(config: &ocdeploy_core::config::RolloutConfig) -> Self {
        Self::new(config.max_attempts, config.interval())
    }
}
