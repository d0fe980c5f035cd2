//! Circuit breaker configuration.

use std::time::Duration;

use crate::error::ConfigError;

/// Default number of failures that opens the circuit
const DEFAULT_THRESHOLD: u32 = 5;

/// Default cooldown before a trial call (60s)
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Number of failures before opening the circuit
    pub threshold: u32,
    /// Duration to wait in `Open` before admitting a trial call
    pub timeout: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl BreakerConfig {
    /// Create a config with the given threshold and cooldown
    pub fn new(threshold: u32, timeout: Duration) -> Self {
        Self { threshold, timeout }
    }

    /// Check that the threshold is at least 1
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        Ok(())
    }
}
