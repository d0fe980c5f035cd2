//! Serde support for resilience configuration (feature-gated)
//!
//! [`RetryStrategy`] and [`BreakerConfig`] serialize to the camelCase,
//! millisecond-based form used by SDK configuration files. Missing keys take
//! their defaults, unknown keys are rejected, and deserialization runs
//! `validate()` so an out-of-range value never produces a live strategy.
//!
//! # Example
//!
//! ```rust
//! use cognee_resilience::{ErrorKind, RetryStrategy};
//! use std::time::Duration;
//!
//! let json = r#"{"maxAttempts": 5, "initialDelayMs": 250, "retryableErrors": ["network_error"]}"#;
//! let strategy: RetryStrategy = serde_json::from_str(json).unwrap();
//! assert_eq!(strategy.max_attempts(), 5);
//! assert_eq!(strategy.initial_delay(), Duration::from_millis(250));
//! assert_eq!(strategy.max_delay(), Duration::from_secs(10));
//! assert!(!strategy.retries(ErrorKind::ProcessingFailed));
//!
//! let bad = r#"{"backoffFactor": 0.5}"#;
//! assert!(serde_json::from_str::<RetryStrategy>(bad).is_err());
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

use crate::breaker::BreakerConfig;
use crate::error::ErrorKind;
use crate::retry::RetryStrategy;

#[derive(Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
struct RetryConfig {
    max_attempts: u32,
    initial_delay_ms: u64,
    max_delay_ms: u64,
    backoff_factor: f64,
    retryable_errors: Vec<ErrorKind>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&RetryStrategy::default())
    }
}

impl From<&RetryStrategy> for RetryConfig {
    fn from(strategy: &RetryStrategy) -> Self {
        Self {
            max_attempts: strategy.max_attempts(),
            initial_delay_ms: millis(strategy.initial_delay()),
            max_delay_ms: millis(strategy.max_delay()),
            backoff_factor: strategy.backoff_factor(),
            retryable_errors: strategy.retryable_errors().iter().copied().collect(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
struct CircuitConfig {
    threshold: u32,
    timeout_ms: u64,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self::from(&BreakerConfig::default())
    }
}

impl From<&BreakerConfig> for CircuitConfig {
    fn from(config: &BreakerConfig) -> Self {
        Self {
            threshold: config.threshold,
            timeout_ms: millis(config.timeout),
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl Serialize for RetryStrategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RetryConfig::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RetryStrategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let config = RetryConfig::deserialize(deserializer)?;
        let strategy = RetryStrategy::default()
            .with_max_attempts(config.max_attempts)
            .with_initial_delay(Duration::from_millis(config.initial_delay_ms))
            .with_max_delay(Duration::from_millis(config.max_delay_ms))
            .with_backoff_factor(config.backoff_factor)
            .with_retryable_errors(config.retryable_errors);
        strategy.validate().map_err(serde::de::Error::custom)?;
        Ok(strategy)
    }
}

impl Serialize for BreakerConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CircuitConfig::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BreakerConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = CircuitConfig::deserialize(deserializer)?;
        let config = BreakerConfig::new(raw.threshold, Duration::from_millis(raw.timeout_ms));
        config.validate().map_err(serde::de::Error::custom)?;
        Ok(config)
    }
}
