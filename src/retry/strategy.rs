//! Retry strategy types and configuration.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::error::{ConfigError, ErrorKind, MemoryError};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);
const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(10_000);
const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;

/// How to retry a failed memory-service operation.
///
/// Strategies are pure data: they describe retry behavior but never execute
/// it, so they are cheap to clone and share between call sites. Hand them to
/// [`with_retry`](crate::with_retry) explicitly; the default is only ever
/// obtained through [`Default`].
///
/// The delay after failed attempt `n` (1-indexed) is
/// `min(initial_delay * backoff_factor^(n-1), max_delay)`.
///
/// # Examples
///
/// ```rust
/// use cognee_resilience::{ErrorKind, RetryStrategy};
/// use std::time::Duration;
///
/// let strategy = RetryStrategy::default();
/// assert_eq!(strategy.max_attempts(), 3);
/// assert!(strategy.retries(ErrorKind::NetworkError));
/// assert!(!strategy.retries(ErrorKind::PermissionDenied));
///
/// // 1000ms after the first failure, 2000ms after the second, none after the third.
/// assert_eq!(strategy.delay_for_attempt(1), Some(Duration::from_millis(1000)));
/// assert_eq!(strategy.delay_for_attempt(2), Some(Duration::from_millis(2000)));
/// assert_eq!(strategy.delay_for_attempt(3), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryStrategy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    backoff_factor: f64,
    retryable_errors: BTreeSet<ErrorKind>,
    jitter: JitterStrategy,
}

/// Strategy for adding randomness to delays.
///
/// Delays are deterministic unless a jitter strategy is chosen **and** the
/// `jitter` feature is enabled.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JitterStrategy {
    /// No jitter applied.
    #[default]
    None,
    /// Add ±percentage randomness to delay.
    Proportional(f64),
    /// Random delay between 0 and calculated delay.
    Full,
}

/// Information about a failed attempt, passed to retry hooks.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The error from the failed attempt.
    pub error: &'a MemoryError,
    /// Delay before the next attempt, or `None` when this failure is final.
    pub next_delay: Option<Duration>,
    /// Total elapsed time since the first attempt started.
    pub elapsed: Duration,
}

impl Default for RetryStrategy {
    /// Three attempts, 1s initial delay doubling up to 10s, retrying
    /// `network_error` and `processing_failed`.
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            retryable_errors: BTreeSet::from([ErrorKind::NetworkError, ErrorKind::ProcessingFailed]),
            jitter: JitterStrategy::None,
        }
    }
}

impl RetryStrategy {
    /// A strategy that calls the operation once and never retries.
    pub fn no_retry() -> Self {
        Self::default().with_max_attempts(1)
    }

    /// Set the total number of attempts, including the first.
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the delay before the second attempt.
    pub fn with_initial_delay(mut self, d: Duration) -> Self {
        self.initial_delay = d;
        self
    }

    /// Set the cap on computed delays.
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = d;
        self
    }

    /// Set the multiplicative growth applied per attempt.
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Replace the set of kinds that trigger a retry.
    ///
    /// ```rust
    /// use cognee_resilience::{ErrorKind, RetryStrategy};
    ///
    /// let strategy = RetryStrategy::default().with_retryable_errors([ErrorKind::NetworkError]);
    /// assert!(!strategy.retries(ErrorKind::ProcessingFailed));
    ///
    /// // An empty set turns the executor into a single pass-through call.
    /// let never = RetryStrategy::default().with_retryable_errors([]);
    /// assert!(ErrorKind::ALL.iter().all(|k| !never.retries(*k)));
    /// ```
    pub fn with_retryable_errors(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.retryable_errors = kinds.into_iter().collect();
        self
    }

    /// Add one kind to the retryable set.
    pub fn retrying(mut self, kind: ErrorKind) -> Self {
        self.retryable_errors.insert(kind);
        self
    }

    /// Add proportional jitter to delays.
    ///
    /// The factor determines the range of randomness. For example, `0.25` means
    /// the actual delay will be ±25% of the calculated delay, still capped at
    /// `max_delay`.
    ///
    /// **Note**: Requires the `jitter` feature. Without it, this method does nothing.
    pub fn with_jitter(mut self, factor: f64) -> Self {
        self.jitter = JitterStrategy::Proportional(factor.clamp(0.0, 1.0));
        self
    }

    /// Use full jitter: a random delay between 0 and the calculated delay.
    ///
    /// **Note**: Requires the `jitter` feature. Without it, this method does nothing.
    pub fn with_full_jitter(mut self) -> Self {
        self.jitter = JitterStrategy::Full;
        self
    }

    /// Total attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the second attempt.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Cap on computed delays.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Growth factor per attempt.
    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    /// Kinds that trigger a retry.
    pub fn retryable_errors(&self) -> &BTreeSet<ErrorKind> {
        &self.retryable_errors
    }

    /// Get the jitter strategy.
    pub fn jitter(&self) -> &JitterStrategy {
        &self.jitter
    }

    /// Whether failures of `kind` are retried.
    pub fn retries(&self, kind: ErrorKind) -> bool {
        self.retryable_errors.contains(&kind)
    }

    /// Whether `error` is retried.
    pub fn is_retryable(&self, error: &MemoryError) -> bool {
        self.retries(error.kind())
    }

    /// The delay to wait after failed attempt `attempt` (1-indexed).
    ///
    /// Returns `None` when `attempt` was the last one allowed. Jitter is not
    /// applied here.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cognee_resilience::RetryStrategy;
    /// use std::time::Duration;
    ///
    /// let strategy = RetryStrategy::default()
    ///     .with_max_attempts(6)
    ///     .with_initial_delay(Duration::from_millis(100))
    ///     .with_max_delay(Duration::from_millis(500));
    ///
    /// assert_eq!(strategy.delay_for_attempt(1), Some(Duration::from_millis(100)));
    /// assert_eq!(strategy.delay_for_attempt(2), Some(Duration::from_millis(200)));
    /// assert_eq!(strategy.delay_for_attempt(3), Some(Duration::from_millis(400)));
    /// assert_eq!(strategy.delay_for_attempt(4), Some(Duration::from_millis(500))); // capped
    /// assert_eq!(strategy.delay_for_attempt(6), None);
    /// ```
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt >= self.max_attempts {
            return None;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let scaled = self.initial_delay.as_nanos() as f64 * self.backoff_factor.powi(exponent);
        let cap = self.max_delay.as_nanos() as f64;

        if scaled.is_nan() || scaled >= cap {
            Some(self.max_delay)
        } else {
            Some(Duration::from_nanos(scaled as u64))
        }
    }

    /// The delay for `attempt` with jitter applied.
    ///
    /// This is used internally by the retry executor.
    #[doc(hidden)]
    pub fn delay_with_jitter(&self, attempt: u32) -> Option<Duration> {
        let base_delay = self.delay_for_attempt(attempt)?;
        Some(self.jitter.apply(base_delay, self.max_delay))
    }

    /// Check the documented bounds of every field.
    ///
    /// ```rust
    /// use cognee_resilience::{ConfigError, RetryStrategy};
    ///
    /// assert!(RetryStrategy::default().validate().is_ok());
    /// assert_eq!(
    ///     RetryStrategy::default().with_max_attempts(0).validate(),
    ///     Err(ConfigError::ZeroAttempts)
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.max_delay < self.initial_delay {
            return Err(ConfigError::DelayBounds {
                initial: self.initial_delay,
                max: self.max_delay,
            });
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 1.0 {
            return Err(ConfigError::BackoffFactor(self.backoff_factor));
        }
        Ok(())
    }
}

impl JitterStrategy {
    /// Apply jitter to a base delay, capping the result at `max_delay`.
    pub fn apply(&self, base_delay: Duration, max_delay: Duration) -> Duration {
        let jittered = match self {
            JitterStrategy::None => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Proportional(factor) => {
                use rand::Rng;
                let base_nanos = base_delay.as_nanos() as f64;
                let jitter_range = base_nanos * factor;
                let min = (base_nanos - jitter_range).max(0.0);
                let max = base_nanos + jitter_range;
                if max <= min {
                    base_delay
                } else {
                    Duration::from_nanos(rand::rng().random_range(min..=max) as u64)
                }
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Proportional(_) => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Full => {
                use rand::Rng;
                let max_nanos = u64::try_from(base_delay.as_nanos()).unwrap_or(u64::MAX);
                if max_nanos == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_nanos(rand::rng().random_range(0..=max_nanos))
                }
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Full => base_delay,
        };

        jittered.min(max_delay)
    }
}

#[cfg(test)]
mod strategy_tests {
    use super::*;

    fn scenario_strategy() -> RetryStrategy {
        RetryStrategy::default()
            .with_max_attempts(3)
            .with_initial_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(1000))
            .with_backoff_factor(2.0)
            .with_retryable_errors([ErrorKind::NetworkError])
    }

    #[test]
    fn test_default_values() {
        let strategy = RetryStrategy::default();
        assert_eq!(strategy.max_attempts(), 3);
        assert_eq!(strategy.initial_delay(), Duration::from_millis(1000));
        assert_eq!(strategy.max_delay(), Duration::from_millis(10_000));
        assert_eq!(strategy.backoff_factor(), 2.0);
        assert_eq!(
            strategy.retryable_errors().iter().copied().collect::<Vec<_>>(),
            vec![ErrorKind::ProcessingFailed, ErrorKind::NetworkError]
        );
        assert_eq!(strategy.jitter(), &JitterStrategy::None);
    }

    #[test]
    fn test_default_delays() {
        let strategy = RetryStrategy::default();
        assert_eq!(strategy.delay_for_attempt(1), Some(Duration::from_millis(1000)));
        assert_eq!(strategy.delay_for_attempt(2), Some(Duration::from_millis(2000)));
        assert_eq!(strategy.delay_for_attempt(3), None);
    }

    #[test]
    fn test_scenario_delays() {
        let strategy = scenario_strategy();
        assert_eq!(strategy.delay_for_attempt(1), Some(Duration::from_millis(100)));
        assert_eq!(strategy.delay_for_attempt(2), Some(Duration::from_millis(200)));
        assert_eq!(strategy.delay_for_attempt(3), None);
    }

    #[test]
    fn test_fractional_factor() {
        let strategy = RetryStrategy::default()
            .with_max_attempts(4)
            .with_initial_delay(Duration::from_millis(100))
            .with_backoff_factor(1.5);
        assert_eq!(strategy.delay_for_attempt(1), Some(Duration::from_millis(100)));
        assert_eq!(strategy.delay_for_attempt(2), Some(Duration::from_millis(150)));
        assert_eq!(strategy.delay_for_attempt(3), Some(Duration::from_millis(225)));
    }

    #[test]
    fn test_factor_one_is_constant() {
        let strategy = RetryStrategy::default()
            .with_max_attempts(10)
            .with_initial_delay(Duration::from_millis(40))
            .with_backoff_factor(1.0);
        for attempt in 1..10 {
            assert_eq!(strategy.delay_for_attempt(attempt), Some(Duration::from_millis(40)));
        }
    }

    #[test]
    fn test_huge_exponent_saturates_at_cap() {
        let strategy = RetryStrategy::default()
            .with_max_attempts(u32::MAX)
            .with_max_delay(Duration::from_secs(30));
        assert_eq!(
            strategy.delay_for_attempt(10_000),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_zero_initial_delay_stays_zero() {
        let strategy = RetryStrategy::default()
            .with_max_attempts(u32::MAX)
            .with_initial_delay(Duration::ZERO);
        assert_eq!(strategy.delay_for_attempt(1), Some(Duration::ZERO));
        assert_eq!(strategy.delay_for_attempt(5), Some(Duration::ZERO));
        // 0 * inf is NaN and falls back to the cap
        assert_eq!(
            strategy.delay_for_attempt(u32::MAX - 1),
            Some(strategy.max_delay())
        );
    }

    #[test]
    fn test_single_attempt_never_delays() {
        let strategy = RetryStrategy::no_retry();
        assert_eq!(strategy.delay_for_attempt(1), None);
        assert_eq!(strategy.delay_for_attempt(0), None);
    }

    #[test]
    fn test_retrying_adds_kind() {
        let strategy = scenario_strategy().retrying(ErrorKind::UnknownError);
        assert!(strategy.retries(ErrorKind::UnknownError));
        assert!(strategy.retries(ErrorKind::NetworkError));
        assert!(!strategy.is_retryable(&MemoryError::permission_denied("d", "read")));
    }

    #[test]
    fn test_validate_delay_bounds() {
        let strategy = RetryStrategy::default()
            .with_initial_delay(Duration::from_secs(5))
            .with_max_delay(Duration::from_secs(1));
        assert_eq!(
            strategy.validate(),
            Err(ConfigError::DelayBounds {
                initial: Duration::from_secs(5),
                max: Duration::from_secs(1),
            })
        );
    }

    #[test]
    fn test_validate_backoff_factor() {
        assert_eq!(
            RetryStrategy::default().with_backoff_factor(0.5).validate(),
            Err(ConfigError::BackoffFactor(0.5))
        );
        assert!(RetryStrategy::default()
            .with_backoff_factor(f64::INFINITY)
            .validate()
            .is_err());
        assert!(RetryStrategy::default()
            .with_backoff_factor(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_jitter_none_returns_base_delay() {
        let jitter = JitterStrategy::None;
        let base = Duration::from_millis(100);
        assert_eq!(jitter.apply(base, Duration::from_secs(1)), base);
    }

    #[test]
    fn test_jitter_is_capped() {
        let strategy = RetryStrategy::default()
            .with_initial_delay(Duration::from_millis(1000))
            .with_max_delay(Duration::from_millis(1000))
            .with_jitter(1.0);
        for _ in 0..20 {
            let delay = strategy.delay_with_jitter(1).unwrap();
            assert!(delay <= Duration::from_millis(1000));
        }
    }

    #[cfg(feature = "jitter")]
    #[test]
    fn test_full_jitter_stays_below_base() {
        let strategy = RetryStrategy::default().with_full_jitter();
        for _ in 0..20 {
            let delay = strategy.delay_with_jitter(2).unwrap();
            assert!(delay <= Duration::from_millis(2000));
        }
    }

    #[cfg(feature = "jitter")]
    #[test]
    fn test_jitter_keeps_sub_millisecond_delays() {
        let base = Duration::from_micros(800);
        for _ in 0..20 {
            let delay = JitterStrategy::Proportional(0.1).apply(base, Duration::from_secs(1));
            assert!(delay >= Duration::from_micros(719) && delay <= Duration::from_micros(881));
        }
        let full: Vec<Duration> = (0..50)
            .map(|_| JitterStrategy::Full.apply(base, Duration::from_secs(1)))
            .collect();
        assert!(full.iter().all(|d| *d <= base));
        assert!(full.iter().any(|d| *d > Duration::ZERO));
    }

    #[test]
    fn test_strategy_is_clone() {
        let strategy = scenario_strategy();
        assert_eq!(strategy.clone(), strategy);
    }
}
