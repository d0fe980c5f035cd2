//! The shared circuit breaker and its execution entry point.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use super::config::BreakerConfig;
use super::state::{Admission, BreakerState, CircuitState, Observation};
use crate::error::{ConfigError, MemoryError};
use crate::outcome::Outcome;

/// Guards one downstream dependency.
///
/// Construct one breaker per dependency and share it (`Arc<CircuitBreaker>`
/// or a `static`) between every call site that talks to it; failure counting
/// only works across calls that go through the same instance.
///
/// Admission and outcome recording are short critical sections on an
/// internal mutex. The lock is never held while the operation runs.
///
/// # Example
///
/// ```rust
/// use cognee_resilience::{BreakerConfig, CircuitBreaker, CircuitState, MemoryError, Outcome};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let breaker = CircuitBreaker::new(BreakerConfig::new(2, Duration::from_secs(30)));
///
/// for _ in 0..2 {
///     let _: Outcome<()> = breaker
///         .execute(|| async { Outcome::failure(MemoryError::network(Some(502), "bad gateway")) })
///         .await;
/// }
/// assert_eq!(breaker.state(), CircuitState::Open);
///
/// let rejected: Outcome<()> = breaker.execute(|| async { Outcome::success(()) }).await;
/// assert!(rejected.failure_value().is_some_and(|e| e.is_circuit_open()));
/// # });
/// ```
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    state: BreakerState,
    generation: u64,
    forwarded: u64,
    rejected: u64,
}

/// Point-in-time view of a breaker, for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerStats {
    /// Current state tag.
    pub state: CircuitState,
    /// Current failure counter.
    pub failure_count: u32,
    /// Time of the most recent recorded failure.
    pub last_failure_time: Option<Instant>,
    /// Calls handed to the operation since construction.
    pub forwarded_calls: u64,
    /// Calls rejected without invoking the operation since construction.
    pub rejected_calls: u64,
}

impl Inner {
    fn transition(&mut self, next: BreakerState) {
        let from = self.state.state();
        self.state = next;
        if from == next.state() {
            return;
        }
        self.generation += 1;
        match next.state() {
            CircuitState::Open => {
                tracing::warn!(failures = next.failures(), %from, "circuit breaker opened");
            }
            CircuitState::HalfOpen => {
                tracing::info!("circuit breaker half-open, admitting trial call");
            }
            CircuitState::Closed => tracing::info!(%from, "circuit breaker closed"),
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}

impl CircuitBreaker {
    /// Create a closed breaker.
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Create a closed breaker after validating `config`.
    pub fn try_new(config: BreakerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// The configuration this breaker was built with.
    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Run `operation` through the breaker.
    ///
    /// While the circuit is open the operation is not invoked and the
    /// synthetic [`MemoryError::circuit_open`] failure is returned instead.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> Outcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        let permit = match self.admit() {
            Ok(permit) => permit,
            Err(retry_after) => return Outcome::Failure(MemoryError::circuit_open(retry_after)),
        };

        let outcome = operation().await;
        permit.complete(if outcome.is_success() {
            Observation::Success
        } else {
            Observation::Failure
        });
        outcome
    }

    /// Current state tag.
    ///
    /// This is a plain read: an `Open` circuit whose cooldown has elapsed is
    /// reported as `Open` until the next call arrives.
    pub fn state(&self) -> CircuitState {
        self.lock().state.state()
    }

    /// Current failure counter.
    pub fn failure_count(&self) -> u32 {
        self.lock().state.failures()
    }

    /// The full current state value.
    pub fn snapshot(&self) -> BreakerState {
        self.lock().state
    }

    /// Current statistics.
    pub fn stats(&self) -> BreakerStats {
        let inner = self.lock();
        BreakerStats {
            state: inner.state.state(),
            failure_count: inner.state.failures(),
            last_failure_time: inner.state.last_failure_time(),
            forwarded_calls: inner.forwarded,
            rejected_calls: inner.rejected,
        }
    }

    /// Force the breaker back to `Closed` with no recorded failures.
    ///
    /// Outcomes of calls admitted before the reset are ignored.
    pub fn reset(&self) {
        let mut inner = self.lock();
        tracing::debug!(from = %inner.state.state(), "circuit breaker reset");
        inner.state = BreakerState::default();
        inner.generation += 1;
    }

    fn admit(&self) -> Result<Permit<'_>, Duration> {
        let mut inner = self.lock();
        let (next, admission) = inner.state.admit(Instant::now(), self.config.timeout);
        inner.transition(next);

        match admission {
            Admission::Forward | Admission::Trial => {
                inner.forwarded += 1;
                Ok(Permit {
                    breaker: self,
                    generation: inner.generation,
                    trial: admission == Admission::Trial,
                    completed: false,
                })
            }
            Admission::Reject { retry_after } => {
                inner.rejected += 1;
                tracing::debug!(
                    state = %inner.state.state(),
                    retry_after_ms = retry_after.as_millis() as u64,
                    "circuit breaker rejected call"
                );
                Err(retry_after)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An admitted call. Recording its observation, or dropping it unrecorded,
/// updates the breaker.
struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    trial: bool,
    completed: bool,
}

impl Permit<'_> {
    fn complete(mut self, observation: Observation) {
        self.completed = true;
        let mut inner = self.breaker.lock();
        if inner.generation != self.generation {
            tracing::debug!(?observation, "ignoring outcome admitted before a state change");
            return;
        }
        let next = inner
            .state
            .record(observation, Instant::now(), self.breaker.config.threshold);
        inner.transition(next);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if self.completed || !self.trial {
            return;
        }
        let mut inner = self.breaker.lock();
        if inner.generation == self.generation {
            tracing::debug!("trial call dropped before completing");
            let next = inner.state.abandon_trial();
            inner.transition(next);
        }
    }
}
