//! Breaker state as a plain value, with pure transition functions.
//!
//! Nothing here reads a clock or takes a lock: callers pass `now` in and get
//! the next state back. [`CircuitBreaker`](super::CircuitBreaker) is the only
//! place that stores a state and applies these functions to it.

use std::time::Duration;

use tokio::time::Instant;

/// Which state a breaker is in, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitState {
    /// Calls pass through; failures are counted.
    Closed,
    /// Calls are rejected until the cooldown elapses.
    Open,
    /// A single trial call is in flight.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => f.write_str("closed"),
            CircuitState::Open => f.write_str("open"),
            CircuitState::HalfOpen => f.write_str("half-open"),
        }
    }
}

/// The full breaker state.
///
/// `Open` and `HalfOpen` carry the instant the circuit last opened, which is
/// also the time of the failure that opened it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Normal operation with a trailing failure counter.
    Closed {
        /// Consecutive failures observed.
        failures: u32,
        /// When the most recent failure happened.
        last_failure: Option<Instant>,
    },
    /// Failing fast.
    Open {
        /// Failures observed up to opening.
        failures: u32,
        /// When the circuit opened.
        since: Instant,
    },
    /// Waiting for the trial call to finish.
    HalfOpen {
        /// Failures carried over from `Open`.
        failures: u32,
        /// When the circuit last opened.
        since: Instant,
    },
}

/// What the breaker decided to do with an incoming call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Invoke the operation normally.
    Forward,
    /// Invoke the operation as the single half-open trial.
    Trial,
    /// Do not invoke the operation. `retry_after` is the cooldown left, or
    /// zero while another call is the trial.
    Reject {
        /// Remaining cooldown.
        retry_after: Duration,
    },
}

/// The result of a forwarded call, as far as the breaker cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// The operation returned `Success`.
    Success,
    /// The operation returned `Failure`.
    Failure,
}

impl Default for BreakerState {
    fn default() -> Self {
        BreakerState::Closed {
            failures: 0,
            last_failure: None,
        }
    }
}

impl BreakerState {
    /// The state tag.
    pub fn state(&self) -> CircuitState {
        match self {
            BreakerState::Closed { .. } => CircuitState::Closed,
            BreakerState::Open { .. } => CircuitState::Open,
            BreakerState::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }

    /// Failure counter.
    pub fn failures(&self) -> u32 {
        match *self {
            BreakerState::Closed { failures, .. }
            | BreakerState::Open { failures, .. }
            | BreakerState::HalfOpen { failures, .. } => failures,
        }
    }

    /// When the most recent failure was recorded.
    pub fn last_failure_time(&self) -> Option<Instant> {
        match *self {
            BreakerState::Closed { last_failure, .. } => last_failure,
            BreakerState::Open { since, .. } | BreakerState::HalfOpen { since, .. } => Some(since),
        }
    }

    /// Decide whether a call arriving at `now` may proceed.
    ///
    /// An `Open` circuit whose cooldown has elapsed moves to `HalfOpen` and
    /// admits this call as the trial. Any call arriving while `HalfOpen` is
    /// rejected.
    ///
    /// ```rust
    /// use cognee_resilience::{Admission, BreakerState, CircuitState};
    /// use std::time::Duration;
    /// use tokio::time::Instant;
    ///
    /// let opened = Instant::now();
    /// let state = BreakerState::Open { failures: 5, since: opened };
    /// let timeout = Duration::from_secs(60);
    ///
    /// let (state, admission) = state.admit(opened + Duration::from_secs(10), timeout);
    /// assert_eq!(admission, Admission::Reject { retry_after: Duration::from_secs(50) });
    ///
    /// let (state, admission) = state.admit(opened + timeout, timeout);
    /// assert_eq!(admission, Admission::Trial);
    /// assert_eq!(state.state(), CircuitState::HalfOpen);
    /// ```
    pub fn admit(self, now: Instant, timeout: Duration) -> (BreakerState, Admission) {
        match self {
            BreakerState::Closed { .. } => (self, Admission::Forward),
            BreakerState::Open { failures, since } => {
                let elapsed = now.saturating_duration_since(since);
                if elapsed < timeout {
                    (
                        self,
                        Admission::Reject {
                            retry_after: timeout - elapsed,
                        },
                    )
                } else {
                    (BreakerState::HalfOpen { failures, since }, Admission::Trial)
                }
            }
            BreakerState::HalfOpen { .. } => (
                self,
                Admission::Reject {
                    retry_after: Duration::ZERO,
                },
            ),
        }
    }

    /// Fold the result of a forwarded call into the state.
    ///
    /// - `Closed`: success resets the counter; a failure increments it and
    ///   opens the circuit once it reaches `threshold`.
    /// - `HalfOpen`: success closes the circuit; failure reopens it with a
    ///   fresh cooldown.
    /// - `Open`: unchanged.
    ///
    /// ```rust
    /// use cognee_resilience::{BreakerState, CircuitState, Observation};
    /// use tokio::time::Instant;
    ///
    /// let now = Instant::now();
    /// let state = BreakerState::default()
    ///     .record(Observation::Failure, now, 2)
    ///     .record(Observation::Failure, now, 2);
    /// assert_eq!(state.state(), CircuitState::Open);
    /// assert_eq!(state.failures(), 2);
    /// ```
    pub fn record(self, observation: Observation, now: Instant, threshold: u32) -> BreakerState {
        match (self, observation) {
            (BreakerState::Closed { last_failure, .. }, Observation::Success) => {
                BreakerState::Closed {
                    failures: 0,
                    last_failure,
                }
            }
            (BreakerState::Closed { failures, .. }, Observation::Failure) => {
                let failures = failures.saturating_add(1);
                if failures >= threshold {
                    BreakerState::Open {
                        failures,
                        since: now,
                    }
                } else {
                    BreakerState::Closed {
                        failures,
                        last_failure: Some(now),
                    }
                }
            }
            (BreakerState::HalfOpen { since, .. }, Observation::Success) => BreakerState::Closed {
                failures: 0,
                last_failure: Some(since),
            },
            (BreakerState::HalfOpen { failures, .. }, Observation::Failure) => BreakerState::Open {
                failures: failures.saturating_add(1),
                since: now,
            },
            (BreakerState::Open { .. }, _) => self,
        }
    }

    /// Undo a trial admission whose call never completed.
    ///
    /// `HalfOpen` goes back to `Open` with the original `since`, so the
    /// cooldown is already elapsed and the next call becomes the trial.
    pub fn abandon_trial(self) -> BreakerState {
        match self {
            BreakerState::HalfOpen { failures, since } => BreakerState::Open { failures, since },
            other => other,
        }
    }
}
