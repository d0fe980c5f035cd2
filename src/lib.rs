//! # cognee-resilience
//!
//! Retry and circuit-breaker core for a knowledge-graph memory service client.
//!
//! Every SDK operation reports its result as an [`Outcome`]: either a value or
//! a classified [`MemoryError`]. On top of that convention this crate provides:
//!
//! - [`with_retry`]: bounded exponential backoff, retrying only the error
//!   kinds a [`RetryStrategy`] names
//! - [`CircuitBreaker`]: a shared Closed / Open / HalfOpen breaker that stops
//!   forwarding calls to a dependency that keeps failing
//! - [`with_retry_through`]: both at once, every attempt passing the breaker
//! - [`map_transport_error`]: classification of what the HTTP client saw into
//!   the [`ErrorKind`] taxonomy
//!
//! ## Quick Example
//!
//! ```rust
//! use cognee_resilience::prelude::*;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let strategy = RetryStrategy::default().with_initial_delay(Duration::from_millis(5));
//! let breaker = CircuitBreaker::new(BreakerConfig::new(3, Duration::from_secs(30)));
//!
//! let outcome: Outcome<Vec<&str>> = with_retry_through(
//!     || async { Outcome::success(vec!["Alan Turing", "Enigma"]) },
//!     &strategy,
//!     &breaker,
//! )
//! .await;
//!
//! match outcome {
//!     Outcome::Success(nodes) => assert_eq!(nodes.len(), 2),
//!     Outcome::Failure(err) => panic!("search failed: {err}"),
//! }
//! assert_eq!(breaker.state(), CircuitState::Closed);
//! # });
//! ```
//!
//! ## Logging
//!
//! Retry and breaker decisions are emitted as [`tracing`] events. The crate
//! never installs a subscriber.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod breaker;
pub mod error;
pub mod mapper;
pub mod outcome;
pub mod retry;
#[cfg(feature = "serde")]
mod serde_impl;
pub mod testing;

// Re-exports
pub use breaker::{
    Admission, BreakerConfig, BreakerState, BreakerStats, CircuitBreaker, CircuitState,
    Observation,
};
pub use error::{ConfigError, ErrorKind, MemoryError, SERVICE_UNAVAILABLE};
pub use mapper::{into_outcome, map_transport_error, RequestContext, TransportError};
pub use outcome::Outcome;
pub use retry::{
    with_retry, with_retry_hooks, with_retry_through, JitterStrategy, RetryEvent, RetryStrategy,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::breaker::{BreakerConfig, CircuitBreaker, CircuitState};
    pub use crate::error::{ErrorKind, MemoryError};
    pub use crate::mapper::{into_outcome, RequestContext, TransportError};
    pub use crate::outcome::Outcome;
    pub use crate::retry::{with_retry, with_retry_through, RetryStrategy};
}
