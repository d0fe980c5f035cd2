//! Retry with exponential backoff for memory-service operations.
//!
//! - **Pure Core**: [`RetryStrategy`] is just data: no side effects, easily testable
//! - **Explicit**: the default strategy is a [`Default`] value handed to the
//!   executor, never a global
//! - **Fail fast**: only failures whose [`ErrorKind`](crate::ErrorKind) is in the
//!   strategy's retryable set are re-attempted
//!
//! # Quick Start
//!
//! ```rust
//! use cognee_resilience::{with_retry, ErrorKind, Outcome, RetryStrategy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let strategy = RetryStrategy::default()
//!     .with_initial_delay(Duration::from_millis(100))
//!     .with_retryable_errors([ErrorKind::NetworkError]);
//!
//! let outcome = with_retry(|| async { Outcome::success(42) }, &strategy).await;
//! assert_eq!(outcome, Outcome::Success(42));
//! # });
//! ```
//!
//! # Jitter Support
//!
//! Delays are deterministic by default. Enable the `jitter` feature to spread
//! retries of concurrent callers:
//!
//! ```toml
//! cognee-resilience = { version = "...", features = ["jitter"] }
//! ```
//!
//! ```rust,ignore
//! use cognee_resilience::RetryStrategy;
//!
//! // Add ±25% randomness to delays
//! let strategy = RetryStrategy::default().with_jitter(0.25);
//! ```

mod executor;
mod strategy;

pub use executor::{with_retry, with_retry_hooks, with_retry_through};
pub use strategy::{JitterStrategy, RetryEvent, RetryStrategy};
