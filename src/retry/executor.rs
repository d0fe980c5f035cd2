//! The retry loop.
//!
//! Operations are supplied as factories (`FnMut() -> Future`): every attempt
//! builds a fresh future, which is the right model for HTTP calls that should
//! be re-issued from scratch rather than replayed.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::breaker::CircuitBreaker;
use crate::error::MemoryError;
use crate::outcome::Outcome;
use crate::retry::{RetryEvent, RetryStrategy};

/// Invoke `operation` until it succeeds, runs out of attempts, or fails with
/// a kind the strategy does not retry.
///
/// The returned outcome is the first success or the last failure, unchanged.
/// Delays are cooperative `tokio::time::sleep`s.
///
/// # Example
///
/// ```rust
/// use cognee_resilience::{with_retry, MemoryError, Outcome, RetryStrategy};
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let calls = AtomicU32::new(0);
/// let strategy = RetryStrategy::default().with_initial_delay(Duration::from_millis(1));
///
/// let outcome = with_retry(
///     || {
///         let n = calls.fetch_add(1, Ordering::SeqCst);
///         async move {
///             if n == 0 {
///                 Outcome::failure(MemoryError::network(Some(502), "bad gateway"))
///             } else {
///                 Outcome::success("graph ready")
///             }
///         }
///     },
///     &strategy,
/// )
/// .await;
///
/// assert_eq!(outcome, Outcome::Success("graph ready"));
/// assert_eq!(calls.load(Ordering::SeqCst), 2);
/// # });
/// ```
pub async fn with_retry<T, F, Fut>(operation: F, strategy: &RetryStrategy) -> Outcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Outcome<T>>,
{
    with_retry_hooks(operation, strategy, |_| {}).await
}

/// [`with_retry`] with a hook for observability.
///
/// `on_retry` runs after every failed attempt, including the final one (then
/// `next_delay` is `None`). The hook is synchronous and should not block; use
/// it for logging or metrics.
///
/// # Example
///
/// ```rust
/// use cognee_resilience::{with_retry_hooks, MemoryError, Outcome, RetryEvent, RetryStrategy};
///
/// # tokio_test::block_on(async {
/// let mut seen = Vec::new();
/// let outcome: Outcome<()> = with_retry_hooks(
///     || async { Outcome::failure(MemoryError::invalid_input("query", "empty")) },
///     &RetryStrategy::default(),
///     |event: &RetryEvent<'_>| seen.push((event.attempt, event.next_delay)),
/// )
/// .await;
///
/// assert!(outcome.is_failure());
/// assert_eq!(seen, vec![(1, None)]);
/// # });
/// ```
pub async fn with_retry_hooks<T, F, Fut, H>(
    mut operation: F,
    strategy: &RetryStrategy,
    mut on_retry: H,
) -> Outcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Outcome<T>>,
    H: FnMut(&RetryEvent<'_>),
{
    let start = Instant::now();
    let mut attempt = 1u32;

    loop {
        let error = match operation().await {
            Outcome::Success(value) => return succeeded(value, attempt),
            Outcome::Failure(error) => error,
        };

        let delay = next_delay(strategy, attempt, &error);
        on_retry(&RetryEvent {
            attempt,
            error: &error,
            next_delay: delay,
            elapsed: start.elapsed(),
        });

        match delay {
            Some(d) => back_off(strategy, &mut attempt, &error, d).await,
            None => return Outcome::Failure(error),
        }
    }
}

/// Retry `operation` with every attempt passing through `breaker`.
///
/// `operation` is only invoked for attempts the breaker admits. An attempt
/// rejected by an open breaker counts as a `network_error` failure, so it is
/// retried (after the usual backoff) when the strategy retries network errors.
///
/// # Example
///
/// ```rust
/// use cognee_resilience::{with_retry_through, BreakerConfig, CircuitBreaker, Outcome, RetryStrategy};
///
/// # tokio_test::block_on(async {
/// let breaker = CircuitBreaker::new(BreakerConfig::default());
/// let outcome = with_retry_through(
///     || async { Outcome::success(3usize) },
///     &RetryStrategy::default(),
///     &breaker,
/// )
/// .await;
/// assert_eq!(outcome, Outcome::Success(3));
/// # });
/// ```
pub async fn with_retry_through<T, F, Fut>(
    mut operation: F,
    strategy: &RetryStrategy,
    breaker: &CircuitBreaker,
) -> Outcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Outcome<T>>,
{
    let mut attempt = 1u32;

    loop {
        let error = match breaker.execute(|| operation()).await {
            Outcome::Success(value) => return succeeded(value, attempt),
            Outcome::Failure(error) => error,
        };

        match next_delay(strategy, attempt, &error) {
            Some(d) => back_off(strategy, &mut attempt, &error, d).await,
            None => return Outcome::Failure(error),
        }
    }
}

fn succeeded<T>(value: T, attempt: u32) -> Outcome<T> {
    if attempt > 1 {
        tracing::debug!(attempt, "operation succeeded after retrying");
    }
    Outcome::Success(value)
}

/// Decide whether failed `attempt` is retried, and after how long.
fn next_delay(strategy: &RetryStrategy, attempt: u32, error: &MemoryError) -> Option<Duration> {
    let kind = error.kind();
    if attempt >= strategy.max_attempts() {
        if strategy.max_attempts() > 1 {
            tracing::warn!(attempts = attempt, %kind, "retry attempts exhausted: {error}");
        }
        None
    } else if !strategy.is_retryable(error) {
        tracing::debug!(attempt, %kind, "failure is not retryable");
        None
    } else {
        strategy.delay_with_jitter(attempt)
    }
}

async fn back_off(strategy: &RetryStrategy, attempt: &mut u32, error: &MemoryError, delay: Duration) {
    tracing::debug!(
        attempt = *attempt,
        max_attempts = strategy.max_attempts(),
        kind = %error.kind(),
        delay_ms = delay.as_millis() as u64,
        "retrying after failure"
    );
    tokio::time::sleep(delay).await;
    *attempt += 1;
}
