//! Property-based tests for retry and circuit breaking

use cognee_resilience::testing::{error_of_kind, ScriptedOperation};
use cognee_resilience::{
    with_retry, BreakerConfig, CircuitBreaker, CircuitState, ErrorKind, Outcome, RetryStrategy,
};
use proptest::prelude::*;
use std::time::Duration;

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

fn any_kind() -> impl Strategy<Value = ErrorKind> {
    prop::sample::select(ErrorKind::ALL.to_vec())
}

fn any_strategy() -> impl Strategy<Value = RetryStrategy> {
    (1u32..8, 0u64..500, 0u64..5_000, 1.0f64..4.0).prop_map(|(attempts, initial, extra, factor)| {
        RetryStrategy::default()
            .with_max_attempts(attempts)
            .with_initial_delay(Duration::from_millis(initial))
            .with_max_delay(Duration::from_millis(initial + extra))
            .with_backoff_factor(factor)
    })
}

proptest! {
    #[test]
    fn prop_success_calls_once(strategy in any_strategy()) {
        let op = ScriptedOperation::always(Outcome::success(7));
        let outcome = paused_runtime().block_on(with_retry(|| op.call(), &strategy));
        prop_assert_eq!(outcome, Outcome::Success(7));
        prop_assert_eq!(op.calls(), 1);
    }

    #[test]
    fn prop_retryable_failures_use_every_attempt(strategy in any_strategy(), kind in any_kind()) {
        let strategy = strategy.with_retryable_errors([kind]);
        let op = ScriptedOperation::<()>::always(Outcome::failure(error_of_kind(kind)));
        let outcome = paused_runtime().block_on(with_retry(|| op.call(), &strategy));
        prop_assert!(outcome.is_failure());
        prop_assert_eq!(op.calls(), strategy.max_attempts() as usize);
    }

    #[test]
    fn prop_non_retryable_failure_calls_once(strategy in any_strategy(), kind in any_kind()) {
        let strategy = strategy.with_retryable_errors(ErrorKind::ALL.into_iter().filter(|k| *k != kind));
        let op = ScriptedOperation::<()>::always(Outcome::failure(error_of_kind(kind)));
        let outcome = paused_runtime().block_on(with_retry(|| op.call(), &strategy));
        prop_assert_eq!(outcome.failure_value().map(|e| e.kind()), Some(kind));
        prop_assert_eq!(op.calls(), 1);
    }

    #[test]
    fn prop_backoff_is_monotonic_and_capped(strategy in any_strategy()) {
        let delays: Vec<Duration> = (1..strategy.max_attempts())
            .map(|attempt| strategy.delay_for_attempt(attempt).unwrap())
            .collect();
        for pair in delays.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
        for delay in &delays {
            prop_assert!(*delay <= strategy.max_delay());
        }
        prop_assert_eq!(strategy.delay_for_attempt(strategy.max_attempts()), None);
    }

    #[test]
    fn prop_breaker_opens_exactly_at_threshold(threshold in 1u32..10) {
        let breaker = CircuitBreaker::new(BreakerConfig::new(threshold, Duration::from_secs(60)));
        let op = ScriptedOperation::<()>::always(Outcome::failure(error_of_kind(ErrorKind::NetworkError)));
        let rt = paused_runtime();

        for call in 1..=threshold {
            prop_assert_eq!(breaker.state(), CircuitState::Closed);
            let _ = rt.block_on(breaker.execute(|| op.call()));
            prop_assert_eq!(breaker.failure_count(), call);
        }
        prop_assert_eq!(breaker.state(), CircuitState::Open);

        let _ = rt.block_on(breaker.execute(|| op.call()));
        prop_assert_eq!(op.calls(), threshold as usize);
    }

    #[test]
    fn prop_reset_closes_any_breaker(threshold in 1u32..6, failures in 0u32..10) {
        let breaker = CircuitBreaker::new(BreakerConfig::new(threshold, Duration::from_secs(60)));
        let op = ScriptedOperation::<()>::always(Outcome::failure(error_of_kind(ErrorKind::UnknownError)));
        let rt = paused_runtime();
        for _ in 0..failures {
            let _ = rt.block_on(breaker.execute(|| op.call()));
        }

        breaker.reset();
        prop_assert_eq!(breaker.state(), CircuitState::Closed);
        prop_assert_eq!(breaker.failure_count(), 0);
        prop_assert_eq!(breaker.stats().last_failure_time, None);
    }
}
