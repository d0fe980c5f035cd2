//! Testing utilities for code built on [`Outcome`], retry and circuit breaking
//!
//! This module provides a scripted operation double that counts and timestamps
//! its invocations, assertion macros for outcomes, and (behind the `proptest`
//! feature) property-based generators for error kinds.
//!
//! # Examples
//!
//! ## ScriptedOperation
//!
//! ```rust
//! use cognee_resilience::testing::ScriptedOperation;
//! use cognee_resilience::{with_retry, MemoryError, Outcome, RetryStrategy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let op = ScriptedOperation::new([
//!     Outcome::failure(MemoryError::network(None, "reset")),
//!     Outcome::success("ok"),
//! ]);
//!
//! let strategy = RetryStrategy::default().with_initial_delay(Duration::from_millis(1));
//! let outcome = with_retry(|| op.call(), &strategy).await;
//!
//! assert_eq!(outcome, Outcome::Success("ok"));
//! assert_eq!(op.calls(), 2);
//! # });
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use cognee_resilience::{assert_failure_kind, assert_success, ErrorKind, MemoryError, Outcome};
//!
//! assert_success!(Outcome::<_>::success(42));
//! assert_failure_kind!(
//!     Outcome::<()>::failure(MemoryError::dataset_not_found("x")),
//!     ErrorKind::DatasetNotFound
//! );
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};
use tokio::time::Instant;

use crate::error::{ErrorKind, MemoryError};
use crate::outcome::Outcome;

/// A stand-in for a remote call that replays scripted outcomes.
///
/// Each [`call`](Self::call) pops the next outcome; once the script runs out
/// the last outcome is repeated. Clones share the same script and counters,
/// so a clone can be moved into an operation closure while the original is
/// kept for assertions.
#[derive(Debug, Clone)]
pub struct ScriptedOperation<T> {
    inner: Arc<Mutex<Script<T>>>,
}

#[derive(Debug)]
struct Script<T> {
    pending: VecDeque<Outcome<T>>,
    last: Option<Outcome<T>>,
    calls: Vec<Instant>,
}

impl<T> ScriptedOperation<T>
where
    T: Clone + Send + 'static,
{
    /// Create an operation that yields `script` in order.
    pub fn new(script: impl IntoIterator<Item = Outcome<T>>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Script {
                pending: script.into_iter().collect(),
                last: None,
                calls: Vec::new(),
            })),
        }
    }

    /// Create an operation that always yields `outcome`.
    pub fn always(outcome: Outcome<T>) -> Self {
        Self::new([outcome])
    }

    /// Append an outcome to the script.
    pub fn push(&self, outcome: Outcome<T>) {
        self.lock().pending.push_back(outcome);
    }

    /// Invoke the operation once.
    pub fn call(&self) -> BoxFuture<'static, Outcome<T>> {
        let outcome = {
            let mut script = self.lock();
            script.calls.push(Instant::now());
            match script.pending.pop_front() {
                Some(next) => {
                    script.last = Some(next.clone());
                    next
                }
                None => script.last.clone().unwrap_or_else(|| {
                    Outcome::failure(MemoryError::unknown("scripted operation has no outcomes"))
                }),
            }
        };
        future::ready(outcome).boxed()
    }

    /// How many times the operation has been invoked.
    pub fn calls(&self) -> usize {
        self.lock().calls.len()
    }

    /// When each invocation happened.
    pub fn call_times(&self) -> Vec<Instant> {
        self.lock().calls.clone()
    }

    /// Time elapsed between consecutive invocations.
    pub fn gaps(&self) -> Vec<Duration> {
        self.lock()
            .calls
            .windows(2)
            .map(|pair| pair[1].duration_since(pair[0]))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Script<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A representative error of the given kind.
///
/// ```rust
/// use cognee_resilience::testing::error_of_kind;
/// use cognee_resilience::ErrorKind;
///
/// for kind in ErrorKind::ALL {
///     assert_eq!(error_of_kind(kind).kind(), kind);
/// }
/// ```
pub fn error_of_kind(kind: ErrorKind) -> MemoryError {
    match kind {
        ErrorKind::AuthenticationFailed => MemoryError::authentication_failed("invalid token"),
        ErrorKind::PermissionDenied => MemoryError::permission_denied("test-dataset", "read"),
        ErrorKind::DatasetNotFound => MemoryError::dataset_not_found("test-dataset"),
        ErrorKind::ProcessingFailed => {
            MemoryError::processing_failed(Some("test-dataset".to_string()), "pipeline crashed")
        }
        ErrorKind::NetworkError => MemoryError::network(Some(502), "bad gateway"),
        ErrorKind::InvalidInput => MemoryError::invalid_input("query", "must not be empty"),
        ErrorKind::OrganizationRequired => {
            MemoryError::organization_required("no organization selected")
        }
        ErrorKind::UnknownError => MemoryError::unknown("unexpected response"),
    }
}

/// Assert that an outcome succeeded.
///
/// This macro will panic if the outcome is a `Failure`.
#[macro_export]
macro_rules! assert_success {
    ($outcome:expr) => {
        match $outcome {
            $crate::Outcome::Success(_) => {}
            $crate::Outcome::Failure(e) => {
                panic!("Expected Success, got Failure: {:?}", e);
            }
        }
    };
}

/// Assert that an outcome failed.
///
/// This macro will panic if the outcome is a `Success`.
#[macro_export]
macro_rules! assert_failure {
    ($outcome:expr) => {
        match $outcome {
            $crate::Outcome::Failure(_) => {}
            $crate::Outcome::Success(v) => {
                panic!("Expected Failure, got Success: {:?}", v);
            }
        }
    };
}

/// Assert that an outcome failed with a specific [`ErrorKind`](crate::ErrorKind).
#[macro_export]
macro_rules! assert_failure_kind {
    ($outcome:expr, $kind:expr) => {
        match $outcome {
            $crate::Outcome::Failure(e) => {
                assert_eq!(e.kind(), $kind, "unexpected failure: {}", e);
            }
            $crate::Outcome::Success(v) => {
                panic!("Expected Failure of kind {}, got Success: {:?}", $kind, v);
            }
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl Arbitrary for ErrorKind {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        proptest::sample::select(ErrorKind::ALL.to_vec()).boxed()
    }
}

/// Generate representative errors across every kind.
#[cfg(feature = "proptest")]
pub fn arb_memory_error() -> impl Strategy<Value = MemoryError> {
    any::<ErrorKind>().prop_map(error_of_kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_operation_replays_in_order() {
        let op = ScriptedOperation::new([
            Outcome::failure(error_of_kind(ErrorKind::NetworkError)),
            Outcome::success(1),
            Outcome::success(2),
        ]);

        assert!(op.call().await.is_failure());
        assert_eq!(op.call().await, Outcome::Success(1));
        assert_eq!(op.call().await, Outcome::Success(2));
        assert_eq!(op.calls(), 3);
    }

    #[tokio::test]
    async fn scripted_operation_repeats_last_outcome() {
        let op = ScriptedOperation::always(Outcome::success("same"));
        for _ in 0..4 {
            assert_eq!(op.call().await, Outcome::Success("same"));
        }
        assert_eq!(op.calls(), 4);
    }

    #[tokio::test]
    async fn empty_script_fails() {
        let op = ScriptedOperation::<()>::new([]);
        assert_failure_kind!(op.call().await, ErrorKind::UnknownError);
    }

    #[tokio::test]
    async fn clones_share_counters() {
        let op = ScriptedOperation::always(Outcome::success(()));
        let clone = op.clone();
        let _ = clone.call().await;
        op.push(Outcome::failure(error_of_kind(ErrorKind::InvalidInput)));
        assert_failure!(clone.call().await);
        assert_eq!(op.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn gaps_measure_virtual_time() {
        let op = ScriptedOperation::always(Outcome::success(()));
        let _ = op.call().await;
        tokio::time::advance(Duration::from_millis(250)).await;
        let _ = op.call().await;
        assert_eq!(op.gaps(), vec![Duration::from_millis(250)]);
    }

    #[test]
    fn error_of_kind_covers_every_kind() {
        for kind in ErrorKind::ALL {
            assert_eq!(error_of_kind(kind).kind(), kind);
        }
    }

    #[test]
    #[should_panic(expected = "Expected Success, got Failure")]
    fn assert_success_panics_on_failure() {
        assert_success!(Outcome::<i32>::failure(MemoryError::unknown("x")));
    }

    #[test]
    #[should_panic(expected = "Expected Failure, got Success")]
    fn assert_failure_panics_on_success() {
        assert_failure!(Outcome::<_>::success(42));
    }

    #[test]
    #[should_panic(expected = "unexpected failure")]
    fn assert_failure_kind_panics_on_other_kind() {
        assert_failure_kind!(
            Outcome::<()>::failure(MemoryError::unknown("x")),
            ErrorKind::NetworkError
        );
    }

    #[cfg(feature = "proptest")]
    mod proptest_tests {
        use super::*;

        proptest! {
            #[test]
            fn arbitrary_errors_keep_their_kind(err in arb_memory_error()) {
                prop_assert_eq!(error_of_kind(err.kind()), err);
            }
        }
    }
}
