//! The two-variant result returned by every memory-service operation
//!
//! Operations in the SDK never surface failures by panicking or by bubbling a
//! transport error up the stack. They return an [`Outcome`], and the caller
//! branches on it before touching a value.
//!
//! # Examples
//!
//! ## Basic usage
//!
//! ```
//! use cognee_resilience::{MemoryError, Outcome};
//!
//! let found: Outcome<u32> = Outcome::success(7);
//! let missing: Outcome<u32> = Outcome::failure(MemoryError::dataset_not_found("notes"));
//!
//! assert!(found.is_success());
//! assert!(missing.is_failure());
//! ```
//!
//! ## Converting from `Result`
//!
//! ```
//! use cognee_resilience::{MemoryError, Outcome};
//!
//! let parsed: Result<u32, MemoryError> = "12".parse::<u32>()
//!     .map_err(|e| MemoryError::invalid_input("top_k", e.to_string()));
//!
//! let outcome = Outcome::from(parsed);
//! assert_eq!(outcome, Outcome::Success(12));
//! ```

use crate::error::MemoryError;

/// Either a value or the error that prevented producing it.
///
/// The error type defaults to [`MemoryError`], which is what the retry
/// executor and circuit breaker consume.
///
/// # Examples
///
/// ```
/// use cognee_resilience::{ErrorKind, MemoryError, Outcome};
///
/// let outcome: Outcome<&str> = Outcome::failure(MemoryError::network(None, "reset"));
///
/// match outcome {
///     Outcome::Success(value) => println!("got {value}"),
///     Outcome::Failure(err) => assert_eq!(err.kind(), ErrorKind::NetworkError),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "an Outcome may be a Failure that should be handled"]
pub enum Outcome<T, E = MemoryError> {
    /// The operation produced a value.
    Success(T),
    /// The operation failed.
    Failure(E),
}

impl<T, E> Outcome<T, E> {
    /// Create a successful outcome
    ///
    /// # Examples
    ///
    /// ```
    /// use cognee_resilience::Outcome;
    ///
    /// let o = Outcome::<i32>::success(42);
    /// assert!(o.is_success());
    /// ```
    #[inline]
    pub fn success(value: T) -> Self {
        Outcome::Success(value)
    }

    /// Create a failed outcome
    ///
    /// # Examples
    ///
    /// ```
    /// use cognee_resilience::{MemoryError, Outcome};
    ///
    /// let o = Outcome::<i32>::failure(MemoryError::unknown("boom"));
    /// assert!(o.is_failure());
    /// ```
    #[inline]
    pub fn failure(error: E) -> Self {
        Outcome::Failure(error)
    }

    /// Create an outcome from a `Result`
    #[inline]
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(error) => Outcome::Failure(error),
        }
    }

    /// Convert this outcome to a `Result`, for use with `?`
    ///
    /// # Examples
    ///
    /// ```
    /// use cognee_resilience::{MemoryError, Outcome};
    ///
    /// fn first_dataset(o: Outcome<Vec<String>>) -> Result<String, MemoryError> {
    ///     let names = o.into_result()?;
    ///     names.into_iter().next().ok_or_else(|| MemoryError::dataset_not_found("<any>"))
    /// }
    ///
    /// assert_eq!(first_dataset(Outcome::success(vec!["a".into()])), Ok("a".to_string()));
    /// ```
    #[inline]
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }

    /// Check if this outcome is a success
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Check if this outcome is a failure
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// The success value, discarding any error
    #[inline]
    pub fn success_value(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    /// The error, discarding any success value
    #[inline]
    pub fn failure_value(self) -> Option<E> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(error) => Some(error),
        }
    }

    /// Borrow the contents
    #[inline]
    pub fn as_ref(&self) -> Outcome<&T, &E> {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Transform the success value if present
    ///
    /// # Examples
    ///
    /// ```
    /// use cognee_resilience::Outcome;
    ///
    /// let o = Outcome::<_>::success(vec![1, 2, 3]).map(|hits| hits.len());
    /// assert_eq!(o, Outcome::Success(3));
    /// ```
    #[inline]
    pub fn map<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Transform the error if present
    #[inline]
    pub fn map_failure<E2, F>(self, f: F) -> Outcome<T, E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(error) => Outcome::Failure(f(error)),
        }
    }

    /// Chain another fallible step after a success
    ///
    /// # Examples
    ///
    /// ```
    /// use cognee_resilience::{MemoryError, Outcome};
    ///
    /// let o = Outcome::<_>::success("  ").and_then(|query: &str| {
    ///     if query.trim().is_empty() {
    ///         Outcome::failure(MemoryError::invalid_input("query", "must not be blank"))
    ///     } else {
    ///         Outcome::success(query.trim().to_string())
    ///     }
    /// });
    /// assert!(o.is_failure());
    /// ```
    #[inline]
    pub fn and_then<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(T) -> Outcome<U, E>,
    {
        match self {
            Outcome::Success(value) => f(value),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }

    /// The success value or a default
    #[inline]
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Outcome::Success(value) => value,
            Outcome::Failure(_) => default,
        }
    }

    /// The success value or one computed from the error
    #[inline]
    pub fn unwrap_or_else<F>(self, f: F) -> T
    where
        F: FnOnce(E) -> T,
    {
        match self {
            Outcome::Success(value) => value,
            Outcome::Failure(error) => f(error),
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        Outcome::from_result(result)
    }
}

impl<T, E> From<Outcome<T, E>> for Result<T, E> {
    fn from(outcome: Outcome<T, E>) -> Self {
        outcome.into_result()
    }
}
