//! Error taxonomy for memory-service operations.
//!
//! Every failed SDK call is described by exactly one [`MemoryError`]. Each
//! variant carries the context that is meaningful for its kind, and
//! [`MemoryError::kind`] projects it onto the field-less [`ErrorKind`] tag that
//! retry policies use for membership tests.
//!
//! # Examples
//!
//! ```
//! use cognee_resilience::{ErrorKind, MemoryError};
//!
//! let err = MemoryError::permission_denied("ds-42", "write");
//! assert_eq!(err.kind(), ErrorKind::PermissionDenied);
//! assert_eq!(err.kind().as_str(), "permission_denied");
//! assert_eq!(err.to_string(), "permission denied: `write` on dataset ds-42");
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// HTTP status conventionally attached to the synthetic open-circuit failure.
pub const SERVICE_UNAVAILABLE: u16 = 503;

const CIRCUIT_OPEN_MESSAGE: &str = "circuit breaker is open, service unavailable";

/// The fixed set of failure classes.
///
/// Wire form is the snake_case tag (`network_error`, `permission_denied`, ...),
/// used by [`Display`](fmt::Display), [`FromStr`] and serde.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ErrorKind {
    /// Credentials were rejected.
    AuthenticationFailed,
    /// The caller lacks a permission on a dataset.
    PermissionDenied,
    /// The referenced dataset does not exist.
    DatasetNotFound,
    /// The service failed while building or updating the knowledge graph.
    ProcessingFailed,
    /// Transport failure or transient service unavailability.
    NetworkError,
    /// Client-side or server-side input validation failed.
    InvalidInput,
    /// The operation needs an organization (tenant) context.
    OrganizationRequired,
    /// Anything the mapper could not classify.
    UnknownError,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::AuthenticationFailed,
        ErrorKind::PermissionDenied,
        ErrorKind::DatasetNotFound,
        ErrorKind::ProcessingFailed,
        ErrorKind::NetworkError,
        ErrorKind::InvalidInput,
        ErrorKind::OrganizationRequired,
        ErrorKind::UnknownError,
    ];

    /// The snake_case tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AuthenticationFailed => "authentication_failed",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::DatasetNotFound => "dataset_not_found",
            ErrorKind::ProcessingFailed => "processing_failed",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::OrganizationRequired => "organization_required",
            ErrorKind::UnknownError => "unknown_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownErrorKind(s.to_string()))
    }
}

/// A classified failure of a memory-service operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// Credentials were rejected.
    #[error("authentication failed: {message}")]
    AuthenticationFailed {
        /// Service or client message.
        message: String,
    },
    /// A permission is missing on a dataset.
    #[error("permission denied: `{permission}` on dataset {dataset_id}")]
    PermissionDenied {
        /// Dataset the caller tried to access.
        dataset_id: String,
        /// The permission that was missing (`read`, `write`, ...).
        permission: String,
    },
    /// The dataset does not exist or is not visible to the caller.
    #[error("dataset not found: {dataset_id}")]
    DatasetNotFound {
        /// Dataset identifier or name.
        dataset_id: String,
    },
    /// Knowledge-graph processing failed on the service.
    #[error("processing failed: {reason}")]
    ProcessingFailed {
        /// Dataset being processed, when known.
        dataset_id: Option<String>,
        /// Failure reason reported by the service.
        reason: String,
    },
    /// Transport failure or transient unavailability.
    #[error("network error{}: {message}", status_suffix(.status))]
    NetworkError {
        /// HTTP status, when a response was received.
        status: Option<u16>,
        /// Transport or service message.
        message: String,
    },
    /// Input validation failed.
    #[error("invalid input `{field}`: {message}")]
    InvalidInput {
        /// Offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },
    /// The call requires an organization context.
    #[error("organization required: {message}")]
    OrganizationRequired {
        /// Explanation for the caller.
        message: String,
    },
    /// Unclassified failure.
    #[error("unknown error: {message}")]
    UnknownError {
        /// Raw message.
        message: String,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl MemoryError {
    /// Create an `authentication_failed` error.
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        MemoryError::AuthenticationFailed {
            message: message.into(),
        }
    }

    /// Create a `permission_denied` error for `dataset_id`.
    pub fn permission_denied(dataset_id: impl Into<String>, permission: impl Into<String>) -> Self {
        MemoryError::PermissionDenied {
            dataset_id: dataset_id.into(),
            permission: permission.into(),
        }
    }

    /// Create a `dataset_not_found` error.
    pub fn dataset_not_found(dataset_id: impl Into<String>) -> Self {
        MemoryError::DatasetNotFound {
            dataset_id: dataset_id.into(),
        }
    }

    /// Create a `processing_failed` error.
    pub fn processing_failed(dataset_id: Option<String>, reason: impl Into<String>) -> Self {
        MemoryError::ProcessingFailed {
            dataset_id,
            reason: reason.into(),
        }
    }

    /// Create a `network_error` with an optional HTTP status.
    pub fn network(status: Option<u16>, message: impl Into<String>) -> Self {
        MemoryError::NetworkError {
            status,
            message: message.into(),
        }
    }

    /// Create an `invalid_input` error for `field`.
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        MemoryError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an `organization_required` error.
    pub fn organization_required(message: impl Into<String>) -> Self {
        MemoryError::OrganizationRequired {
            message: message.into(),
        }
    }

    /// Create an `unknown_error`.
    pub fn unknown(message: impl Into<String>) -> Self {
        MemoryError::UnknownError {
            message: message.into(),
        }
    }

    /// The failure returned by an open circuit breaker instead of calling
    /// the protected operation.
    ///
    /// It is a `network_error` with status 503, so callers can branch on it
    /// exactly like a real outage.
    ///
    /// ```
    /// use cognee_resilience::{ErrorKind, MemoryError};
    /// use std::time::Duration;
    ///
    /// let err = MemoryError::circuit_open(Duration::from_secs(30));
    /// assert_eq!(err.kind(), ErrorKind::NetworkError);
    /// assert_eq!(err.status(), Some(503));
    /// assert!(err.is_circuit_open());
    /// ```
    pub fn circuit_open(retry_after: Duration) -> Self {
        MemoryError::NetworkError {
            status: Some(SERVICE_UNAVAILABLE),
            message: format!("{CIRCUIT_OPEN_MESSAGE} (retry after {retry_after:?})"),
        }
    }

    /// The tag of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MemoryError::AuthenticationFailed { .. } => ErrorKind::AuthenticationFailed,
            MemoryError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            MemoryError::DatasetNotFound { .. } => ErrorKind::DatasetNotFound,
            MemoryError::ProcessingFailed { .. } => ErrorKind::ProcessingFailed,
            MemoryError::NetworkError { .. } => ErrorKind::NetworkError,
            MemoryError::InvalidInput { .. } => ErrorKind::InvalidInput,
            MemoryError::OrganizationRequired { .. } => ErrorKind::OrganizationRequired,
            MemoryError::UnknownError { .. } => ErrorKind::UnknownError,
        }
    }

    /// HTTP status carried by a `network_error`.
    pub fn status(&self) -> Option<u16> {
        match self {
            MemoryError::NetworkError { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether this is the synthetic failure of an open circuit breaker.
    pub fn is_circuit_open(&self) -> bool {
        match self {
            MemoryError::NetworkError {
                status: Some(SERVICE_UNAVAILABLE),
                message,
            } => message.starts_with(CIRCUIT_OPEN_MESSAGE),
            _ => false,
        }
    }
}

/// Invalid retry or breaker configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// `max_attempts` was zero.
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
    /// `max_delay` is shorter than `initial_delay`.
    #[error("max_delay ({max:?}) must not be shorter than initial_delay ({initial:?})")]
    DelayBounds {
        /// Configured initial delay.
        initial: Duration,
        /// Configured cap.
        max: Duration,
    },
    /// `backoff_factor` was below 1 or not finite.
    #[error("backoff_factor must be a finite number >= 1, got {0}")]
    BackoffFactor(f64),
    /// Breaker `threshold` was zero.
    #[error("threshold must be at least 1")]
    ZeroThreshold,
    /// An error-kind tag that is not part of the taxonomy.
    #[error("unknown error kind `{0}`")]
    UnknownErrorKind(String),
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_kind_tags_round_trip_through_from_str() {
        for kind in ErrorKind::ALL {
            assert_eq!(kind.as_str().parse::<ErrorKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_kind_tag_is_rejected() {
        let err = "rate_limited".parse::<ErrorKind>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownErrorKind("rate_limited".to_string()));
        assert_eq!(err.to_string(), "unknown error kind `rate_limited`");
    }

    #[test]
    fn test_kind_matches_variant() {
        let cases = [
            (MemoryError::authentication_failed("bad token"), ErrorKind::AuthenticationFailed),
            (MemoryError::permission_denied("ds", "read"), ErrorKind::PermissionDenied),
            (MemoryError::dataset_not_found("ds"), ErrorKind::DatasetNotFound),
            (MemoryError::processing_failed(None, "boom"), ErrorKind::ProcessingFailed),
            (MemoryError::network(Some(502), "bad gateway"), ErrorKind::NetworkError),
            (MemoryError::invalid_input("name", "empty"), ErrorKind::InvalidInput),
            (MemoryError::organization_required("no tenant"), ErrorKind::OrganizationRequired),
            (MemoryError::unknown("???"), ErrorKind::UnknownError),
        ];
        for (err, kind) in cases {
            assert_eq!(err.kind(), kind);
        }
    }

    #[test]
    fn test_network_error_display_with_and_without_status() {
        assert_eq!(
            MemoryError::network(Some(502), "bad gateway").to_string(),
            "network error (502): bad gateway"
        );
        assert_eq!(
            MemoryError::network(None, "connection refused").to_string(),
            "network error: connection refused"
        );
    }

    #[test]
    fn test_real_503_is_not_circuit_open() {
        let err = MemoryError::network(Some(503), "upstream overloaded");
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_circuit_open());
    }

    #[test]
    fn test_circuit_open_message() {
        let err = MemoryError::circuit_open(Duration::from_millis(250));
        assert!(err.to_string().contains("circuit breaker is open"));
        assert!(err.to_string().contains("250ms"));
    }
}
