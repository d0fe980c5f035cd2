//! Classification of transport and service failures into [`MemoryError`].
//!
//! The crate ships no HTTP client. Whatever client the SDK uses reports what
//! it observed as a [`TransportError`], and [`map_transport_error`] turns that
//! into the taxonomy, using the [`RequestContext`] of the call to fill in the
//! dataset and permission details a bare status code cannot carry.
//!
//! | Observation | Kind |
//! |---|---|
//! | connect failure | `network_error` (no status) |
//! | timeout | `network_error` (408) |
//! | 401 | `authentication_failed` |
//! | 403 | `permission_denied` |
//! | 404 | `dataset_not_found` when the call names a dataset, else `unknown_error` |
//! | 400, 422 | `invalid_input` |
//! | 408, 429, 502, 503, 504 | `network_error` |
//! | other 5xx | `processing_failed` for processing calls, else `network_error` |
//! | undecodable body, anything else | `unknown_error` |
//!
//! # Example
//!
//! ```
//! use cognee_resilience::{map_transport_error, ErrorKind, RequestContext, TransportError};
//!
//! let ctx = RequestContext::for_dataset("ds-1").with_permission("write");
//! let err = map_transport_error(
//!     TransportError::Status { status: 403, body: String::new() },
//!     &ctx,
//! );
//! assert_eq!(err.kind(), ErrorKind::PermissionDenied);
//! assert_eq!(err.to_string(), "permission denied: `write` on dataset ds-1");
//! ```

use std::time::Duration;

use crate::error::MemoryError;
use crate::outcome::Outcome;

const REQUEST_TIMEOUT: u16 = 408;
const UNKNOWN: &str = "unknown";

/// What the HTTP client observed when a call did not produce a usable response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("failed to connect to {url}")]
    Connect {
        /// Target of the request.
        url: String,
    },
    /// No response arrived in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body, possibly empty.
        body: String,
    },
    /// A success response whose body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Call details used to enrich a classified failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    dataset_id: Option<String>,
    permission: Option<String>,
    field: Option<String>,
    processing: bool,
}

impl RequestContext {
    /// A context with no details.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context for a call that targets `dataset_id`.
    pub fn for_dataset(dataset_id: impl Into<String>) -> Self {
        Self {
            dataset_id: Some(dataset_id.into()),
            ..Self::default()
        }
    }

    /// Record the permission the call needs (`read`, `write`, ...).
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    /// Record the input field validation errors should point at.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Mark the call as one that triggers knowledge-graph processing.
    pub fn processing(mut self) -> Self {
        self.processing = true;
        self
    }

    /// Dataset the call targets.
    pub fn dataset_id(&self) -> Option<&str> {
        self.dataset_id.as_deref()
    }

    /// Permission the call needs.
    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    /// Whether the call triggers processing.
    pub fn is_processing(&self) -> bool {
        self.processing
    }
}

/// Classify a transport failure.
pub fn map_transport_error(err: TransportError, ctx: &RequestContext) -> MemoryError {
    let mapped = match err {
        TransportError::Connect { ref url } => {
            MemoryError::network(None, format!("failed to connect to {url}"))
        }
        TransportError::Timeout(after) => MemoryError::network(
            Some(REQUEST_TIMEOUT),
            format!("request timed out after {after:?}"),
        ),
        TransportError::Status { status, ref body } => map_status(status, body, ctx),
        TransportError::Decode(ref message) => {
            MemoryError::unknown(format!("failed to decode response: {message}"))
        }
    };
    tracing::debug!(%err, kind = %mapped.kind(), "classified transport failure");
    mapped
}

fn map_status(status: u16, body: &str, ctx: &RequestContext) -> MemoryError {
    let message = body_message(body).unwrap_or_else(|| format!("HTTP {status}"));
    let dataset = || ctx.dataset_id.clone().unwrap_or_else(|| UNKNOWN.to_string());

    match status {
        401 => MemoryError::authentication_failed(message),
        403 => MemoryError::permission_denied(
            dataset(),
            ctx.permission.as_deref().unwrap_or(UNKNOWN),
        ),
        404 => match &ctx.dataset_id {
            Some(id) => MemoryError::dataset_not_found(id.clone()),
            None => MemoryError::unknown(message),
        },
        400 | 422 => {
            MemoryError::invalid_input(ctx.field.as_deref().unwrap_or("request"), message)
        }
        408 | 429 | 502 | 503 | 504 => MemoryError::network(Some(status), message),
        500..=599 if ctx.processing => {
            MemoryError::processing_failed(ctx.dataset_id.clone(), message)
        }
        500..=599 => MemoryError::network(Some(status), message),
        _ => MemoryError::unknown(message),
    }
}

/// Pull a human-readable message out of an error body.
///
/// JSON bodies are searched for `detail`, `message` and `error` string
/// fields; anything else is used verbatim when non-empty.
fn body_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    if let Ok(serde_json::Value::Object(fields)) = serde_json::from_str(body) {
        let found = ["detail", "message", "error"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(serde_json::Value::as_str));
        if let Some(text) = found {
            return Some(text.to_string());
        }
    }
    Some(body.to_string())
}

/// Convert a client result into an [`Outcome`], classifying any failure.
///
/// ```
/// use cognee_resilience::{into_outcome, Outcome, RequestContext, TransportError};
///
/// let ok: Result<u32, TransportError> = Ok(7);
/// assert_eq!(into_outcome(ok, &RequestContext::new()), Outcome::Success(7));
/// ```
pub fn into_outcome<T>(result: Result<T, TransportError>, ctx: &RequestContext) -> Outcome<T> {
    match result {
        Ok(value) => Outcome::Success(value),
        Err(err) => Outcome::Failure(map_transport_error(err, ctx)),
    }
}
