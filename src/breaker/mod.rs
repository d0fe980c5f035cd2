//! Circuit breaking for calls into a failing dependency.
//!
//! ## Architecture
//!
//! - [`state`] - the state value and its pure transition functions
//! - [`config`] - threshold and cooldown configuration
//! - [`circuit`] - the shared, mutex-guarded [`CircuitBreaker`]
//!
//! ## State machine
//!
//! ```text
//!            failures >= threshold
//!   Closed ------------------------> Open
//!     ^                               |  cooldown elapsed,
//!     | trial succeeds                v  next call is the trial
//!     +-------------------------- HalfOpen
//!                                     |
//!          trial fails: Open again <--+
//! ```

pub mod circuit;
pub mod config;
pub mod state;

pub use circuit::{BreakerStats, CircuitBreaker};
pub use config::BreakerConfig;
pub use state::{Admission, BreakerState, CircuitState, Observation};
