//! Timeline error types
//!
//! The timeline has no runtime failure modes of its own; these errors are
//! raised when an event cannot be built from the data it was given.

use crate::timeline::types::EventKind;
use thiserror::Error;

/// Errors raised while constructing timeline events
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    /// Payload variant does not belong to the declared kind
    #[error("Payload of kind {payload} cannot be stored as a {kind} event")]
    PayloadMismatch { kind: EventKind, payload: EventKind },

    /// Mood intensity outside 0..=100
    #[error("Mood intensity must be between 0 and 100, got {0}")]
    InvalidIntensity(i64),

    /// Health sample with impossible values
    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    /// Timestamp outside the representable range
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    /// Unrecognized event kind name
    #[error("Unknown event kind: {0}")]
    UnknownKind(String),
}

/// Result type alias for timeline operations
pub type TimelineResult<T> = Result<T, TimelineError>;
