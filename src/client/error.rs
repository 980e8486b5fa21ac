//! Error types for requests against the sidecar.

use thiserror::Error;

use crate::sidecar::error::SidecarError;

/// Result type for request operations.
pub type Result<T> = std::result::Result<T, RequestError>;

/// Errors from a single request round-trip.
///
/// Except for `NotReady`, these are local to one call: the sidecar stays
/// adopted/supervised and a later request may succeed.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The sidecar could not be made ready.
    #[error("Sidecar not ready: {0}")]
    NotReady(#[from] SidecarError),

    /// Network-level failure on the socket (refused, reset, broken pipe).
    #[error("Transport error: {reason}")]
    Transport {
        /// Reason for failure.
        reason: String,
    },

    /// The sidecar answered with a non-success status.
    #[error("Sidecar returned status {status}")]
    Remote {
        /// HTTP status code as received.
        status: u16,
    },

    /// The response body was not valid JSON.
    #[error("Failed to parse response: {reason}")]
    ResponseParse {
        /// Reason for failure.
        reason: String,
    },

    /// The round-trip exceeded the configured request timeout.
    #[error("Request timed out after {timeout:?}")]
    Timeout {
        /// Timeout that elapsed.
        timeout: std::time::Duration,
    },
}
