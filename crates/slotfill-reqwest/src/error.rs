//! Internal error types for slotfill-reqwest.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for slotfill-reqwest operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Internal error type for slotfill-reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The sidecar answered with a non-success status.
    #[error("model server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// The sidecar answered with a body that is not usable.
    #[error("malformed model response: {0}")]
    Malformed(String),
    /// The configured model URL is unusable.
    #[error("invalid model url: {0}")]
    InvalidUrl(String),
}

impl From<Error> for slotfill_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    slotfill_core::Error::timeout()
                        .with_message("model call timed out")
                        .with_source(e)
                } else if e.is_connect() {
                    slotfill_core::Error::network_error()
                        .with_message("connection to model server failed")
                        .with_source(e)
                } else if e.is_decode() {
                    slotfill_core::Error::serialization()
                        .with_message(e.to_string())
                        .with_source(e)
                } else {
                    slotfill_core::Error::network_error()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Serde(e) => slotfill_core::Error::serialization()
                .with_message(e.to_string())
                .with_source(e),
            err @ (Error::Status { .. } | Error::Malformed(_)) => {
                slotfill_core::Error::inference().with_message(err.to_string())
            }
            Error::InvalidUrl(message) => slotfill_core::Error::configuration().with_message(message),
        }
    }
}
