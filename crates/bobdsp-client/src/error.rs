//! Error types for the BobDSP client.

use bobdsp_types::ProtocolError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the host.
///
/// The poll loops do not distinguish between variants: any of them resets the
/// lane and schedules a resync.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The configured base URL could not be used.
    #[error("Invalid host URL: {0}")]
    InvalidUrl(String),

    /// HTTP request failed.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Host answered with a non-success status.
    #[error("Server error ({status}): {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// Body was not the JSON document expected.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Body parsed but failed validation.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// No response within the allotted window.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The last control update batch could not be delivered.
    #[error("Control update failed: {0}")]
    SendFailed(String),
}
