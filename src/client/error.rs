//! Transport failure taxonomy.

use thiserror::Error;

/// Failure of a single call to the Confluence API.
///
/// Every variant is surfaced to the caller as an error tool result; none of
/// them terminates the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// DNS failure, refused connection, timeout, or a truncated body.
    #[error("request failed: {0}")]
    NetworkFailed(String),

    /// The request body could not be serialized. No request was sent.
    #[error("failed to marshal request body: {0}")]
    EncodingFailed(String),

    /// The response body was not valid JSON for the expected shape.
    #[error("failed to decode JSON: {0}")]
    DecodeFailed(String),

    /// The server answered with a status of 400 or above.
    #[error("API error (status {status}): {body}")]
    RemoteError {
        /// HTTP status code.
        status: u16,
        /// Response body (possibly capped).
        body: String,
    },
}

impl TransportError {
    /// Classifies a reqwest failure as a network failure.
    pub(crate) fn network(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            "timeout"
        } else if err.is_connect() {
            "connect"
        } else if err.is_body() || err.is_decode() {
            "body"
        } else {
            "request"
        };
        Self::NetworkFailed(format!("{kind}: {err}"))
    }
}
