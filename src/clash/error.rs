use thiserror::Error;

/// Everything a daemon call can fail with.
#[derive(Debug, Error)]
pub enum ClashError {
    /// The transport never produced a response (refused, DNS, timeout).
    #[error("failed to reach daemon: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// The daemon answered with a non-success status; body kept for
    /// diagnostics.
    #[error("unexpected status code {code}: {body}")]
    BadStatus { code: u16, body: String },

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Mock mode only: the referenced group or member does not exist.
    #[error("{0}")]
    NotFound(String),
}
