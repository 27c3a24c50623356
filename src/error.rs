use thiserror::Error;

/// Errors produced by the Quill backend client.
///
/// All variants are owned strings so that a single outcome can be fanned out
/// to every request queued behind an in-flight token refresh.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// No response was received (connection failure, DNS, aborted request).
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded the fixed client timeout.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The session is gone: no refresh token was stored, the refresh was
    /// rejected, or a retried request was rejected again. The stored login
    /// record has already been removed when this is returned.
    #[error("session expired")]
    SessionExpired,

    /// The response body did not match the expected shape.
    #[error("malformed response: {0}")]
    InvalidResponse(String),

    /// The persisted session store could not be written.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
