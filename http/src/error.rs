//! Error types for HTTP calls and token storage

use thiserror::Error;

/// Result type alias for HTTP operations.
pub type Result<T> = std::result::Result<T, HttpError>;

/// Errors returned by a [`Transport`](crate::Transport)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// The request url could not be parsed
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl {
        /// Url after resolution against the base url
        url: String,
        /// Parser message
        reason: String,
    },

    /// The request never produced a response (connection, timeout, body read)
    #[error("Request failed: {0}")]
    Network(String),

    /// The server answered with a status of 400 or above
    #[error("HTTP error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, or the canonical reason when the body is empty
        message: String,
    },

    /// The response body did not match the expected shape
    #[error("Response parsing failed: {0}")]
    Decode(String),

    /// Reading or writing the stored tokens failed
    #[error(transparent)]
    Tokens(#[from] TokenError),
}

impl HttpError {
    /// HTTP status of the failed response, `0` when there was no response
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Status { status, .. } => *status,
            _ => 0,
        }
    }

    /// Whether the server rejected the credentials (401)
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status() == 401
    }
}

/// Errors from token persistence and JWT inspection
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token file could not be read or written
    #[error("Token storage I/O failed: {0}")]
    Io(String),

    /// Stored tokens are not valid JSON
    #[error("Token serialization failed: {0}")]
    Serde(String),

    /// Token is not a decodable JWT
    #[error("Malformed JWT: {0}")]
    MalformedJwt(String),
}

impl From<std::io::Error> for TokenError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for TokenError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serde(error.to_string())
    }
}
