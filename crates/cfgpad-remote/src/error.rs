use thiserror::Error;

/// Errors raised by [`crate::ConfigClient`].
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The base URL or an endpoint path does not form a valid URL.
    #[error("invalid URL `{url}`: {source}")]
    InvalidUrl {
        /// Offending input.
        url: String,
        /// Parser error.
        source: url::ParseError,
    },
    /// The request could not be sent or its body could not be read.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("{method} {url} failed: {status} {reason}")]
    Status {
        /// Request method.
        method: &'static str,
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase, empty when unknown.
        reason: String,
    },
}

impl RemoteError {
    /// HTTP status of a [`RemoteError::Status`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
