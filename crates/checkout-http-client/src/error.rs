//! Transport errors

use thiserror::Error;

/// Failure to exchange a request with the store.
///
/// A response with an error status is not a failure at this level; it is
/// returned as a [`RawResponse`](crate::RawResponse) so its headers can be
/// read. [`HttpError::Status`] exists for callers that turn a refused status
/// into an error themselves.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Store refused the request
    #[error("Store returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },
    /// Store could not be reached
    #[error("Could not reach store: {0}")]
    Connection(String),
    /// No answer within the configured timeout
    #[error("Store did not answer in time")]
    Timeout,
    /// Body could not be read or decoded
    #[error("Unreadable body: {0}")]
    Serialization(String),
    /// Proxy url rejected
    #[error("Invalid proxy: {0}")]
    Proxy(String),
    /// Client could not be built
    #[error("Could not build http client: {0}")]
    Build(String),
    /// Anything else reported by the transport
    #[error("{0}")]
    Other(String),
}

impl HttpError {
    /// Status the store answered with, if it answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The request never got an answer
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout)
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        let message = err.to_string();
        match err.status() {
            _ if err.is_timeout() => Self::Timeout,
            _ if err.is_connect() => Self::Connection(message),
            _ if err.is_builder() => Self::Build(message),
            _ if err.is_decode() || err.is_body() => Self::Serialization(message),
            Some(status) => Self::Status {
                status: status.as_u16(),
                message,
            },
            None => Self::Other(message),
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
