use std::io;

use serde::Deserialize;

use super::encoding::EncodeError;

/// A failed API call, classified by where it went wrong.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The exchange itself failed: connection, body read, request encoding,
    /// or decoding of a response body. The status is set if a response was
    /// received before the failure.
    Transport {
        /// The HTTP status, if one was received.
        status: Option<http::StatusCode>,
        /// The underlying failure.
        #[source]
        source: TransportError,
    },
    /// The service answered with an HTML page instead of structured JSON,
    /// usually from a proxy or load balancer in front of it.
    Upstream(http::StatusCode),
    /// The service reported an error with a message.
    Service {
        /// The HTTP status on the overall response.
        status: http::StatusCode,
        /// The text of the `error` field.
        message: String,
    },
    /// The response was non-2xx and had no body.
    Status(http::StatusCode),
    /// The operation requires a credential, but the client has none.
    Unauthenticated,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Transport {
                status: Some(status),
                source,
            } => write!(f, "{source} ({status})"),
            ApiError::Transport { status: None, source } => write!(f, "{source}"),
            ApiError::Upstream(status) => write!(f, "HTML error page ({status})"),
            ApiError::Service { status, message } => write!(f, "{message} ({status})"),
            ApiError::Status(status) => write!(f, "status code: {}", status.as_u16()),
            ApiError::Unauthenticated => write!(f, "No access token; call exchange first"),
        }
    }
}

/// The cause of an [ApiError::Transport].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP client failed.
    #[error(transparent)]
    Http(#[from] ureq::Error),
    /// Reading the response body failed.
    #[error("Failed to read response body: {0}")]
    Io(#[from] io::Error),
    /// The response body was not the expected JSON.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The request body could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// The request could not be constructed.
    #[error("Invalid request: {0}")]
    Request(#[from] http::Error),
}

impl ApiError {
    pub(crate) fn transport(
        status: Option<http::StatusCode>,
        source: impl Into<TransportError>,
    ) -> Self {
        ApiError::Transport {
            status,
            source: source.into(),
        }
    }

    /// The HTTP status associated with the error, if a response was received.
    pub fn status(&self) -> Option<http::StatusCode> {
        match self {
            ApiError::Transport { status, .. } => *status,
            ApiError::Upstream(status)
            | ApiError::Service { status, .. }
            | ApiError::Status(status) => Some(*status),
            ApiError::Unauthenticated => None,
        }
    }

    /// The message reported by the service, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Service { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl From<EncodeError> for ApiError {
    fn from(e: EncodeError) -> Self {
        ApiError::transport(None, e)
    }
}

/// The body of a failed response.
#[derive(Debug, Deserialize)]
pub(crate) struct RawApiError {
    pub(crate) error: String,
}

/// Panic instead of returning an error.
///
/// Useful in scripts and integration harnesses that would rather fail fast
/// than handle every error.
pub trait OrAbort<T> {
    /// Unwrap the value, or panic with `"<op>: <error>"`.
    fn or_abort(self, op: &str) -> T;
}

impl<T> OrAbort<T> for Result<T, ApiError> {
    #[track_caller]
    fn or_abort(self, op: &str) -> T {
        match self {
            Ok(v) => v,
            Err(e) => panic!("{op}: {e}"),
        }
    }
}
