//! Error types for the WebPark client.
//!
//! # Design
//! One closed taxonomy covers every failure a verb operation can surface:
//! URL validation, request construction, JSON coding, failing HTTP statuses,
//! and errors passed through unchanged from the transport. Coding failures
//! carry serde's diagnostic text. Failing statuses carry both the raw code
//! and its [`ErrorResponseCode`] classification.

use std::fmt;

use thiserror::Error;

use crate::status::ErrorResponseCode;

pub type Result<T, E = WebParkError> = std::result::Result<T, E>;

/// Errors returned by request building and the verb operations.
#[derive(Debug, Error)]
pub enum WebParkError {
    /// The base URL + endpoint did not form a valid `http`/`https` URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request could not be assembled.
    #[error("unable to build request: {0}")]
    RequestBuild(String),

    /// The request payload could not be serialized to JSON.
    #[error("encode failure: {0}")]
    Encode(String),

    /// The response body could not be deserialized into the expected type.
    #[error("decode failure: {0}")]
    Decode(String),

    /// The server answered with a status of 400 or above.
    #[error(transparent)]
    Http(#[from] HttpFailure),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The token service failed to refresh credentials after a 401.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Coarse classification of a [`WebParkError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    RequestBuildFailure,
    EncodeFailure,
    DecodeFailure,
    HttpFailure,
    Transport,
    Auth,
}

impl WebParkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WebParkError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            WebParkError::RequestBuild(_) => ErrorKind::RequestBuildFailure,
            WebParkError::Encode(_) => ErrorKind::EncodeFailure,
            WebParkError::Decode(_) => ErrorKind::DecodeFailure,
            WebParkError::Http(_) => ErrorKind::HttpFailure,
            WebParkError::Transport(_) => ErrorKind::Transport,
            WebParkError::Auth(_) => ErrorKind::Auth,
        }
    }

    /// HTTP status of an `Http` failure.
    pub fn status_code(&self) -> Option<u16> {
        self.http_failure().map(|failure| failure.status_code)
    }

    /// Diagnostic text attached to validation and coding failures.
    pub fn underlying(&self) -> Option<&str> {
        match self {
            WebParkError::InvalidUrl(reason)
            | WebParkError::RequestBuild(reason)
            | WebParkError::Encode(reason)
            | WebParkError::Decode(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn http_failure(&self) -> Option<&HttpFailure> {
        match self {
            WebParkError::Http(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }
}

/// A failing HTTP status together with its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpFailure {
    pub status_code: u16,
    pub kind: ErrorResponseCode,
}

impl HttpFailure {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            kind: ErrorResponseCode::from_status(status_code),
        }
    }
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status_code, self.kind.reason())
    }
}

impl std::error::Error for HttpFailure {}

/// Failures raised by a [`Transport`](crate::transport::Transport) before any
/// status code is available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("{0}")]
    Other(String),
}

/// Failures raised by a [`TokenService`](crate::auth::TokenService).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("not authenticated")]
    NotAuthenticated,
}
