//! Classification of failing HTTP status codes.

use std::fmt;

/// Named failure statuses, plus a catch-all for everything else.
///
/// Classification is total: any integer status maps to exactly one variant,
/// so building an [`HttpFailure`](crate::error::HttpFailure) can never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorResponseCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    InternalServerError,
    NotImplemented,
    ServiceUnavailable,
    GatewayTimeout,
    UnhandledResponseCode,
}

impl ErrorResponseCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            500 => Self::InternalServerError,
            501 => Self::NotImplemented,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            _ => Self::UnhandledResponseCode,
        }
    }

    /// The status this variant names; `0` for the catch-all.
    pub fn code(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::InternalServerError => 500,
            Self::NotImplemented => 501,
            Self::ServiceUnavailable => 503,
            Self::GatewayTimeout => 504,
            Self::UnhandledResponseCode => 0,
        }
    }

    /// Human-readable reason phrase.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::Conflict => "Conflict",
            Self::InternalServerError => "Internal Server Error",
            Self::NotImplemented => "Not Implemented",
            Self::ServiceUnavailable => "Service Unavailable",
            Self::GatewayTimeout => "Gateway Timeout",
            Self::UnhandledResponseCode => "Unhandled Response Code",
        }
    }

    /// Taxonomy name, as callers and logs refer to it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BadRequest => "badRequest",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "notFound",
            Self::Conflict => "conflict",
            Self::InternalServerError => "internalServerError",
            Self::NotImplemented => "notImplemented",
            Self::ServiceUnavailable => "serviceUnavailable",
            Self::GatewayTimeout => "gatewayTimeout",
            Self::UnhandledResponseCode => "unhandledResponseCode",
        }
    }
}

impl From<u16> for ErrorResponseCode {
    fn from(status: u16) -> Self {
        Self::from_status(status)
    }
}

impl fmt::Display for ErrorResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
