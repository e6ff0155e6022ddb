//! Error types for routing and dispatch.

use serde::Serialize;
use thiserror::Error;

/// Errors raised while building a route table.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A route pattern is not a valid regular expression.
    #[error("invalid route pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type alias for route table construction.
pub type Result<T> = std::result::Result<T, RouterError>;

/// A client-facing error with a machine code, a message and a status hint.
///
/// Every failure the API can report (dispatch, authentication, handler)
/// ends up as one of these at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// Machine-readable code, e.g. `dianxiaomi_api_no_route`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// HTTP status hint.
    #[serde(skip)]
    pub status: u16,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status,
        }
    }

    /// Creates a 400 error.
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, 400)
    }

    /// Creates a 401 error.
    pub fn unauthorized(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, 401)
    }

    /// Creates a 404 error.
    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, 404)
    }

    /// Creates a 500 error.
    pub fn internal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, 500)
    }
}

/// Errors produced by a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The request verb is not one of the supported methods.
    #[error("unsupported request method: {method}")]
    UnsupportedMethod { method: String },

    /// The matched handler cannot be invoked. This is a registration bug.
    #[error("the handler for the route {route} is invalid")]
    InvalidHandler { route: String },

    /// A required handler parameter has no value and no default.
    #[error("missing parameter {name}")]
    MissingParameter { name: String },

    /// No route and handler matched the path and method.
    #[error("no route was found matching the URL and request method ({method} {path})")]
    NoRoute { method: String, path: String },

    /// The handler itself returned an error. Passed through unchanged.
    #[error(transparent)]
    Handler(ApiError),
}

impl DispatchError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> &str {
        match self {
            Self::UnsupportedMethod { .. } => "dianxiaomi_api_unsupported_method",
            Self::InvalidHandler { .. } => "dianxiaomi_api_invalid_handler",
            Self::MissingParameter { .. } => "dianxiaomi_api_missing_callback_param",
            Self::NoRoute { .. } => "dianxiaomi_api_no_route",
            Self::Handler(err) => &err.code,
        }
    }

    /// Returns the HTTP status hint.
    pub fn status(&self) -> u16 {
        match self {
            Self::UnsupportedMethod { .. } | Self::MissingParameter { .. } => 400,
            Self::NoRoute { .. } => 404,
            Self::InvalidHandler { .. } => 500,
            Self::Handler(err) => err.status,
        }
    }
}

impl From<ApiError> for DispatchError {
    fn from(err: ApiError) -> Self {
        Self::Handler(err)
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Handler(inner) => inner,
            other => Self::new(other.code(), other.to_string(), other.status()),
        }
    }
}
