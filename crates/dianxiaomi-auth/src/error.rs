//! Error types for authentication.

use dianxiaomi_router::ApiError;
use thiserror::Error;

/// Authentication-specific errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The request carried no API key.
    #[error("Dianxiaomi API Key is missing")]
    MissingKey,

    /// No user matches the API key.
    #[error("Dianxiaomi API Key is invalid")]
    InvalidKey,

    /// The matched user is disabled.
    #[error("user account is inactive")]
    UserInactive,

    /// The nonce is unknown or was issued for another user or action.
    #[error("invalid nonce")]
    InvalidNonce,

    /// The nonce is past its lifetime.
    #[error("nonce has expired")]
    ExpiredNonce,

    /// API key hashing error.
    #[error("API key hashing error")]
    KeyHashError,

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::MissingKey | AuthError::InvalidKey | AuthError::UserInactive => {
                Self::unauthorized("dianxiaomi_api_authentication_error", message)
            }
            AuthError::InvalidNonce | AuthError::ExpiredNonce => {
                Self::new("dianxiaomi_api_invalid_nonce", message, 403)
            }
            AuthError::KeyHashError => Self::internal("dianxiaomi_api_authentication_error", message),
            AuthError::Validation(_) => Self::bad_request("dianxiaomi_api_invalid_api_key", message),
        }
    }
}
