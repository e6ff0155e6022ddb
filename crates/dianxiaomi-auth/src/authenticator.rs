//! API-key authentication of inbound requests.

use std::sync::Arc;

use dianxiaomi_router::{ApiError, Authenticator, Identity, Request};
use tracing::debug;

use crate::error::{AuthError, Result};
use crate::nonce::{NonceRegistry, REST_ACTION};
use crate::user::{ApiUser, UserDirectory};

/// Header carrying the API key.
pub const KEY_HEADER: &str = "Dianxiaomi-Wp-Key";

/// Query parameter carrying the API key when the header is absent.
pub const KEY_QUERY_PARAM: &str = "key";

/// Header carrying an optional request nonce.
pub const NONCE_HEADER: &str = "X-WP-Nonce";

/// Authenticates requests by API key, and by nonce when one is sent.
pub struct KeyAuthenticator {
    users: UserDirectory,
    nonces: Arc<NonceRegistry>,
}

impl KeyAuthenticator {
    /// Creates an authenticator over `users`, verifying nonces in `nonces`.
    pub fn new(users: UserDirectory, nonces: Arc<NonceRegistry>) -> Self {
        Self { users, nonces }
    }

    /// Returns the nonce registry.
    pub fn nonces(&self) -> &Arc<NonceRegistry> {
        &self.nonces
    }

    /// Resolves the request's user.
    pub fn authenticate_user(&self, request: &Request) -> Result<&ApiUser> {
        let key = request
            .get_header(KEY_HEADER)
            .or_else(|| request.get_query(KEY_QUERY_PARAM))
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(AuthError::MissingKey)?;

        let user = self
            .users
            .find_by_api_key(key)
            .ok_or(AuthError::InvalidKey)?;
        if !user.is_active {
            return Err(AuthError::UserInactive);
        }

        if let Some(nonce) = request.get_header(NONCE_HEADER) {
            self.nonces.verify(nonce.trim(), user.id, REST_ACTION)?;
        }

        debug!(user_id = user.id, login = %user.login, "authenticated request");
        Ok(user)
    }
}

impl Authenticator for KeyAuthenticator {
    fn authenticate(&self, request: &Request) -> std::result::Result<Identity, ApiError> {
        self.authenticate_user(request)
            .map(ApiUser::identity)
            .map_err(ApiError::from)
    }
}
