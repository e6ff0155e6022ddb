//! The authenticated caller and the authentication seam.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::request::Request;

/// Something an API user is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Read orders, counts and notes.
    ReadOrders,
    /// Edit orders and record shipments.
    EditOrders,
}

/// The caller a request was authenticated as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// User id, `0` for the anonymous caller.
    pub user_id: u64,
    /// User login name.
    pub login: String,
    /// Granted capabilities.
    pub capabilities: Vec<Capability>,
}

impl Identity {
    /// The unauthenticated caller, used for the index route.
    pub fn anonymous() -> Self {
        Self {
            user_id: 0,
            login: String::new(),
            capabilities: Vec::new(),
        }
    }

    /// Returns true if the caller has `capability`.
    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Fails with `code` (401) unless the caller has `capability`.
    pub fn require(
        &self,
        capability: Capability,
        code: &str,
        message: &str,
    ) -> Result<(), ApiError> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(ApiError::unauthorized(code, message))
        }
    }
}

/// Authenticates a request before dispatch.
pub trait Authenticator: Send + Sync {
    /// Returns the caller's identity, or the error to send back.
    fn authenticate(&self, request: &Request) -> Result<Identity, ApiError>;
}
