//! API users and the user directory.

use dianxiaomi_router::{Capability, Identity};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::key::{hash_api_key, validate_api_key, verify_api_key};

/// A user that can call the API with a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiUser {
    /// User id.
    pub id: u64,
    /// Login name.
    pub login: String,
    /// Argon2 hash of the user's API key.
    api_key_hash: String,
    /// Whether the user may authenticate.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Granted capabilities.
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

const fn default_active() -> bool {
    true
}

impl ApiUser {
    /// Creates a user with the given API key.
    ///
    /// The key is validated and hashed.
    pub fn create(
        id: u64,
        login: &str,
        api_key: &str,
        capabilities: Vec<Capability>,
    ) -> Result<Self> {
        validate_api_key(api_key)?;
        let api_key_hash = hash_api_key(api_key)?;

        Ok(Self {
            id,
            login: login.to_string(),
            api_key_hash,
            is_active: true,
            capabilities,
        })
    }

    /// Checks if the given key matches this user's key.
    pub fn check_api_key(&self, key: &str) -> bool {
        verify_api_key(key, &self.api_key_hash)
    }

    /// Replaces this user's API key.
    pub fn set_api_key(&mut self, key: &str) -> Result<()> {
        validate_api_key(key)?;
        self.api_key_hash = hash_api_key(key)?;
        Ok(())
    }

    /// Returns the identity requests from this user run as.
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            login: self.login.clone(),
            capabilities: self.capabilities.clone(),
        }
    }
}

/// The set of known API users.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<ApiUser>,
}

impl UserDirectory {
    /// Creates a directory from a list of users.
    pub fn new(users: Vec<ApiUser>) -> Self {
        Self { users }
    }

    /// Finds a user by id.
    pub fn get(&self, id: u64) -> Option<&ApiUser> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Finds the user whose stored key hash verifies against `key`.
    pub fn find_by_api_key(&self, key: &str) -> Option<&ApiUser> {
        self.users.iter().find(|u| u.check_api_key(key))
    }

    /// Returns the number of users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns true if there are no users.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
