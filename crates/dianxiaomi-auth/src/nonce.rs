//! CSRF-style request nonces.
//!
//! A nonce is issued for a (user, action) pair and stays valid until it
//! expires. Verification checks both the pair and the expiry.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::error::{AuthError, Result};
use crate::key::hex;

/// The action REST requests are checked against.
pub const REST_ACTION: &str = "wp_rest";

#[derive(Debug, Clone)]
struct NonceEntry {
    user_id: u64,
    action: String,
    expire_date: DateTime<Utc>,
}

impl NonceEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expire_date
    }
}

/// Issues and verifies nonces.
#[derive(Debug)]
pub struct NonceRegistry {
    entries: Mutex<HashMap<String, NonceEntry>>,
    lifetime: Duration,
}

impl Default for NonceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NonceRegistry {
    /// Default nonce lifetime (1 day).
    pub const DEFAULT_LIFETIME_HOURS: i64 = 24;

    /// Creates a registry with the default lifetime.
    pub fn new() -> Self {
        Self::with_lifetime(Duration::hours(Self::DEFAULT_LIFETIME_HOURS))
    }

    /// Creates a registry whose nonces live for `lifetime`.
    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            lifetime,
        }
    }

    /// Issues a new nonce for `user_id` and `action`.
    pub fn issue(&self, user_id: u64, action: &str) -> String {
        let nonce = generate_nonce();
        self.lock().insert(
            nonce.clone(),
            NonceEntry {
                user_id,
                action: action.to_string(),
                expire_date: Utc::now() + self.lifetime,
            },
        );
        nonce
    }

    /// Verifies a nonce for `user_id` and `action`.
    ///
    /// An expired nonce is removed.
    pub fn verify(&self, nonce: &str, user_id: u64, action: &str) -> Result<()> {
        let mut entries = self.lock();
        let entry = entries.get(nonce).ok_or(AuthError::InvalidNonce)?;

        if entry.is_expired(Utc::now()) {
            entries.remove(nonce);
            return Err(AuthError::ExpiredNonce);
        }
        if entry.user_id != user_id || entry.action != action {
            return Err(AuthError::InvalidNonce);
        }
        Ok(())
    }

    /// Removes expired nonces and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no nonces are tracked.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, NonceEntry>> {
        // Entries stay consistent even if a holder panicked.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn generate_nonce() -> String {
    use rand::RngExt;
    let mut rng = rand::rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    hex::encode(&bytes)
}
