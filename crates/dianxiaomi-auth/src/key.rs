//! API key generation, hashing and verification using Argon2.

use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use password_hash::rand_core::OsRng;

use crate::error::{AuthError, Result};

/// Minimum accepted API key length.
pub const MIN_KEY_LENGTH: usize = 20;

/// Generates a new random API key (40 hex characters).
pub fn generate_api_key() -> String {
    use rand::RngExt;
    let mut rng = rand::rng();
    let mut bytes = [0u8; 20];
    rng.fill(&mut bytes);
    hex::encode(&bytes)
}

/// Hashes an API key using Argon2id.
///
/// Returns a PHC string that includes the salt, suitable for the config file.
pub fn hash_api_key(key: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(key.as_bytes(), &salt)
        .map_err(|_| AuthError::KeyHashError)?;

    Ok(hash.to_string())
}

/// Verifies an API key against a stored hash.
pub fn verify_api_key(key: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(key.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Checks that an API key is long enough and plain ASCII alphanumeric.
pub fn validate_api_key(key: &str) -> Result<()> {
    if key.len() < MIN_KEY_LENGTH {
        return Err(AuthError::Validation(format!(
            "API key must be at least {MIN_KEY_LENGTH} characters long"
        )));
    }

    if !key.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AuthError::Validation(
            "API key may only contain ASCII letters and digits".to_string(),
        ));
    }

    Ok(())
}

pub(crate) mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}
