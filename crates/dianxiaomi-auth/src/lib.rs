//! # dianxiaomi-auth
//!
//! Authentication for the Dianxiaomi order API.
//!
//! This crate provides:
//! - `ApiUser` with Argon2-hashed API keys
//! - `UserDirectory` for looking users up by key
//! - `NonceRegistry` for CSRF-style request nonces
//! - `KeyAuthenticator`, the [`dianxiaomi_router::Authenticator`] used by the server
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use dianxiaomi_auth::{ApiUser, KeyAuthenticator, NonceRegistry, UserDirectory};
//! use dianxiaomi_router::{Authenticator, Capability, Request};
//!
//! let user = ApiUser::create(1, "shop", "abcdefghij0123456789", vec![Capability::ReadOrders])
//!     .expect("valid key");
//! let auth = KeyAuthenticator::new(UserDirectory::new(vec![user]), Arc::new(NonceRegistry::new()));
//!
//! let request = Request::get("/orders").header("Dianxiaomi-Wp-Key", "abcdefghij0123456789");
//! let identity = auth.authenticate(&request).expect("known key");
//! assert_eq!(identity.login, "shop");
//! ```
//!
//! ## API Keys
//!
//! Keys are hashed with Argon2id before they are stored. The config file
//! only ever holds the PHC hash string produced by [`hash_api_key`].

mod authenticator;
mod error;
mod key;
mod nonce;
mod user;

pub use authenticator::{KeyAuthenticator, KEY_HEADER, KEY_QUERY_PARAM, NONCE_HEADER};
pub use error::{AuthError, Result};
pub use key::{generate_api_key, hash_api_key, validate_api_key, verify_api_key, MIN_KEY_LENGTH};
pub use nonce::{NonceRegistry, REST_ACTION};
pub use user::{ApiUser, UserDirectory};
