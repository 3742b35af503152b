//! Cryptographic adapters for Parley.
//!
//! - `hash`: Argon2id password hashing
//! - `token`: HS256 JWT session tokens

pub mod hash;
pub mod token;
