//! PasswordHasher trait for one-way password storage.
//!
//! Defined in parley-core so the auth service can hash and verify passwords
//! without coupling to a specific algorithm. The `Argon2PasswordHasher`
//! adapter lives in parley-infra.

use parley_types::error::AuthError;

/// Abstraction over salted, one-way password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing string (salt included).
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Check a plaintext password against a stored hash.
    ///
    /// `Ok(false)` means the password does not match; `Err` means the stored
    /// hash could not be processed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}
