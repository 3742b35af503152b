//! TokenService trait for signed, time-bound session tokens.
//!
//! The HS256 JWT adapter lives in parley-infra.

use std::time::Duration;

use parley_types::auth::{IssuedToken, SessionClaims};
use parley_types::error::AuthError;
use parley_types::user::UserId;

/// Issues and verifies stateless session tokens.
///
/// Verification never touches storage; revocation is layered on top by
/// [`RevocationList`](super::revocation::RevocationList).
pub trait TokenService: Send + Sync {
    /// Mint a token binding `user_id` and `email`, valid for `ttl`.
    fn issue(&self, user_id: &UserId, email: &str, ttl: Duration) -> Result<IssuedToken, AuthError>;

    /// Check signature and expiry. Any failure is `AuthError::InvalidOrExpiredToken`.
    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError>;
}
