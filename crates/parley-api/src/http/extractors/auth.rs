//! Session cookie authentication extractor.
//!
//! Reads the signed session cookie, checks its transport signature, then
//! resolves the token to a live user through the auth service.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_cookies::Cookies;

use parley_types::auth::SessionClaims;
use parley_types::user::User;

use crate::http::error::AppError;
use crate::state::AppState;

/// The authenticated caller. Extracting this rejects the request with 401
/// unless it carries a valid, unrevoked session for an existing user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub claims: SessionClaims,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(msg.to_string()))?;

        let token = state
            .cookies
            .read(&cookies)
            .ok_or(AppError::Unauthorized("Authentication required"))?;

        let (user, claims) = state.auth_service.authenticate(&token).await?;
        Ok(AuthUser { user, claims })
    }
}
