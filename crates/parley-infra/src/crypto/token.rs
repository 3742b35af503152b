//! HS256 JWT session tokens.
//!
//! Implements `TokenService` from `parley-core` with `jsonwebtoken`. Claims
//! carry the user id, email, issue and expiry times, and a unique token id
//! used for revocation.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parley_core::service::token::TokenService;
use parley_types::auth::{IssuedToken, SessionClaims};
use parley_types::error::AuthError;
use parley_types::user::UserId;

#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    sub: String,
    email: String,
    iat: i64,
    exp: i64,
    jti: String,
}

/// Stateless token service signing with a process-wide HMAC key.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenService {
    pub fn new(secret: &SecretString) -> Self {
        let key = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(key),
            decoding_key: DecodingKey::from_secret(key),
            validation,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: &UserId, email: &str, ttl: Duration) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| AuthError::Token(e.to_string()))?;
        let expires_at = now + ttl;
        let token_id = Uuid::now_v7().to_string();

        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: token_id.clone(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Token(e.to_string()))?;

        Ok(IssuedToken {
            token,
            claims: SessionClaims {
                user_id: *user_id,
                email: email.to_string(),
                token_id,
                issued_at: timestamp(claims.iat)?,
                expires_at: timestamp(claims.exp)?,
            },
        })
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                if matches!(e.kind(), ErrorKind::ExpiredSignature) {
                    tracing::debug!("expired session token");
                }
                AuthError::InvalidOrExpiredToken
            })?;
        let claims = data.claims;

        let user_id: UserId = claims
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidOrExpiredToken)?;

        Ok(SessionClaims {
            user_id,
            email: claims.email,
            token_id: claims.jti,
            issued_at: timestamp(claims.iat)?,
            expires_at: timestamp(claims.exp)?,
        })
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, AuthError> {
    DateTime::from_timestamp(secs, 0).ok_or(AuthError::InvalidOrExpiredToken)
}
