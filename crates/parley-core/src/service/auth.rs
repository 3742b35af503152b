//! Account and session use cases: signup, login, token authentication,
//! logout and refresh.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use parley_types::auth::{IssuedToken, SessionClaims};
use parley_types::error::AuthError;
use parley_types::user::{NewUser, User};

use crate::repository::user::UserRepository;
use crate::service::hash::PasswordHasher;
use crate::service::revocation::RevocationList;
use crate::service::token::TokenService;
use crate::validation::{LoginForm, SignupForm};

/// Hashed once at construction and verified against when the email is
/// unknown, so a failed login costs the same whether or not the account exists.
const DUMMY_PASSWORD: &str = "parley-timing-equalizer";

/// A freshly authenticated user and the token that proves it.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: IssuedToken,
}

/// Orchestrates account creation and session token lifecycle.
///
/// Generic over its ports so parley-core never depends on parley-infra.
/// Password hashing runs on the blocking pool, never on a runtime worker.
pub struct AuthService<R: UserRepository, H: PasswordHasher + 'static, T: TokenService> {
    repo: R,
    hasher: Arc<H>,
    tokens: T,
    revocations: RevocationList,
    token_ttl: Duration,
    dummy_hash: Option<String>,
}

impl<R: UserRepository, H: PasswordHasher + 'static, T: TokenService> AuthService<R, H, T> {
    pub fn new(repo: R, hasher: H, tokens: T, revocations: RevocationList, token_ttl: Duration) -> Self {
        let dummy_hash = hasher
            .hash(DUMMY_PASSWORD)
            .inspect_err(|e| warn!(error = %e, "dummy password hash unavailable"))
            .ok();
        Self {
            repo,
            hasher: Arc::new(hasher),
            tokens,
            revocations,
            token_ttl,
            dummy_hash,
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    pub fn revocations(&self) -> &RevocationList {
        &self.revocations
    }

    /// Validate the form, store the user with a hashed password and issue a token.
    ///
    /// Fails with `DuplicateEmail` when the normalized email is taken.
    pub async fn signup(&self, form: &SignupForm) -> Result<Session, AuthError> {
        let input = form.validate()?;
        let password_hash = self.hash_password(input.password).await?;

        let user = self
            .repo
            .create_user(&NewUser {
                name: input.name,
                email: input.email,
                password_hash,
            })
            .await?;

        let token = self.tokens.issue(&user.id, &user.email, self.token_ttl)?;
        info!(user_id = %user.id, "user signed up");
        Ok(Session { user, token })
    }

    /// Check credentials and issue a token.
    ///
    /// Wrong password and unknown email both fail with `InvalidCredentials`.
    pub async fn login(&self, form: &LoginForm) -> Result<Session, AuthError> {
        let input = form.validate()?;

        let Some(credentials) = self.repo.find_credentials(&input.email).await? else {
            // Without a dummy hash, hashing the input costs about the same as a verify.
            let _ = match &self.dummy_hash {
                Some(dummy) => self.verify_password(input.password, dummy.clone()).await,
                None => self.hash_password(input.password).await.map(|_| false),
            };
            debug!("login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .verify_password(input.password, credentials.password_hash)
            .await?
        {
            debug!(user_id = %credentials.user.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let user = credentials.user;
        let token = self.tokens.issue(&user.id, &user.email, self.token_ttl)?;
        info!(user_id = %user.id, "user logged in");
        Ok(Session { user, token })
    }

    /// Resolve a bearer token to its user.
    ///
    /// Fails with `InvalidOrExpiredToken` for bad signatures, expired or
    /// revoked tokens, and tokens whose user no longer exists.
    pub async fn authenticate(&self, token: &str) -> Result<(User, SessionClaims), AuthError> {
        let claims = self.tokens.verify(token)?;

        if self.revocations.is_revoked(&claims.token_id) {
            debug!(user_id = %claims.user_id, "revoked token presented");
            return Err(AuthError::InvalidOrExpiredToken);
        }

        match self.repo.find_by_id(&claims.user_id).await? {
            Some(user) => Ok((user, claims)),
            None => {
                warn!(user_id = %claims.user_id, "valid token for missing user");
                Err(AuthError::InvalidOrExpiredToken)
            }
        }
    }

    /// Refuse `claims` from now until it would have expired.
    pub fn logout(&self, claims: &SessionClaims) {
        self.revocations.revoke(&claims.token_id, claims.expires_at);
        info!(user_id = %claims.user_id, "user logged out");
    }

    /// Issue a new token for the same identity and revoke the presented one.
    pub fn refresh(&self, user: &User, claims: &SessionClaims) -> Result<IssuedToken, AuthError> {
        let token = self.tokens.issue(&user.id, &user.email, self.token_ttl)?;
        self.revocations.revoke(&claims.token_id, claims.expires_at);
        debug!(user_id = %user.id, "session refreshed");
        Ok(token)
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(format!("hashing task failed: {e}")))?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Hashing(format!("hashing task failed: {e}")))?
    }
}
