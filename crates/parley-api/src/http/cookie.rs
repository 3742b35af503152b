//! Signed session cookie transport.
//!
//! The cookie value is `{jwt}.{hex(HMAC-SHA256(cookie_secret, jwt))}`, so a
//! cookie is tamper-evident independently of the token's own signature.
//! Setting and clearing go through one attribute builder; browsers only
//! delete a cookie when path, domain and flags match the ones it was set with.

use std::time::Duration;

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tower_cookies::cookie::SameSite;
use tower_cookies::cookie::time::Duration as CookieDuration;
use tower_cookies::{Cookie, Cookies};

use parley_infra::config::{AppConfig, Environment};

type HmacSha256 = Hmac<Sha256>;

/// Issues, reads and clears the session cookie.
#[derive(Clone)]
pub struct SessionCookies {
    name: String,
    key: HmacSha256,
    environment: Environment,
    domain: Option<String>,
    ttl: Duration,
}

impl SessionCookies {
    pub fn new(
        name: impl Into<String>,
        secret: SecretString,
        environment: Environment,
        domain: Option<String>,
        ttl: Duration,
    ) -> Result<Self, InvalidLength> {
        Ok(Self {
            name: name.into(),
            key: HmacSha256::new_from_slice(secret.expose_secret().as_bytes())?,
            environment,
            domain,
            ttl,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, InvalidLength> {
        Self::new(
            config.settings.auth.cookie_name.clone(),
            config.cookie_secret.clone(),
            config.environment,
            config.cookie_domain.clone(),
            Duration::from_secs(config.settings.auth.token_ttl_secs),
        )
    }

    /// Attach a signed cookie carrying `token`, replacing any previous one.
    pub fn set(&self, cookies: &Cookies, token: &str) {
        let max_age = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let mut cookie = self.build(self.sign(token));
        cookie.set_max_age(CookieDuration::seconds(max_age));
        cookies.add(cookie);
    }

    /// Expire the cookie with the same attributes it was set with.
    pub fn clear(&self, cookies: &Cookies) {
        cookies.add(self.removal());
    }

    /// The verified token carried by the request cookie, if any.
    pub fn read(&self, cookies: &Cookies) -> Option<String> {
        let cookie = cookies.get(&self.name)?;
        self.unsign(cookie.value())
    }

    pub(crate) fn removal(&self) -> Cookie<'static> {
        let mut cookie = self.build(String::new());
        cookie.make_removal();
        cookie
    }

    fn build(&self, value: String) -> Cookie<'static> {
        let production = self.environment.is_production();
        let mut builder = Cookie::build((self.name.clone(), value))
            .path("/")
            .http_only(true)
            .secure(production)
            .same_site(if production { SameSite::None } else { SameSite::Lax });
        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        builder.build()
    }

    pub(crate) fn sign(&self, token: &str) -> String {
        let mut mac = self.key.clone();
        mac.update(token.as_bytes());
        format!("{token}.{}", hex::encode(mac.finalize().into_bytes()))
    }

    /// Split off and check the signature; constant-time comparison.
    pub(crate) fn unsign(&self, value: &str) -> Option<String> {
        let (token, signature) = value.rsplit_once('.')?;
        let signature = hex::decode(signature).ok()?;
        let mut mac = self.key.clone();
        mac.update(token.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(token.to_string())
    }
}

impl std::fmt::Debug for SessionCookies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookies")
            .field("name", &self.name)
            .field("environment", &self.environment)
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}
