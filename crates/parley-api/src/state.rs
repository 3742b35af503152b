//! Application state wiring all services together.
//!
//! Services are generic over repository/hasher/token traits; AppState pins
//! them to the concrete infra implementations.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use parley_core::chat::service::{ChatService, GenerationOptions};
use parley_core::llm::box_provider::BoxLlmProvider;
use parley_core::rate_limit::{self, InMemoryStore, Limit, RateLimiter};
use parley_core::service::auth::AuthService;
use parley_core::service::revocation::RevocationList;
use parley_infra::config::AppConfig;
use parley_infra::crypto::hash::Argon2PasswordHasher;
use parley_infra::crypto::token::JwtTokenService;
use parley_infra::llm::{build_fallback_chain, create_provider};
use parley_infra::sqlite::pool::DatabasePool;
use parley_infra::sqlite::user::SqliteUserRepository;

use crate::http::cookie::SessionCookies;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteAuthService = AuthService<SqliteUserRepository, Argon2PasswordHasher, JwtTokenService>;

pub type ConcreteChatService = ChatService<SqliteUserRepository>;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<ConcreteAuthService>,
    pub chat_service: Arc<ConcreteChatService>,
    pub rate_limiter: RateLimiter,
    pub cookies: SessionCookies,
    pub config: Arc<AppConfig>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Connect to the database, build the Gemini provider and wire services.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(&config.database_url, config.settings.database.max_connections)
            .await
            .with_context(|| format!("failed to open database {}", config.database_url))?;

        let attempt_timeout = Duration::from_secs(config.settings.chat.attempt_timeout_secs);
        let provider = create_provider(config.gemini_api_key.clone(), None, attempt_timeout)
            .context("failed to build Gemini provider")?;

        Self::from_parts(config, db_pool, provider)
    }

    /// Wire services from an open pool and an already-built provider.
    pub fn from_parts(
        config: AppConfig,
        db_pool: DatabasePool,
        provider: BoxLlmProvider,
    ) -> anyhow::Result<Self> {
        let settings = &config.settings;

        let chain = build_fallback_chain(provider, &settings.chat).context("invalid chat settings")?;
        let chat_service = ChatService::new(
            SqliteUserRepository::new(db_pool.clone()),
            chain,
            GenerationOptions {
                max_output_tokens: settings.chat.max_output_tokens,
                temperature: Some(settings.chat.temperature),
            },
        );

        let auth_service = AuthService::new(
            SqliteUserRepository::new(db_pool.clone()),
            Argon2PasswordHasher::default(),
            JwtTokenService::new(&config.jwt_secret),
            RevocationList::new(),
            Duration::from_secs(settings.auth.token_ttl_secs),
        );

        let rate_limiter = RateLimiter::new(Arc::new(InMemoryStore::new()))
            .for_(
                rate_limit::AUTH,
                Limit::from(settings.rate_limits.auth)
                    .message("Too many authentication attempts, please try again later"),
            )
            .for_(
                rate_limit::CHAT,
                Limit::from(settings.rate_limits.chat)
                    .message("Too many chat requests, please try again later"),
            )
            .for_(rate_limit::API, Limit::from(settings.rate_limits.api));

        let cookies = SessionCookies::from_config(&config)
            .map_err(|e| anyhow::anyhow!("invalid cookie secret: {e}"))?;

        Ok(Self {
            auth_service: Arc::new(auth_service),
            chat_service: Arc::new(chat_service),
            rate_limiter,
            cookies,
            config: Arc::new(config),
            db_pool,
        })
    }
}
