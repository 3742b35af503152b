//! Tunable settings for the Parley server.
//!
//! `Settings` represents the optional `parley.toml` file. Every field has a
//! default so an absent file (or an empty one) yields a working server.
//! Secrets never live here; they come from the environment.

use serde::{Deserialize, Serialize};

/// Top-level settings, one section per concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub rate_limits: RateLimitSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Take the client address from the first `X-Forwarded-For` hop.
    #[serde(default)]
    pub trust_proxy: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            trust_proxy: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Upper bound on concurrent reader connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    8
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Session token lifetime; also the cookie `Max-Age`.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

fn default_token_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_cookie_name() -> String {
    "auth_token".to_string()
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_ttl_secs: default_token_ttl_secs(),
            cookie_name: default_cookie_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    #[serde(default = "default_primary_model")]
    pub primary_model: String,
    /// Tried in order after the primary reports the model as unavailable.
    #[serde(default = "default_fallback_models")]
    pub fallback_models: Vec<String>,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,
}

fn default_primary_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_fallback_models() -> Vec<String> {
    vec!["gemini-2.0-flash".to_string(), "gemini-1.5-flash".to_string()]
}

fn default_max_output_tokens() -> u32 {
    1000
}

fn default_temperature() -> f64 {
    0.7
}

fn default_attempt_timeout_secs() -> u64 {
    30
}

impl ChatSettings {
    /// Primary model followed by the fallbacks, duplicates removed.
    pub fn model_chain(&self) -> Vec<String> {
        let mut chain: Vec<String> = Vec::with_capacity(1 + self.fallback_models.len());
        for model in std::iter::once(&self.primary_model).chain(self.fallback_models.iter()) {
            let model = model.trim();
            if !model.is_empty() && !chain.iter().any(|m| m == model) {
                chain.push(model.to_string());
            }
        }
        chain
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            primary_model: default_primary_model(),
            fallback_models: default_fallback_models(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
        }
    }
}

/// A fixed-window budget: at most `max_requests` per `window_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowLimit {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl WindowLimit {
    pub const fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
        }
    }
}

const FIFTEEN_MINUTES: u64 = 15 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_auth_limit")]
    pub auth: WindowLimit,
    #[serde(default = "default_chat_limit")]
    pub chat: WindowLimit,
    #[serde(default = "default_api_limit")]
    pub api: WindowLimit,
    /// How often expired windows are purged from memory.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_auth_limit() -> WindowLimit {
    WindowLimit::new(5, FIFTEEN_MINUTES)
}

fn default_chat_limit() -> WindowLimit {
    WindowLimit::new(30, FIFTEEN_MINUTES)
}

fn default_api_limit() -> WindowLimit {
    WindowLimit::new(100, FIFTEEN_MINUTES)
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            auth: default_auth_limit(),
            chat: default_chat_limit(),
            api: default_api_limit(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 5000);
        assert!(!settings.server.trust_proxy);
        assert_eq!(settings.auth.token_ttl_secs, 604_800);
        assert_eq!(settings.auth.cookie_name, "auth_token");
        assert_eq!(settings.chat.max_output_tokens, 1000);
        assert_eq!(settings.rate_limits.auth, WindowLimit::new(5, 900));
        assert_eq!(settings.rate_limits.chat, WindowLimit::new(30, 900));
        assert_eq!(settings.rate_limits.api, WindowLimit::new(100, 900));
        assert_eq!(settings.database.max_connections, 8);
    }

    #[test]
    fn test_settings_deserialize_empty() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.chat.primary_model, "gemini-2.5-flash");
        assert_eq!(settings.chat.fallback_models.len(), 2);
    }

    #[test]
    fn test_settings_deserialize_partial_section() {
        let toml_str = r#"
[chat]
primary_model = "gemini-exp"
attempt_timeout_secs = 5

[rate_limits.auth]
max_requests = 3
window_secs = 60
"#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.chat.primary_model, "gemini-exp");
        assert_eq!(settings.chat.attempt_timeout_secs, 5);
        assert_eq!(settings.chat.max_output_tokens, 1000);
        assert_eq!(settings.rate_limits.auth, WindowLimit::new(3, 60));
        assert_eq!(settings.rate_limits.chat, WindowLimit::new(30, 900));
    }

    #[test]
    fn test_model_chain_order_and_dedup() {
        let chat = ChatSettings {
            primary_model: "a".to_string(),
            fallback_models: vec!["b".to_string(), "a".to_string(), " ".to_string(), "c".to_string()],
            ..ChatSettings::default()
        };
        assert_eq!(chat.model_chain(), vec!["a", "b", "c"]);
    }
}
