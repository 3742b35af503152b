//! Configuration loading for Parley.
//!
//! Tunables come from an optional TOML file deserialized into
//! [`Settings`]; secrets and deployment facts come from the environment
//! (collected by the CLI into [`ConfigSources`]). Both are validated once
//! and frozen into an [`AppConfig`] before any request is served.

use std::fmt;
use std::path::Path;

use secrecy::{ExposeSecret, SecretString};

pub use parley_types::auth::Environment;
use parley_types::config::Settings;

/// Signing secrets shorter than this are rejected at startup.
pub const MIN_SECRET_BYTES: usize = 32;

/// Default settings file, looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "parley.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    #[error("{name} must be at least {min} bytes")]
    SecretTooShort { name: &'static str, min: usize },

    #[error("invalid environment '{0}' (expected development or production)")]
    InvalidEnvironment(String),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Load [`Settings`] from a TOML file.
///
/// - `Some(path)`: the file must exist and parse.
/// - `None`: `parley.toml` in the working directory is used when present,
///   otherwise defaults.
pub async fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let (config_path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (Path::new(DEFAULT_SETTINGS_FILE).to_path_buf(), false),
    };

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !explicit => {
            tracing::debug!("No {} found, using default settings", config_path.display());
            return Ok(Settings::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: config_path.display().to_string(),
                source,
            });
        }
    };

    toml::from_str::<Settings>(&content).map_err(|source| ConfigError::Parse {
        path: config_path.display().to_string(),
        source,
    })
}

/// Raw values gathered from flags and environment variables.
#[derive(Default)]
pub struct ConfigSources {
    pub environment: Option<String>,
    pub database_url: Option<String>,
    pub jwt_secret: Option<SecretString>,
    pub cookie_secret: Option<SecretString>,
    pub gemini_api_key: Option<SecretString>,
    pub frontend_url: Option<String>,
    pub cookie_domain: Option<String>,
}

/// Immutable process configuration, built once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub database_url: String,
    pub jwt_secret: SecretString,
    pub cookie_secret: SecretString,
    pub gemini_api_key: SecretString,
    pub frontend_url: Option<String>,
    pub cookie_domain: Option<String>,
    pub settings: Settings,
}

impl AppConfig {
    /// Validate the raw sources and combine them with loaded settings.
    pub fn assemble(sources: ConfigSources, settings: Settings) -> Result<Self, ConfigError> {
        let environment = match sources.environment.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnvironment(raw.trim().to_string()))?,
            _ => Environment::default(),
        };

        let database_url = non_blank(sources.database_url).ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = required_secret(sources.jwt_secret, "JWT_SECRET", MIN_SECRET_BYTES)?;
        let cookie_secret = required_secret(sources.cookie_secret, "COOKIE_SECRET", MIN_SECRET_BYTES)?;
        let gemini_api_key = required_secret(sources.gemini_api_key, "GEMINI_API_KEY", 1)?;

        let frontend_url = non_blank(sources.frontend_url).map(|u| u.trim_end_matches('/').to_string());
        if environment.is_production() && frontend_url.is_none() {
            tracing::warn!("FRONTEND_URL is not set in production; cross-origin requests will be rejected");
        }

        Ok(Self {
            environment,
            database_url,
            jwt_secret,
            cookie_secret,
            gemini_api_key,
            frontend_url,
            cookie_domain: non_blank(sources.cookie_domain),
            settings,
        })
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("environment", &self.environment)
            .field("database_url", &self.database_url)
            .field("frontend_url", &self.frontend_url)
            .field("cookie_domain", &self.cookie_domain)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_secret(
    value: Option<SecretString>,
    name: &'static str,
    min: usize,
) -> Result<SecretString, ConfigError> {
    let secret = value
        .filter(|s| !s.expose_secret().trim().is_empty())
        .ok_or(ConfigError::Missing(name))?;
    if secret.expose_secret().len() < min {
        return Err(ConfigError::SecretTooShort { name, min });
    }
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn full_sources() -> ConfigSources {
        ConfigSources {
            environment: None,
            database_url: Some("sqlite://parley.db".into()),
            jwt_secret: Some(SecretString::from("j".repeat(32))),
            cookie_secret: Some(SecretString::from("c".repeat(40))),
            gemini_api_key: Some(SecretString::from("AIza-test")),
            frontend_url: Some("http://localhost:5173/".into()),
            cookie_domain: Some("  ".into()),
        }
    }

    #[tokio::test]
    async fn explicit_missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_settings(Some(&tmp.path().join("nope.toml"))).await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[tokio::test]
    async fn valid_file_overrides_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("parley.toml");
        tokio::fs::write(
            &path,
            r#"
[server]
port = 8080

[chat]
primary_model = "gemini-2.0-flash"
fallback_models = []
"#,
        )
        .await
        .unwrap();

        let settings = load_settings(Some(&path)).await.unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.chat.model_chain(), vec!["gemini-2.0-flash".to_string()]);
        assert_eq!(settings.auth.token_ttl_secs, 604_800);
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("parley.toml");
        tokio::fs::write(&path, "this is not { valid toml !!!").await.unwrap();

        let err = load_settings(Some(&path)).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn assemble_accepts_complete_sources() {
        let config = AppConfig::assemble(full_sources(), Settings::default()).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.frontend_url.as_deref(), Some("http://localhost:5173"));
        assert!(config.cookie_domain.is_none());
    }

    #[test]
    fn assemble_rejects_missing_database_url() {
        let sources = ConfigSources {
            database_url: None,
            ..full_sources()
        };
        let err = AppConfig::assemble(sources, Settings::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn assemble_rejects_short_jwt_secret() {
        let sources = ConfigSources {
            jwt_secret: Some(SecretString::from("short")),
            ..full_sources()
        };
        let err = AppConfig::assemble(sources, Settings::default()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::SecretTooShort {
                name: "JWT_SECRET",
                ..
            }
        ));
    }

    #[test]
    fn assemble_rejects_unknown_environment() {
        let sources = ConfigSources {
            environment: Some("staging".into()),
            ..full_sources()
        };
        assert!(matches!(
            AppConfig::assemble(sources, Settings::default()),
            Err(ConfigError::InvalidEnvironment(_))
        ));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = AppConfig::assemble(full_sources(), Settings::default()).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("jjjj"));
        assert!(!debug.contains("AIza"));
    }

    #[test]
    fn assemble_parses_production() {
        let sources = ConfigSources {
            environment: Some(" Production ".into()),
            ..full_sources()
        };
        let config = AppConfig::assemble(sources, Settings::default()).unwrap();
        assert!(config.environment.is_production());
    }
}
