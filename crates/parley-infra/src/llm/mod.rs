//! LLM provider implementations.
//!
//! Contains the Gemini implementation of the [`LlmProvider`] trait defined
//! in `parley-core`, plus factories that turn configuration into a ready
//! [`ModelFallbackChain`].
//!
//! [`LlmProvider`]: parley_core::llm::provider::LlmProvider

pub mod gemini;

use std::time::Duration;

use secrecy::SecretString;

use parley_core::llm::box_provider::BoxLlmProvider;
use parley_core::llm::fallback::ModelFallbackChain;
use parley_types::config::ChatSettings;
use parley_types::llm::LlmError;

use self::gemini::GeminiProvider;

/// Create a boxed Gemini provider.
///
/// `base_url` overrides the public endpoint (proxies, local mocks).
pub fn create_provider(
    api_key: SecretString,
    base_url: Option<&str>,
    request_timeout: Duration,
) -> Result<BoxLlmProvider, LlmError> {
    let mut provider = GeminiProvider::new(api_key, request_timeout)?;
    if let Some(url) = base_url {
        provider = provider.with_base_url(url);
    }
    Ok(BoxLlmProvider::new(provider))
}

/// Build the fallback chain described by `settings` around `provider`.
pub fn build_fallback_chain(
    provider: BoxLlmProvider,
    settings: &ChatSettings,
) -> Result<ModelFallbackChain, LlmError> {
    let models = settings.model_chain();
    if models.is_empty() {
        return Err(LlmError::InvalidRequest(
            "no chat models configured".to_string(),
        ));
    }

    tracing::info!(
        provider = provider.name(),
        models = ?models,
        "Model fallback chain configured"
    );

    Ok(ModelFallbackChain::new(
        provider,
        models,
        Duration::from_secs(settings.attempt_timeout_secs),
    ))
}
