//! Ordered model fallback chain.
//!
//! Routes a completion request through an ordered list of model identifiers
//! on a single provider. A model that reports itself unavailable (not found,
//! or an empty answer) hands the request to the next model; every other
//! failure ends the request immediately with a classified upstream error.

use std::time::Duration;

use tracing::{Instrument, debug, info_span, warn};

use parley_observe::genai_attrs::{
    ERROR_TYPE, GEN_AI_RESPONSE_FINISH_REASONS, GEN_AI_USAGE_INPUT_TOKENS,
    GEN_AI_USAGE_OUTPUT_TOKENS, OP_CHAT, span_name,
};
use parley_types::error::ChatError;
use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use super::box_provider::BoxLlmProvider;

/// Result of a successful completion through the fallback chain.
#[derive(Debug)]
pub struct FallbackResult {
    /// The completion response, guaranteed to carry non-blank text.
    pub response: CompletionResponse,
    /// Model identifier that produced the response.
    pub model: String,
    /// Number of models tried, including the successful one.
    pub attempts: usize,
    /// Set when a model other than the primary answered.
    pub failover_warning: Option<String>,
}

/// One provider, an ordered list of models, and a deadline per attempt.
#[derive(Debug)]
pub struct ModelFallbackChain {
    provider: BoxLlmProvider,
    models: Vec<String>,
    attempt_timeout: Duration,
}

impl ModelFallbackChain {
    /// Create a chain. `models[0]` is the primary model.
    pub fn new(provider: BoxLlmProvider, models: Vec<String>, attempt_timeout: Duration) -> Self {
        Self {
            provider,
            models,
            attempt_timeout,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Send `request` through the chain. `request.model` is overwritten per attempt.
    ///
    /// Never revisits a model. Returns the first non-blank answer, or the
    /// first terminal failure, or `ChatError::Upstream` once every model has
    /// reported itself unavailable.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<FallbackResult, ChatError> {
        let mut last_error: Option<LlmError> = None;

        for (index, model) in self.models.iter().enumerate() {
            let attempt = request.with_model(model);
            let span = info_span!(
                "gen_ai.chat",
                otel.name = %span_name(OP_CHAT, model),
                gen_ai.operation.name = OP_CHAT,
                gen_ai.provider.name = self.provider.name(),
                gen_ai.request.model = %model,
                gen_ai.request.max_tokens = attempt.max_tokens,
                gen_ai.request.temperature = ?attempt.temperature,
                gen_ai.usage.input_tokens = tracing::field::Empty,
                gen_ai.usage.output_tokens = tracing::field::Empty,
                gen_ai.response.finish_reasons = tracing::field::Empty,
                error.type = tracing::field::Empty,
            );

            let outcome = self
                .attempt(&attempt)
                .instrument(span.clone())
                .await
                .and_then(|response| {
                    if response.content.trim().is_empty() {
                        Err(LlmError::EmptyResponse {
                            model: model.clone(),
                        })
                    } else {
                        Ok(response)
                    }
                });

            match outcome {
                Ok(response) => {
                    span.record(GEN_AI_USAGE_INPUT_TOKENS, response.usage.input_tokens);
                    span.record(GEN_AI_USAGE_OUTPUT_TOKENS, response.usage.output_tokens);
                    if let Some(reason) = &response.finish_reason {
                        span.record(GEN_AI_RESPONSE_FINISH_REASONS, reason.as_str());
                    }

                    let failover_warning = (index > 0).then(|| {
                        format!("Switched from {} to {model}", self.models[0])
                    });
                    if let Some(warning) = &failover_warning {
                        warn!(attempts = index + 1, "{warning}");
                    }
                    debug!(model = %model, attempts = index + 1, "completion succeeded");

                    return Ok(FallbackResult {
                        response,
                        model: model.clone(),
                        attempts: index + 1,
                        failover_warning,
                    });
                }
                Err(err) if err.is_model_unavailable() => {
                    span.record(ERROR_TYPE, err.kind());
                    warn!(
                        model = %model,
                        error_kind = err.kind(),
                        "model unavailable, trying next in chain"
                    );
                    last_error = Some(err);
                }
                Err(err) => {
                    span.record(ERROR_TYPE, err.kind());
                    warn!(model = %model, error_kind = err.kind(), error = %err, "completion failed");
                    return Err(classify(err));
                }
            }
        }

        let detail = match last_error {
            Some(err) => format!("all {} models unavailable, last: {err}", self.models.len()),
            None => "no models configured".to_string(),
        };
        warn!(provider = self.provider.name(), "{detail}");
        Err(ChatError::Upstream(detail))
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        match tokio::time::timeout(self.attempt_timeout, self.provider.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout {
                after_ms: u64::try_from(self.attempt_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

/// Map a terminal provider failure to the chat error surfaced to callers.
fn classify(err: LlmError) -> ChatError {
    match err {
        LlmError::RateLimited { retry_after_ms } => ChatError::UpstreamRateLimited { retry_after_ms },
        LlmError::Unreachable(detail) => ChatError::UpstreamUnreachable(detail),
        LlmError::Timeout { after_ms } => {
            ChatError::UpstreamUnreachable(format!("no answer within {after_ms}ms"))
        }
        other => ChatError::Upstream(other.to_string()),
    }
}
