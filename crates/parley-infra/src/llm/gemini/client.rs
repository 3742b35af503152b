//! GeminiProvider -- concrete [`LlmProvider`] implementation for Google Gemini.
//!
//! Sends requests to `POST {base}/v1beta/models/{model}:generateContent`
//! with the API key in the `x-goog-api-key` header, and maps every HTTP or
//! transport failure onto a closed [`LlmError`] variant.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use secrecy::{ExposeSecret, SecretString};

use parley_core::llm::provider::LlmProvider;
use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError, MessageRole, Usage};

use super::types::{
    GeminiContent, GeminiErrorEnvelope, GeminiPart, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig,
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Google Gemini LLM provider.
///
/// One instance serves every model in the fallback chain; the model is
/// taken from each request.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    request_timeout: Duration,
}

impl GeminiProvider {
    /// Create a provider whose HTTP client gives up after `request_timeout`.
    pub fn new(api_key: SecretString, request_timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::Provider {
                status: None,
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout,
        })
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    /// Convert a generic [`CompletionRequest`] into Gemini's wire shape.
    ///
    /// `assistant` turns become `model` turns; `system` turns and
    /// `request.system` are folded into `systemInstruction`.
    fn to_gemini_request(request: &CompletionRequest) -> GenerateContentRequest {
        let mut system_parts: Vec<GeminiPart> = request
            .system
            .iter()
            .map(|text| GeminiPart {
                text: Some(text.clone()),
            })
            .collect();
        let mut contents = Vec::with_capacity(request.messages.len());

        for message in &request.messages {
            let role = match message.role {
                MessageRole::System => {
                    system_parts.push(GeminiPart {
                        text: Some(message.content.clone()),
                    });
                    continue;
                }
                MessageRole::User => "user",
                MessageRole::Assistant => "model",
            };
            contents.push(GeminiContent {
                role: Some(role.to_string()),
                parts: vec![GeminiPart {
                    text: Some(message.content.clone()),
                }],
            });
        }

        GenerateContentRequest {
            contents,
            system_instruction: (!system_parts.is_empty()).then(|| GeminiContent {
                role: None,
                parts: system_parts,
            }),
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            },
        }
    }

    fn transport_error(&self, e: &reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout {
                after_ms: u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else if e.is_connect() || e.is_request() {
            LlmError::Unreachable(e.to_string())
        } else {
            LlmError::Provider {
                status: None,
                message: format!("HTTP request failed: {e}"),
            }
        }
    }
}

/// Classify a non-success response.
pub(crate) fn map_error_status(
    status: StatusCode,
    body: &str,
    model: &str,
    retry_after_secs: Option<u64>,
) -> LlmError {
    let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string());

    if status == StatusCode::TOO_MANY_REQUESTS || message.to_lowercase().contains("quota") {
        return LlmError::RateLimited {
            retry_after_ms: retry_after_secs.map(|s| s.saturating_mul(1000)),
        };
    }

    match status {
        StatusCode::NOT_FOUND => LlmError::ModelNotFound {
            model: model.to_string(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::AuthenticationFailed,
        StatusCode::BAD_REQUEST => LlmError::InvalidRequest(message),
        other => LlmError::Provider {
            status: Some(other.as_u16()),
            message,
        },
    }
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = Self::to_gemini_request(request);

        let response = self
            .client
            .post(self.url(&request.model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let error_body = response.text().await.unwrap_or_default();
            let err = map_error_status(status, &error_body, &request.model, retry_after);
            tracing::debug!(status = status.as_u16(), error_kind = err.kind(), "gemini request failed");
            return Err(err);
        }

        let gemini_resp: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        let usage = gemini_resp.usage_metadata.clone().unwrap_or_default();

        Ok(CompletionResponse {
            content: gemini_resp.text(),
            model: gemini_resp
                .model_version
                .clone()
                .unwrap_or_else(|| request.model.clone()),
            finish_reason: gemini_resp.finish_reason(),
            usage: Usage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            },
        })
    }
}
