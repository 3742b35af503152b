//! LLM request/response types for Parley.
//!
//! These types model the data shapes for completion provider interactions:
//! completion requests, responses, usage tracking, and the closed error type
//! the model fallback chain dispatches on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a message in an LLM conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message in an LLM conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

/// Request to an LLM provider for a completion.
///
/// `messages` is the ordered history followed by the new user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl CompletionRequest {
    /// Copy of this request targeting a different model.
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }
}

/// Response from an LLM provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    pub usage: Usage,
}

/// Token usage for a completion request/response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Errors from LLM provider operations.
///
/// Every upstream failure is mapped into one of these variants at the
/// provider boundary so the fallback chain can match exhaustively.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("model '{model}' not found")]
    ModelNotFound { model: String },

    #[error("provider unreachable: {0}")]
    Unreachable(String),

    #[error("provider did not answer within {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("model '{model}' returned an empty response")]
    EmptyResponse { model: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("provider error (status {status:?}): {message}")]
    Provider { status: Option<u16>, message: String },
}

impl LlmError {
    /// Whether the next model in the fallback chain should be tried.
    pub fn is_model_unavailable(&self) -> bool {
        matches!(
            self,
            LlmError::ModelNotFound { .. } | LlmError::EmptyResponse { .. }
        )
    }

    /// Short machine-readable class name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::RateLimited { .. } => "rate_limited",
            LlmError::ModelNotFound { .. } => "model_not_found",
            LlmError::Unreachable(_) => "unreachable",
            LlmError::Timeout { .. } => "timeout",
            LlmError::EmptyResponse { .. } => "empty_response",
            LlmError::AuthenticationFailed => "authentication_failed",
            LlmError::InvalidRequest(_) => "invalid_request",
            LlmError::Deserialization(_) => "deserialization",
            LlmError::Provider { .. } => "provider",
        }
    }
}
