//! LlmProvider trait definition.
//!
//! This is the core abstraction that completion backends implement.
//! Uses RPITIT for `complete`; dynamic dispatch goes through
//! [`BoxLlmProvider`](super::box_provider::BoxLlmProvider).

use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM provider backends (Gemini, test doubles).
///
/// Implementations must translate every upstream failure into a closed
/// [`LlmError`] variant; the fallback chain dispatches on those variants.
///
/// Implementations live in parley-infra (e.g., `GeminiProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a completion request against `request.model` and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
