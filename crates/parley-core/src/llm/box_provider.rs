//! Type-erased handle to the configured model backend.
//!
//! The fallback chain only ever talks to one backend, picked from config at
//! startup, so it holds a `BoxLlmProvider` instead of a generic parameter.

use std::future::Future;
use std::pin::Pin;

use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use super::provider::LlmProvider;

type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>>;

/// `LlmProvider` with its completion future boxed, usable as `dyn`.
pub trait LlmProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn complete_boxed<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a>;
}

impl<T: LlmProvider> LlmProviderDyn for T {
    fn name(&self) -> &str {
        LlmProvider::name(self)
    }

    fn complete_boxed<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(self.complete(request))
    }
}

pub struct BoxLlmProvider {
    inner: Box<dyn LlmProviderDyn>,
}

impl BoxLlmProvider {
    pub fn new<T: LlmProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Ask the backend for one completion. `request.model` picks the model.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.inner.complete_boxed(request).await
    }
}

impl std::fmt::Debug for BoxLlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BoxLlmProvider").field(&self.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Scripted, ScriptedProvider, sample_request};

    #[tokio::test]
    async fn test_boxed_provider_forwards_to_backend() {
        let scripted = ScriptedProvider::new().with("gemini-2.5-flash", Scripted::Reply("hello".into()));
        let calls = scripted.calls();
        let provider = BoxLlmProvider::new(scripted);

        let request = CompletionRequest {
            model: "gemini-2.5-flash".to_string(),
            ..sample_request()
        };
        let response = provider.complete(&request).await.unwrap();

        assert_eq!(provider.name(), "scripted");
        assert_eq!(response.content, "hello");
        assert_eq!(*calls.lock().unwrap(), vec!["gemini-2.5-flash".to_string()]);
        assert_eq!(format!("{provider:?}"), "BoxLlmProvider(\"scripted\")");
    }

    #[tokio::test]
    async fn test_boxed_provider_passes_errors_through() {
        let provider = BoxLlmProvider::new(ScriptedProvider::new());
        let request = CompletionRequest {
            model: "gemini-unknown".to_string(),
            ..sample_request()
        };
        let err = provider.complete(&request).await.unwrap_err();
        assert!(matches!(err, LlmError::ModelNotFound { .. }));
    }
}
