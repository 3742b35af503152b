//! Google Gemini provider implementation.
//!
//! [`GeminiProvider`] implements the
//! [`LlmProvider`](parley_core::llm::provider::LlmProvider) trait against the
//! Generative Language REST API (`generateContent`).

pub mod client;
pub mod types;

pub use client::GeminiProvider;
