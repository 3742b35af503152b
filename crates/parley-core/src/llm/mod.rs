//! LLM provider abstractions for Parley.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `ModelFallbackChain`: ordered model failover over one provider

pub mod box_provider;
pub mod fallback;
pub mod provider;
