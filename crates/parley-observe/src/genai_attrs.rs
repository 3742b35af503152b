//! OpenTelemetry GenAI Semantic Convention attribute names.
//!
//! Span fields declared with these dotted names in `info_span!` can be filled
//! later through `Span::record(GEN_AI_USAGE_INPUT_TOKENS, ..)` once the
//! provider has answered.
//!
//! Span naming convention: `"{operation} {model}"` (e.g., `"chat gemini-2.5-flash"`)

/// The name of the operation being performed (e.g., "chat").
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The name of the GenAI provider (e.g., "gemini").
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

/// The model ID requested.
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";

pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";

pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";

pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";

/// Why the provider stopped generating (e.g., "STOP", "SAFETY").
pub const GEN_AI_RESPONSE_FINISH_REASONS: &str = "gen_ai.response.finish_reasons";

/// Class of the failure when an attempt did not produce text.
pub const ERROR_TYPE: &str = "error.type";

/// Standard chat completion operation.
pub const OP_CHAT: &str = "chat";

/// Span name for one attempt against one model.
pub fn span_name(operation: &str, model: &str) -> String {
    format!("{operation} {model}")
}
