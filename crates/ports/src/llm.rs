//! LLM boundary contract: typed, JSON-schema-constrained generation.

use crate::BoxFuture;
use resumariner_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Sampling options for an LLM call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LlmOptions {
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for LlmOptions {
    fn default() -> Self {
        Self { temperature: 0.7 }
    }
}

/// One schema-constrained generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    /// System prompt.
    pub system_prompt: String,
    /// User prompt.
    pub user_prompt: String,
    /// JSON schema the response must validate against.
    pub schema: Value,
    /// Sampling options.
    pub options: LlmOptions,
}

/// Boundary contract for structured-output LLM generation. On
/// schema-validation failure, callers should retry once with a stricter
/// system prompt and `temperature = 0.1`; transport failures are retried
/// with exponential backoff by [`resumariner_shared::retry`].
pub trait LlmPort: Send + Sync {
    /// Run one constrained generation, returning the raw JSON response
    /// (already validated against `request.schema` by the adapter).
    fn run(&self, ctx: &RequestContext, request: LlmRequest) -> BoxFuture<'_, Result<Value>>;
}

/// Run a constrained generation and deserialize the result into `T`.
///
/// Thin typed wrapper over [`LlmPort::run`]; kept as a free function
/// (rather than a trait method) so `LlmPort` stays object-safe.
pub async fn run_typed<T>(port: &dyn LlmPort, ctx: &RequestContext, request: LlmRequest) -> Result<T>
where
    T: DeserializeOwned,
{
    let value = port.run(ctx, request).await?;
    serde_json::from_value(value).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("llm", "schema_mismatch"),
            format!("LLM response did not match the requested schema: {error}"),
        )
    })
}
