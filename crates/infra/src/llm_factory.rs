//! LLM adapter selection: one production provider (OpenAI-compatible chat
//! completions), wired from `BackendConfig` plus the API key carried
//! out-of-band in `BackendEnv`.

use crate::env_check::{InfraError, InfraResult};
use resumariner_adapters::llm::openai::{OpenAiLlm, OpenAiLlmConfig};
use resumariner_config::{LlmConfig, RetryConfig};
use resumariner_ports::{BoxFuture, LlmPort, LlmRequest};
use resumariner_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result, RetryPolicy, SecretString, retry_async};
use serde_json::Value;
use std::sync::Arc;

/// Build the LLM adapter from config plus an out-of-band API key. Transport
/// failures (timeout, 5xx, 429) are retried with exponential backoff per
/// `retry`; schema-validation retries are a separate concern handled by the
/// caller.
pub fn build_llm_port(
    config: &LlmConfig,
    api_key: Option<&SecretString>,
    retry: &RetryConfig,
) -> InfraResult<Arc<dyn LlmPort>> {
    let api_key = api_key.ok_or_else(missing_api_key)?;
    let adapter_config = OpenAiLlmConfig::from_llm_config(api_key.expose().into(), config);
    let adapter = OpenAiLlm::new(&adapter_config)?;
    let policy = RetryPolicy {
        max_attempts: retry.max_attempts,
        base_delay_ms: retry.base_delay_ms,
        max_delay_ms: retry.max_delay_ms,
        jitter_ratio_pct: 20,
    };
    Ok(Arc::new(RetryingLlm {
        inner: Arc::new(adapter),
        policy,
    }))
}

fn missing_api_key() -> InfraError {
    ErrorEnvelope::expected(
        ErrorCode::new("infra", "missing_llm_api_key"),
        "LLM API key is not set in the environment",
    )
}

/// Wraps an [`LlmPort`] so transport-level failures are retried with
/// exponential backoff before the error reaches the caller.
struct RetryingLlm {
    inner: Arc<dyn LlmPort>,
    policy: RetryPolicy,
}

impl LlmPort for RetryingLlm {
    fn run(&self, ctx: &RequestContext, request: LlmRequest) -> BoxFuture<'_, Result<Value>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            retry_async(&ctx, self.policy, "llm.run", || self.inner.run(&ctx, request.clone())).await
        })
    }
}
