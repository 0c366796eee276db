//! Embedding adapter selection: one production provider (OpenAI-compatible),
//! wired from `BackendConfig` plus the API key carried out-of-band in
//! `BackendEnv`.

use crate::env_check::{InfraError, InfraResult};
use resumariner_adapters::embedding::openai::{OpenAiEmbedding, OpenAiEmbeddingConfig};
use resumariner_config::EmbeddingConfig;
use resumariner_ports::{
    BoxFuture, EmbedBatchRequest, EmbedRequest, EmbeddingPort, EmbeddingProviderInfo,
    EmbeddingVector,
};
use resumariner_shared::{CircuitBreaker, ErrorCode, ErrorEnvelope, RequestContext, Result, SecretString};
use std::sync::Arc;

/// Build the embedding adapter from config plus an out-of-band API key,
/// guarded by `circuit_breaker` so repeated provider failures stop piling
/// up latency on every ingestion call.
pub fn build_embedding_port(
    config: &EmbeddingConfig,
    api_key: Option<&SecretString>,
    circuit_breaker: Arc<CircuitBreaker>,
) -> InfraResult<Arc<dyn EmbeddingPort>> {
    let api_key = api_key.ok_or_else(missing_api_key)?;
    let adapter_config =
        OpenAiEmbeddingConfig::from_embedding_config(api_key.expose().into(), config);
    let adapter = OpenAiEmbedding::new(&adapter_config)?;
    Ok(Arc::new(CircuitBreakingEmbedding {
        inner: Arc::new(adapter),
        breaker: circuit_breaker,
    }))
}

fn missing_api_key() -> InfraError {
    ErrorEnvelope::expected(
        ErrorCode::new("infra", "missing_embedding_api_key"),
        "embedding API key is not set in the environment",
    )
}

/// Wraps an [`EmbeddingPort`] so every call runs through a circuit breaker
/// instead of being dispatched straight to the provider.
struct CircuitBreakingEmbedding {
    inner: Arc<dyn EmbeddingPort>,
    breaker: Arc<CircuitBreaker>,
}

impl EmbeddingPort for CircuitBreakingEmbedding {
    fn provider(&self) -> &EmbeddingProviderInfo {
        self.inner.provider()
    }

    fn embed(&self, ctx: &RequestContext, request: EmbedRequest) -> BoxFuture<'_, Result<EmbeddingVector>> {
        let ctx = ctx.clone();
        Box::pin(async move { self.breaker.call(|| self.inner.embed(&ctx, request)).await })
    }

    fn embed_batch(
        &self,
        ctx: &RequestContext,
        request: EmbedBatchRequest,
    ) -> BoxFuture<'_, Result<Vec<EmbeddingVector>>> {
        let ctx = ctx.clone();
        Box::pin(async move { self.breaker.call(|| self.inner.embed_batch(&ctx, request)).await })
    }
}
