//! Embedding boundary contract.

use crate::BoxFuture;
use resumariner_shared::{RequestContext, Result};
use std::sync::Arc;

/// An embedding vector payload.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingVector {
    /// Dense embedding vector.
    vector: Arc<[f32]>,
    /// Vector dimensionality.
    dimension: u32,
}

impl EmbeddingVector {
    /// Build an embedding vector from a shared slice.
    #[must_use]
    pub fn new(vector: Arc<[f32]>) -> Self {
        let dimension = u32::try_from(vector.len()).unwrap_or(0);
        Self { vector, dimension }
    }

    /// Build an embedding vector from an owned vector.
    #[must_use]
    pub fn from_vec(vector: Vec<f32>) -> Self {
        Self::new(Arc::from(vector))
    }

    /// Borrow the vector as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.vector
    }

    /// Borrow the shared vector buffer.
    #[must_use]
    pub const fn vector(&self) -> &Arc<[f32]> {
        &self.vector
    }

    /// Return the embedding dimension.
    #[must_use]
    pub const fn dimension(&self) -> u32 {
        self.dimension
    }

    /// Consume and return the shared vector buffer.
    #[must_use]
    pub fn into_vector(self) -> Arc<[f32]> {
        self.vector
    }
}

/// Provider descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingProviderInfo {
    /// Stable provider identifier, e.g. `"openai:text-embedding-3-small"`.
    pub id: Box<str>,
    /// Human-readable provider name.
    pub name: Box<str>,
    /// Vector dimension this provider produces.
    pub dimension: u32,
}

/// Owned request to embed a single text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedRequest {
    /// Text to embed.
    pub text: Box<str>,
}

impl From<Box<str>> for EmbedRequest {
    fn from(text: Box<str>) -> Self {
        Self { text }
    }
}

impl From<String> for EmbedRequest {
    fn from(text: String) -> Self {
        Self {
            text: text.into_boxed_str(),
        }
    }
}

impl From<&str> for EmbedRequest {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_owned().into_boxed_str(),
        }
    }
}

/// Owned request to embed a batch of texts. The batch is the unit the
/// ingestion worker sends per resume: one summary plus one item per skill,
/// employment key-point, project key-point, and education extra.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedBatchRequest {
    /// Texts to embed, in caller-determined order. Providers must return
    /// vectors in the same order.
    pub texts: Vec<Box<str>>,
}

impl From<Vec<Box<str>>> for EmbedBatchRequest {
    fn from(texts: Vec<Box<str>>) -> Self {
        Self { texts }
    }
}

impl From<Vec<String>> for EmbedBatchRequest {
    fn from(texts: Vec<String>) -> Self {
        Self {
            texts: texts.into_iter().map(String::into_boxed_str).collect(),
        }
    }
}

/// Boundary contract for embedding generation. One production adapter
/// (OpenAI-compatible), wrapped by the caller in a circuit breaker.
pub trait EmbeddingPort: Send + Sync {
    /// Provider info for this implementation.
    fn provider(&self) -> &EmbeddingProviderInfo;

    /// Embed a single text.
    fn embed(
        &self,
        ctx: &RequestContext,
        request: EmbedRequest,
    ) -> BoxFuture<'_, Result<EmbeddingVector>>;

    /// Embed multiple texts in a batch. Implementations should prefer a
    /// single provider request over calling `embed` in a loop, to keep the
    /// per-resume pipeline within its external-call budget.
    fn embed_batch(
        &self,
        ctx: &RequestContext,
        request: EmbedBatchRequest,
    ) -> BoxFuture<'_, Result<Vec<EmbeddingVector>>>;
}
