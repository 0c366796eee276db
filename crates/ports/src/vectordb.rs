//! Vector store boundary contract.
//!
//! Modeled as a cosine-distance ANN index with payload filters (`spec.md`
//! §1's "external collaborator" framing). One collection holds every
//! [`EmbeddingPoint`](resumariner_domain::EmbeddingPoint); `uid` is the
//! join key back to the graph store.

use crate::BoxFuture;
use resumariner_domain::EmbeddingPoint;
use resumariner_shared::{RequestContext, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Payload filter applied server-side during a vector search. Keys must be
/// one of the indexed payload fields: `uid, name, source, email, skills,
/// companies, role, location` (keyword) or `years_experience` (integer).
pub type PayloadFilter = BTreeMap<Box<str>, Value>;

/// Options for a vector similarity search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorSearchOptions {
    /// Maximum number of hits to return.
    pub limit: u32,
    /// Minimum cosine score to include in results.
    pub min_score: Option<f32>,
    /// Server-side payload filter.
    pub filter: PayloadFilter,
}

/// One scored hit from a vector search.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSearchHit {
    /// The matched point's fresh identifier.
    pub point_id: uuid::Uuid,
    /// Resume this point belongs to.
    pub uid: resumariner_domain::Uid,
    /// Cosine similarity score.
    pub score: f32,
    /// The matched point's payload, mirrored back for result assembly.
    pub point: EmbeddingPoint,
}

/// Boundary contract for vector storage and retrieval.
pub trait VectorDbPort: Send + Sync {
    /// Ensure the configured collection exists with the required payload
    /// indexes (`uid, name, source, email, skills, companies, role,
    /// location` keyword; `years_experience` integer).
    fn ensure_collection(&self, ctx: &RequestContext, dimension: u32) -> BoxFuture<'_, Result<()>>;

    /// Replace every point for `uid`: deletes existing points with that
    /// payload `uid`, then upserts `points`. Points whose vector dimension
    /// does not match the collection dimension are skipped (counted in
    /// metrics, not an error). Returns the fresh point ids written.
    fn store_vectors(
        &self,
        ctx: &RequestContext,
        uid: resumariner_domain::Uid,
        points: Vec<EmbeddingPoint>,
    ) -> BoxFuture<'_, Result<Vec<uuid::Uuid>>>;

    /// Delete every point for `uid`. Returns the number of points removed.
    fn delete_resume_vectors(
        &self,
        ctx: &RequestContext,
        uid: resumariner_domain::Uid,
    ) -> BoxFuture<'_, Result<u64>>;

    /// Cosine-distance similarity search with an optional payload filter.
    fn search(
        &self,
        ctx: &RequestContext,
        query_vector: Vec<f32>,
        options: VectorSearchOptions,
    ) -> BoxFuture<'_, Result<Vec<VectorSearchHit>>>;
}
