//! Graph store boundary contract, modeled as a Cypher-speaking property
//! graph (`spec.md` §1).

use crate::BoxFuture;
use resumariner_domain::{Resume, SearchFilters, Uid};
use resumariner_shared::{RequestContext, Result};

/// Boundary contract for durable resume persistence and structured search.
pub trait GraphStorePort: Send + Sync {
    /// Upsert a resume. Idempotent: applying the same resume twice leaves
    /// the graph in the same state as applying it once.
    fn upsert_resume(&self, ctx: &RequestContext, resume: Resume) -> BoxFuture<'_, Result<Uid>>;

    /// Fetch a resume by `uid`.
    fn get_resume(&self, ctx: &RequestContext, uid: Uid) -> BoxFuture<'_, Result<Option<Resume>>>;

    /// Fetch multiple resumes by `uid`, used to enrich semantic search hits.
    fn get_resumes_by_ids(&self, ctx: &RequestContext, uids: Vec<Uid>) -> BoxFuture<'_, Result<Vec<Resume>>>;

    /// Fetch a resume by its unique contact email, the upsert join key.
    fn get_resume_by_email(&self, ctx: &RequestContext, email: &str) -> BoxFuture<'_, Result<Option<Resume>>>;

    /// Delete a resume node only.
    fn delete_resume(&self, ctx: &RequestContext, uid: Uid) -> BoxFuture<'_, Result<bool>>;

    /// Delete a resume and every exclusively-owned child node reachable
    /// from it (cascade), leaving shared lookup nodes (skills, companies,
    /// institutions, languages) untouched if referenced elsewhere.
    fn delete_resume_cascade(&self, ctx: &RequestContext, uid: Uid) -> BoxFuture<'_, Result<bool>>;

    /// Run a structured search against `filters`, ordered by
    /// `created_at` descending then `uid`.
    fn search_structured(&self, ctx: &RequestContext, filters: SearchFilters, limit: u32) -> BoxFuture<'_, Result<Vec<Uid>>>;
}
