//! Job store boundary contract. Keyed `{prefix}{job_id}`, one hash per job,
//! TTL refreshed on every write (`SPEC_FULL.md` §4.A).

use crate::BoxFuture;
use resumariner_domain::{Job, JobId};
use resumariner_shared::{RequestContext, Result};

/// Fields that may be patched on a job via [`JobStorePort::update`].
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    /// New status, when transitioning state.
    pub status: Option<resumariner_domain::JobStatus>,
    /// New result, once the pipeline completes.
    pub result: Option<resumariner_domain::JobResult>,
    /// New result URL, when the result is stored out-of-line.
    pub result_url: Option<String>,
    /// New sanitized error message, once the pipeline fails.
    pub error: Option<String>,
}

/// Boundary contract for durable per-job state.
pub trait JobStorePort: Send + Sync {
    /// Create a new job record in the `Pending` state.
    fn create(&self, ctx: &RequestContext, job_id: JobId, file_path: String) -> BoxFuture<'_, Result<Job>>;

    /// Fetch a job by id. Returns `Ok(None)` when the job does not exist
    /// or has expired past its retention TTL.
    fn get(&self, ctx: &RequestContext, job_id: JobId) -> BoxFuture<'_, Result<Option<Job>>>;

    /// Read-modify-write a patch onto an existing job, refreshing
    /// `updated_at` and the retention TTL. Returns `Ok(None)`, not an
    /// error, when the job does not exist.
    fn update(&self, ctx: &RequestContext, job_id: JobId, patch: JobPatch) -> BoxFuture<'_, Result<Option<Job>>>;

    /// Delete a job record. Returns whether a record was actually removed.
    fn delete(&self, ctx: &RequestContext, job_id: JobId) -> BoxFuture<'_, Result<bool>>;

    /// List up to `limit` jobs, most recently updated first.
    fn list(&self, ctx: &RequestContext, limit: u32) -> BoxFuture<'_, Result<Vec<Job>>>;
}
