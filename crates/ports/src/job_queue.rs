//! Job queue boundary contract: a FIFO primary queue, a delayed-retry zset,
//! and an in-flight set, all on the same store (`SPEC_FULL.md` §4.B).

use crate::BoxFuture;
use resumariner_domain::{JobId, TaskEnvelope};
use resumariner_shared::{RequestContext, Result};
use std::time::Duration;

/// Boundary contract for the durable ingestion job queue.
pub trait JobQueuePort: Send + Sync {
    /// Create a task envelope and push it to the tail of the primary
    /// queue. Returns the fresh `task_id`.
    fn enqueue(&self, ctx: &RequestContext, job_id: JobId, file_path: String) -> BoxFuture<'_, Result<String>>;

    /// Blocking pop from the head of the primary queue, waiting up to
    /// `timeout` for a task to arrive. Returns `Ok(None)` on timeout.
    fn dequeue(&self, ctx: &RequestContext, timeout: Duration) -> BoxFuture<'_, Result<Option<TaskEnvelope>>>;

    /// Record that `task` is being processed, for visibility-timeout
    /// tracking in the in-flight set.
    fn mark_processing(&self, ctx: &RequestContext, task: &TaskEnvelope) -> BoxFuture<'_, Result<()>>;

    /// Remove `task` from the in-flight set after successful completion.
    fn mark_completed(&self, ctx: &RequestContext, task_id: &str) -> BoxFuture<'_, Result<()>>;

    /// Remove `task` from the in-flight set and, if retryable, schedule it
    /// on the retry zset at `retry_at` with an incremented attempt count;
    /// otherwise leave it off every structure (terminal failure).
    fn mark_failed(
        &self,
        ctx: &RequestContext,
        task: TaskEnvelope,
        retryable: bool,
        retry_delay: Option<Duration>,
    ) -> BoxFuture<'_, Result<()>>;

    /// Move every due entry from the retry zset back onto the primary
    /// queue. Returns the number of tasks requeued.
    fn process_retries(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<u64>>;

    /// Requeue or drop in-flight tasks whose visibility timeout has
    /// elapsed. Returns the number of tasks reclaimed.
    fn cleanup_expired(&self, ctx: &RequestContext, visibility_timeout: Duration) -> BoxFuture<'_, Result<u64>>;
}
