//! In-memory adapter implementations for port contracts.
//!
//! These implementations are intended for:
//! - Unit/integration tests of `resumariner-app` use cases
//! - Deterministic contract tests for the ports layer
//! - Local experimentation without external dependencies
//!
//! The graph store and vector store already have real in-process adapters
//! (`resumariner_adapters::graph_store::in_memory::InMemoryGraphStore`,
//! `resumariner_adapters::vectordb_local::LocalVectorDb`) that cover that
//! role; `adapters` is downstream of `testkit` in the dependency graph, so
//! this crate only furnishes doubles for the ports that have no in-process
//! adapter at all: LLM, embedding, job queue/store, document extraction.

use resumariner_domain::{
    Job, JobId, JobStatus, ParsedDocument, ParsedPage, ProcessingMethod, TaskEnvelope,
};
use resumariner_ports::{
    BoxFuture, DocumentExtractorPort, EmbedBatchRequest, EmbedRequest, EmbeddingPort,
    EmbeddingProviderInfo, EmbeddingVector, JobPatch, JobQueuePort, JobStorePort, LlmPort,
    LlmRequest, LogEvent, LogFields, LogLevel, LoggerPort, TelemetryPort, TelemetryTags,
    TelemetryTimer, UploadedFile,
};
use resumariner_shared::{RequestContext, Result};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A no-op logger implementation.
#[derive(Debug, Default)]
pub struct NoopLogger;

impl LoggerPort for NoopLogger {
    fn log(&self, _event: LogEvent) {}

    fn child(&self, _fields: LogFields) -> Box<dyn LoggerPort> {
        Box::new(Self)
    }
}

/// A no-op telemetry timer.
#[derive(Debug, Default)]
pub struct NoopTimer;

impl TelemetryTimer for NoopTimer {
    fn stop(&self) {}
}

/// A no-op telemetry implementation.
#[derive(Debug, Default)]
pub struct NoopTelemetry;

impl TelemetryPort for NoopTelemetry {
    fn increment_counter(&self, _name: &str, _value: u64, _tags: Option<&TelemetryTags>) {}

    fn record_timer_ms(&self, _name: &str, _duration_ms: u64, _tags: Option<&TelemetryTags>) {}

    fn start_timer(&self, _name: &str, _tags: Option<&TelemetryTags>) -> Box<dyn TelemetryTimer> {
        Box::new(NoopTimer)
    }
}

fn embed_text_with_dimension(text: &str, dimension: u32) -> Vec<f32> {
    let dim = dimension.max(1) as usize;
    let mut buckets = vec![0u32; dim];
    for (idx, byte) in text.as_bytes().iter().enumerate() {
        let slot = idx % dim;
        buckets[slot] = buckets[slot].wrapping_add(u32::from(*byte));
    }

    let norm: f64 = buckets.iter().map(|b| f64::from(*b) * f64::from(*b)).sum::<f64>().sqrt();
    buckets
        .into_iter()
        .map(|value| {
            if norm > 0.0 {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "embedding components are normalized into [0, 1], well within f32 range"
                )]
                let component = (f64::from(value) / norm) as f32;
                component
            } else {
                0.0
            }
        })
        .collect()
}

/// Deterministic in-memory embedding provider: the same text always
/// produces the same vector, and distinct texts produce (almost certainly)
/// distinct vectors, without calling out to any real provider.
#[derive(Debug, Clone)]
pub struct InMemoryEmbedding {
    provider: EmbeddingProviderInfo,
}

impl InMemoryEmbedding {
    /// Create a deterministic embedder producing vectors of `dimension`.
    #[must_use]
    pub fn new(dimension: u32) -> Self {
        Self {
            provider: EmbeddingProviderInfo {
                id: "in-memory:fake".into(),
                name: "in-memory fake embedding".into(),
                dimension,
            },
        }
    }
}

impl EmbeddingPort for InMemoryEmbedding {
    fn provider(&self) -> &EmbeddingProviderInfo {
        &self.provider
    }

    fn embed(&self, ctx: &RequestContext, request: EmbedRequest) -> BoxFuture<'_, Result<EmbeddingVector>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_embedding.embed")?;
            let vector = embed_text_with_dimension(&request.text, self.provider.dimension);
            Ok(EmbeddingVector::from_vec(vector))
        })
    }

    fn embed_batch(
        &self,
        ctx: &RequestContext,
        request: EmbedBatchRequest,
    ) -> BoxFuture<'_, Result<Vec<EmbeddingVector>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_embedding.embed_batch")?;
            let vectors = request
                .texts
                .iter()
                .map(|text| EmbeddingVector::from_vec(embed_text_with_dimension(text, self.provider.dimension)))
                .collect();
            Ok(vectors)
        })
    }
}

/// Fake LLM adapter returning a fixed JSON value for every call, regardless
/// of the requested schema. Useful for exercising callers without a live
/// model; tests that need per-call variation should construct one instance
/// per expected response.
#[derive(Debug, Clone)]
pub struct InMemoryLlm {
    response: Value,
}

impl InMemoryLlm {
    /// Build a fake LLM that always returns `response`.
    #[must_use]
    pub fn new(response: Value) -> Self {
        Self { response }
    }
}

impl LlmPort for InMemoryLlm {
    fn run(&self, ctx: &RequestContext, _request: LlmRequest) -> BoxFuture<'_, Result<Value>> {
        let ctx = ctx.clone();
        let response = self.response.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_llm.run")?;
            Ok(response)
        })
    }
}

/// Fake document extractor returning a single fixed page of text for any
/// upload, regardless of content.
#[derive(Debug, Clone)]
pub struct InMemoryDocumentExtractor {
    text: String,
}

impl InMemoryDocumentExtractor {
    /// Build a fake extractor that always returns `text` as one page.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl DocumentExtractorPort for InMemoryDocumentExtractor {
    fn supported_extensions(&self) -> &[&'static str] {
        &["pdf"]
    }

    fn parse(&self, ctx: &RequestContext, _file: UploadedFile) -> BoxFuture<'_, Result<ParsedDocument>> {
        let ctx = ctx.clone();
        let text = self.text.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_document_extractor.parse")?;
            Ok(ParsedDocument {
                file_type: "pdf".to_owned(),
                processed_at: chrono::Utc::now(),
                processing_method: Some(ProcessingMethod::DirectText),
                pages: vec![ParsedPage {
                    page_number: 1,
                    text,
                    links: Vec::new(),
                }],
            })
        })
    }
}

/// In-memory job queue backed by a single `VecDeque`. Retry scheduling and
/// visibility-timeout reclaim are not modeled; tests that need that
/// behavior should exercise the Redis adapter against a live instance.
#[derive(Default)]
pub struct InMemoryJobQueue {
    queue: Mutex<VecDeque<TaskEnvelope>>,
    next_task_id: AtomicU64,
}

impl InMemoryJobQueue {
    /// Build an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, VecDeque<TaskEnvelope>> {
        self.queue.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl JobQueuePort for InMemoryJobQueue {
    fn enqueue(&self, ctx: &RequestContext, job_id: JobId, file_path: String) -> BoxFuture<'_, Result<String>> {
        let ctx = ctx.clone();
        let task_id = format!("task_{}", self.next_task_id.fetch_add(1, Ordering::Relaxed));
        let task = TaskEnvelope::new(task_id.clone(), job_id, file_path, chrono::Utc::now());
        self.lock_queue().push_back(task);
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_job_queue.enqueue")?;
            Ok(task_id)
        })
    }

    fn dequeue(&self, ctx: &RequestContext, _timeout: Duration) -> BoxFuture<'_, Result<Option<TaskEnvelope>>> {
        let ctx = ctx.clone();
        let task = self.lock_queue().pop_front();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_job_queue.dequeue")?;
            Ok(task)
        })
    }

    fn mark_processing(&self, ctx: &RequestContext, _task: &TaskEnvelope) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_job_queue.mark_processing")?;
            Ok(())
        })
    }

    fn mark_completed(&self, ctx: &RequestContext, _task_id: &str) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_job_queue.mark_completed")?;
            Ok(())
        })
    }

    fn mark_failed(
        &self,
        ctx: &RequestContext,
        mut task: TaskEnvelope,
        retryable: bool,
        _retry_delay: Option<Duration>,
    ) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        if retryable {
            task.record_attempt();
            self.lock_queue().push_back(task);
        }
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_job_queue.mark_failed")?;
            Ok(())
        })
    }

    fn process_retries(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<u64>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_job_queue.process_retries")?;
            Ok(0)
        })
    }

    fn cleanup_expired(&self, ctx: &RequestContext, _visibility_timeout: Duration) -> BoxFuture<'_, Result<u64>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_job_queue.cleanup_expired")?;
            Ok(0)
        })
    }
}

/// In-memory job store, keyed by job id.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: Mutex<Vec<Job>>,
}

impl InMemoryJobStore {
    /// Build an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, Vec<Job>> {
        self.jobs.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl JobStorePort for InMemoryJobStore {
    fn create(&self, ctx: &RequestContext, job_id: JobId, file_path: String) -> BoxFuture<'_, Result<Job>> {
        let ctx = ctx.clone();
        let job = Job::new(job_id, file_path, chrono::Utc::now());
        self.lock_jobs().push(job.clone());
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_job_store.create")?;
            Ok(job)
        })
    }

    fn get(&self, ctx: &RequestContext, job_id: JobId) -> BoxFuture<'_, Result<Option<Job>>> {
        let ctx = ctx.clone();
        let found = self.lock_jobs().iter().find(|job| job.job_id == job_id).cloned();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_job_store.get")?;
            Ok(found)
        })
    }

    fn update(&self, ctx: &RequestContext, job_id: JobId, patch: JobPatch) -> BoxFuture<'_, Result<Option<Job>>> {
        let ctx = ctx.clone();
        let mut jobs = self.lock_jobs();
        let updated = jobs.iter_mut().find(|job| job.job_id == job_id).map(|job| {
            if let Some(status) = patch.status {
                job.status = status;
            }
            if patch.result.is_some() {
                job.result = patch.result.clone();
            }
            if patch.result_url.is_some() {
                job.result_url = patch.result_url.clone();
            }
            if patch.error.is_some() {
                job.error = patch.error.clone();
            }
            job.updated_at = chrono::Utc::now();
            job.clone()
        });
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_job_store.update")?;
            Ok(updated)
        })
    }

    fn delete(&self, ctx: &RequestContext, job_id: JobId) -> BoxFuture<'_, Result<bool>> {
        let ctx = ctx.clone();
        let mut jobs = self.lock_jobs();
        let before = jobs.len();
        jobs.retain(|job| job.job_id != job_id);
        let removed = jobs.len() < before;
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_job_store.delete")?;
            Ok(removed)
        })
    }

    fn list(&self, ctx: &RequestContext, limit: u32) -> BoxFuture<'_, Result<Vec<Job>>> {
        let ctx = ctx.clone();
        let mut jobs = self.lock_jobs().clone();
        jobs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        jobs.truncate(limit as usize);
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_job_store.list")?;
            Ok(jobs)
        })
    }
}

/// Build a `LogEvent` helper for tests.
#[must_use]
pub fn log_event(level: LogLevel, event: &str, message: &str) -> LogEvent {
    LogEvent {
        event: event.to_owned().into_boxed_str(),
        level,
        message: message.to_owned().into_boxed_str(),
        fields: None,
        error: None,
    }
}

/// Build a single-tag map for tests.
#[must_use]
pub fn tags_1(key: &str, value: &str) -> TelemetryTags {
    let mut tags = TelemetryTags::new();
    tags.insert(key.to_owned().into_boxed_str(), value.to_owned().into_boxed_str());
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use resumariner_shared::RequestContext;

    fn ctx() -> RequestContext {
        RequestContext::new_request()
    }

    #[tokio::test]
    async fn in_memory_embedding_is_deterministic() {
        let embedder = InMemoryEmbedding::new(8);
        let one = embedder.embed(&ctx(), "hello".into()).await.expect("embed");
        let two = embedder.embed(&ctx(), "hello".into()).await.expect("embed");
        assert_eq!(one.dimension(), 8);
        assert_eq!(one, two, "same input should embed deterministically");

        let batch = embedder
            .embed_batch(&ctx(), EmbedBatchRequest::from(vec!["a".to_string(), "b".to_string()]))
            .await
            .expect("embed_batch");
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].dimension(), 8);
    }

    #[tokio::test]
    async fn in_memory_llm_returns_fixed_response() {
        let llm = InMemoryLlm::new(serde_json::json!({"ok": true}));
        let request = LlmRequest {
            system_prompt: "system".to_owned(),
            user_prompt: "user".to_owned(),
            schema: serde_json::json!({}),
            options: resumariner_ports::LlmOptions::default(),
        };
        let response = llm.run(&ctx(), request).await.expect("run");
        assert_eq!(response, serde_json::json!({"ok": true}));
    }

    #[tokio::test]
    async fn in_memory_job_queue_round_trips_a_task() {
        let queue = InMemoryJobQueue::new();
        let job_id = JobId::new_random();
        queue
            .enqueue(&ctx(), job_id, "uploads/resume.pdf".to_owned())
            .await
            .expect("enqueue");
        let task = queue
            .dequeue(&ctx(), Duration::from_millis(10))
            .await
            .expect("dequeue")
            .expect("a task should be present");
        assert_eq!(task.job_id, job_id);
    }

    #[tokio::test]
    async fn in_memory_job_store_creates_and_updates() {
        let store = InMemoryJobStore::new();
        let job_id = JobId::new_random();
        store
            .create(&ctx(), job_id, "uploads/resume.pdf".to_owned())
            .await
            .expect("create");
        let updated = store
            .update(
                &ctx(),
                job_id,
                JobPatch {
                    status: Some(JobStatus::Processing),
                    ..Default::default()
                },
            )
            .await
            .expect("update")
            .expect("job should exist");
        assert_eq!(updated.status, JobStatus::Processing);
    }

    #[test]
    fn noop_logger_and_telemetry_are_safe() {
        let logger = NoopLogger;
        let child = logger.child(LogFields::new());
        child.log(log_event(LogLevel::Info, "event", "message"));

        let telemetry = NoopTelemetry;
        telemetry.increment_counter("counter", 1, None);
        telemetry.record_timer_ms("timer", 10, None);
        let timer = telemetry.start_timer("timer2", None);
        timer.stop();
    }
}
