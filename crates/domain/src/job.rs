//! Ingestion job records and the task envelope that rides the job queue.

use crate::primitives::JobId;
use crate::resume::Resume;
use crate::review::ReviewResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Job lifecycle state. Transitions strictly `Pending -> Processing ->
/// (Completed | Failed)`; there is no path back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Enqueued, not yet picked up by a worker.
    Pending,
    /// A worker has claimed the job and is running the pipeline.
    Processing,
    /// The pipeline finished successfully.
    Completed,
    /// The pipeline failed terminally (non-retryable, or retries exhausted).
    Failed,
}

impl JobStatus {
    /// Whether this status is terminal (no further transitions expected).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Successful pipeline output attached to a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    /// The structured, persisted resume.
    pub resume: Resume,
    /// Review feedback, when review was requested for the job.
    pub review: Option<ReviewResult>,
    /// Free-form pipeline metadata (timings, model versions, etc.).
    #[serde(default)]
    pub metadata: std::collections::BTreeMap<String, String>,
}

/// Durable record of one ingestion job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Job identifier.
    pub job_id: JobId,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Path to the uploaded file this job processes.
    pub file_path: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent state change.
    pub updated_at: DateTime<Utc>,
    /// Pipeline output, present only once `status == Completed`.
    pub result: Option<JobResult>,
    /// URL to fetch the full result when it is too large to inline.
    pub result_url: Option<String>,
    /// Sanitized, client-safe failure message, present only once
    /// `status == Failed`.
    pub error: Option<String>,
}

impl Job {
    /// Construct a freshly-enqueued job in the `Pending` state.
    #[must_use]
    pub fn new(job_id: JobId, file_path: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            job_id,
            status: JobStatus::Pending,
            file_path: file_path.into(),
            created_at: now,
            updated_at: now,
            result: None,
            result_url: None,
            error: None,
        }
    }

    /// Transition to `Processing`.
    pub fn mark_processing(&mut self, now: DateTime<Utc>) {
        self.status = JobStatus::Processing;
        self.updated_at = now;
    }

    /// Transition to `Completed`, attaching the pipeline result.
    pub fn mark_completed(&mut self, result: JobResult, now: DateTime<Utc>) {
        self.status = JobStatus::Completed;
        self.result = Some(result);
        self.error = None;
        self.updated_at = now;
    }

    /// Transition to `Failed`, attaching a sanitized error message.
    pub fn mark_failed(&mut self, error: impl Into<String>, now: DateTime<Utc>) {
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.updated_at = now;
    }
}

/// Queue envelope wrapping a job for delivery through the FIFO/retry/in-flight
/// structures described in `SPEC_FULL.md` §4.B.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEnvelope {
    /// Identifier for this specific delivery attempt chain.
    pub task_id: String,
    /// Job this task drives.
    pub job_id: JobId,
    /// Path to the uploaded file.
    pub file_path: String,
    /// Number of times this task has been dequeued.
    pub attempts: u32,
    /// When the task was first enqueued.
    pub enqueued_at: DateTime<Utc>,
}

impl TaskEnvelope {
    /// Build a fresh task envelope with `attempts = 0`.
    #[must_use]
    pub fn new(task_id: impl Into<String>, job_id: JobId, file_path: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            task_id: task_id.into(),
            job_id,
            file_path: file_path.into(),
            attempts: 0,
            enqueued_at: now,
        }
    }

    /// Increment the attempt counter ahead of a redelivery.
    pub fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).single().expect("valid timestamp")
    }

    #[test]
    fn job_transitions_to_processing_then_completed() {
        let mut job = Job::new(JobId::new_random(), "uploads/a.pdf", at(0));
        assert_eq!(job.status, JobStatus::Pending);

        job.mark_processing(at(1));
        assert_eq!(job.status, JobStatus::Processing);

        let result = JobResult {
            resume: serde_json::from_value(serde_json::json!({
                "personal_info": {
                    "name": "Max",
                    "resume_lang": "en",
                    "contact": {"email": "max@example.com"}
                }
            }))
            .expect("minimal resume parses"),
            review: None,
            metadata: std::collections::BTreeMap::new(),
        };
        job.mark_completed(result, at(2));
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.status.is_terminal());
        assert!(job.error.is_none());
    }

    #[test]
    fn job_failure_clears_no_prior_result() {
        let mut job = Job::new(JobId::new_random(), "uploads/a.pdf", at(0));
        job.mark_failed("processing_error", at(1));
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("processing_error"));
    }

    #[test]
    fn task_envelope_tracks_attempts() {
        let mut task = TaskEnvelope::new("t1", JobId::new_random(), "uploads/a.pdf", at(0));
        assert_eq!(task.attempts, 0);
        task.record_attempt();
        task.record_attempt();
        assert_eq!(task.attempts, 2);
    }
}
