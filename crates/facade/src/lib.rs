//! # resumariner-facade
//!
//! Thin façade over the assembled backend: configuration loading, upload
//! storage, and the ingestion/search/review/RAG use cases, composed into
//! one handle that `bins/cli` (and any future HTTP surface) drives without
//! touching `infra`'s factories or `app`'s per-use-case dependency bundles
//! directly.

use resumariner_config::{BackendEnv, ValidatedBackendConfig, load_backend_config_from_path};
use resumariner_domain::{
    CandidateComparison, HybridWeights, InterviewQuestionSet, InterviewType, Job, JobId,
    JobMatchExplanation, SearchFilters, SearchMode, Uid,
};
use resumariner_infra::{BackendDeps, WorkerRuntime, build_deps, save_uploaded_file};
use resumariner_shared::{ErrorEnvelope, RequestContext, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub use resumariner_app::SearchHit;
pub use resumariner_core::{BuildInfo, build_info};
pub use resumariner_infra::{InfraError, InfraResult, is_secret_key, redact_if_secret};

/// Re-export the v1 wire DTOs and the error-envelope conversion so callers
/// that speak JSON (an HTTP surface, `bins/cli`'s `--json` output) never
/// need to depend on `resumariner-api` directly.
pub use resumariner_api::v1;

/// Load and validate the effective backend config, returning deterministic
/// pretty JSON, without standing up any adapter.
pub fn load_effective_config_json(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
) -> InfraResult<String> {
    resumariner_infra::load_effective_config_json(env, config_path)
}

/// Validate that the provided env overrides can be parsed and merged into a
/// config, without standing up any adapter.
pub fn validate_env_parsing(env: &BTreeMap<String, String>) -> InfraResult<()> {
    resumariner_infra::validate_env_parsing(env)
}

/// A fully assembled backend: every adapter wired up, ready to run the
/// ingestion, search, and RAG use cases.
pub struct Facade {
    deps: BackendDeps,
    config: ValidatedBackendConfig,
    upload_dir: PathBuf,
}

impl Facade {
    /// Load config from the environment and an optional file, build every
    /// adapter, and return a ready-to-use façade. Uploaded files are
    /// written under `upload_dir`.
    pub fn init(config_path: Option<&Path>, upload_dir: PathBuf) -> InfraResult<Self> {
        let env = BackendEnv::from_std_env().map_err(ErrorEnvelope::from)?;
        let config = load_backend_config_from_path(config_path, &env)?;
        let deps = build_deps(&config, &env)?;
        Ok(Self { deps, config, upload_dir })
    }

    /// Save an uploaded file, create its job record, and enqueue it for
    /// the worker pool to pick up. Returns the freshly created job.
    pub async fn submit_ingestion_job(
        &self,
        ctx: &RequestContext,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Job> {
        let job_id = JobId::new_random();
        let limits = self.config.ingest_limits;
        let file_path =
            save_uploaded_file(&self.upload_dir, job_id, file_name, &bytes, limits).await?;
        let job = self
            .deps
            .ingestion
            .job_store
            .create(ctx, job_id, file_path.clone())
            .await?;
        self.deps.ingestion.job_queue.enqueue(ctx, job_id, file_path).await?;
        Ok(job)
    }

    /// Fetch the current state of a job.
    pub async fn get_job(&self, ctx: &RequestContext, job_id: JobId) -> Result<Option<Job>> {
        self.deps.ingestion.job_store.get(ctx, job_id).await
    }

    /// List the most recently created jobs, newest first.
    pub async fn list_jobs(&self, ctx: &RequestContext, limit: u32) -> Result<Vec<Job>> {
        self.deps.ingestion.job_store.list(ctx, limit).await
    }

    /// Delete a job record.
    pub async fn delete_job(&self, ctx: &RequestContext, job_id: JobId) -> Result<bool> {
        self.deps.ingestion.job_store.delete(ctx, job_id).await
    }

    /// Run semantic, structured, or hybrid search over stored resumes.
    #[allow(clippy::too_many_arguments, reason = "mirrors app::search::search's parameter list one-for-one")]
    pub async fn search(
        &self,
        ctx: &RequestContext,
        mode: SearchMode,
        query: Option<String>,
        filters: SearchFilters,
        limit: u32,
        min_score: Option<f32>,
        weights: Option<HybridWeights>,
    ) -> Result<Vec<SearchHit>> {
        resumariner_app::search(ctx, &self.deps.search, mode, query, filters, limit, min_score, weights).await
    }

    /// Explain how well one resume fits a job description.
    pub async fn explain_match(
        &self,
        ctx: &RequestContext,
        uid: Uid,
        job_description: &str,
    ) -> Result<JobMatchExplanation> {
        resumariner_app::explain_match(ctx, &self.deps.rag, uid, job_description).await
    }

    /// Compare 2-5 candidates head-to-head.
    pub async fn compare_candidates(
        &self,
        ctx: &RequestContext,
        uids: Vec<Uid>,
        criteria: Option<&str>,
        job_context: Option<&str>,
    ) -> Result<CandidateComparison> {
        resumariner_app::compare_candidates(ctx, &self.deps.rag, uids, criteria, job_context).await
    }

    /// Generate an interview question set for a candidate.
    pub async fn generate_interview_questions(
        &self,
        ctx: &RequestContext,
        uid: Uid,
        interview_type: InterviewType,
        role_context: Option<&str>,
        focus_areas: &[String],
    ) -> Result<InterviewQuestionSet> {
        resumariner_app::generate_interview_questions(
            ctx,
            &self.deps.rag,
            uid,
            interview_type,
            role_context,
            focus_areas,
        )
        .await
    }

    /// Spawn the ingestion worker and cleanup loops, sharing this façade's
    /// assembled ingestion dependencies.
    #[must_use]
    pub fn spawn_worker(&self, poll_timeout: Duration, visibility_timeout: Duration) -> WorkerRuntime {
        WorkerRuntime::spawn(Arc::clone(&self.deps.ingestion), poll_timeout, visibility_timeout)
    }
}

/// Returns the facade crate version.
#[must_use]
pub const fn facade_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use resumariner_api::api_crate_version;
    use resumariner_app::app_crate_version;
    use resumariner_infra::infra_crate_version;

    #[test]
    fn facade_crate_compiles() {
        let version = facade_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn facade_can_use_infra_api_app() {
        let infra_version = infra_crate_version();
        let api_version = api_crate_version();
        let app_version_value = app_crate_version();

        assert!(!infra_version.is_empty());
        assert!(!api_version.is_empty());
        assert!(!app_version_value.is_empty());
    }

    #[test]
    fn build_info_is_available_through_the_facade() {
        let info = build_info();
        assert!(!info.name.is_empty());
        assert!(!info.version.is_empty());
    }
}
