//! Resume ingestion: parse -> structure -> embed -> persist -> review.
//!
//! The pipeline is a typestate state machine so a caller cannot, at compile
//! time, call `persisted()` before `embedded()`. The allowed-transition
//! table is a plain const array rather than generated code.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use resumariner_domain::{
    EmbeddingPoint, EmbeddingSource, JobId, JobResult, JobStatus, Resume, TaskEnvelope, Uid,
};
use resumariner_ports::{
    DocumentExtractorPort, EmbedBatchRequest, EmbeddingPort, GraphStorePort, JobPatch,
    JobQueuePort, JobStorePort, LlmPort, UploadedFile, VectorDbPort,
};
use resumariner_shared::{
    ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result, RetryPolicy, backoff_delay,
};

use crate::reviewer;
use crate::structurer;

/// Backoff applied between ingestion job retries: base 4s, capped at 60s,
/// with +/-20% jitter. `max_attempts` is unused here since whether a retry
/// happens at all is governed by the job queue's own `max_retries`.
const JOB_RETRY_BACKOFF: RetryPolicy = RetryPolicy {
    max_attempts: u32::MAX,
    base_delay_ms: 4_000,
    max_delay_ms: 60_000,
    jitter_ratio_pct: 20,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IngestionPipelineState {
    Pending,
    Parsed,
    Structured,
    Embedded,
    Persisted,
    Completed,
}

impl IngestionPipelineState {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Parsed => "parsed",
            Self::Structured => "structured",
            Self::Embedded => "embedded",
            Self::Persisted => "persisted",
            Self::Completed => "completed",
        }
    }
}

const INGESTION_PIPELINE_TRANSITIONS: &[(IngestionPipelineState, IngestionPipelineState)] = &[
    (IngestionPipelineState::Pending, IngestionPipelineState::Parsed),
    (IngestionPipelineState::Parsed, IngestionPipelineState::Structured),
    (IngestionPipelineState::Structured, IngestionPipelineState::Embedded),
    (IngestionPipelineState::Embedded, IngestionPipelineState::Persisted),
    (IngestionPipelineState::Persisted, IngestionPipelineState::Completed),
];

fn is_allowed_transition(from: IngestionPipelineState, to: IngestionPipelineState) -> bool {
    INGESTION_PIPELINE_TRANSITIONS
        .iter()
        .any(|(source, target)| *source == from && *target == to)
}

struct IngestionPipelineFsm {
    state: IngestionPipelineState,
}

impl IngestionPipelineFsm {
    const fn new() -> Self {
        Self {
            state: IngestionPipelineState::Pending,
        }
    }

    fn transition(&mut self, next: IngestionPipelineState) -> Result<()> {
        if is_allowed_transition(self.state, next) {
            self.state = next;
            return Ok(());
        }
        Err(ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!(
                "invalid ingestion pipeline transition: {} -> {}",
                self.state.as_str(),
                next.as_str()
            ),
            ErrorClass::NonRetriable,
        ))
    }
}

struct Pending;
struct Parsed;
struct Structured;
struct Embedded;
struct Persisted;
struct Completed;

struct IngestionPipeline<S> {
    fsm: IngestionPipelineFsm,
    _state: PhantomData<S>,
}

impl IngestionPipeline<Pending> {
    const fn new() -> Self {
        Self {
            fsm: IngestionPipelineFsm::new(),
            _state: PhantomData,
        }
    }

    fn parsed(self) -> Result<IngestionPipeline<Parsed>> {
        self.transition(IngestionPipelineState::Parsed)
    }
}

impl IngestionPipeline<Parsed> {
    fn structured(self) -> Result<IngestionPipeline<Structured>> {
        self.transition(IngestionPipelineState::Structured)
    }
}

impl IngestionPipeline<Structured> {
    fn embedded(self) -> Result<IngestionPipeline<Embedded>> {
        self.transition(IngestionPipelineState::Embedded)
    }
}

impl IngestionPipeline<Embedded> {
    fn persisted(self) -> Result<IngestionPipeline<Persisted>> {
        self.transition(IngestionPipelineState::Persisted)
    }
}

impl IngestionPipeline<Persisted> {
    fn completed(self) -> Result<IngestionPipeline<Completed>> {
        self.transition(IngestionPipelineState::Completed)
    }
}

impl<S> IngestionPipeline<S> {
    fn transition<T>(self, next: IngestionPipelineState) -> Result<IngestionPipeline<T>> {
        let mut fsm = self.fsm;
        fsm.transition(next)?;
        Ok(IngestionPipeline {
            fsm,
            _state: PhantomData,
        })
    }
}

/// Ports required to ingest one resume and to run the worker loop.
#[derive(Clone)]
pub struct IngestionDeps {
    pub document_extractor: Arc<dyn DocumentExtractorPort>,
    pub llm: Arc<dyn LlmPort>,
    pub embedding: Arc<dyn EmbeddingPort>,
    pub vector_db: Arc<dyn VectorDbPort>,
    pub graph_store: Arc<dyn GraphStorePort>,
    pub job_store: Arc<dyn JobStorePort>,
    pub job_queue: Arc<dyn JobQueuePort>,
}

/// One unit of ingestion work: an uploaded file already read into memory.
pub struct IngestionInput {
    pub job_id: JobId,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub request_review: bool,
}

/// Run the full pipeline for one resume, returning the job result.
///
/// Review generation is best-effort: a failure there is recorded in
/// `metadata["review_error"]` rather than failing the job, matching the
/// non-fatal review contract.
pub async fn ingest_one(
    ctx: &RequestContext,
    deps: &IngestionDeps,
    input: IngestionInput,
) -> Result<JobResult> {
    let pipeline = IngestionPipeline::<Pending>::new();

    let uploaded = UploadedFile {
        file_name: input.file_name,
        bytes: input.bytes,
    };
    let parsed_document = deps.document_extractor.parse(ctx, uploaded).await?;
    let pipeline = pipeline.parsed()?;

    let mut resume = structurer::structure_resume(ctx, deps.llm.as_ref(), &parsed_document).await?;
    let pipeline = pipeline.structured()?;

    let uid = deps.graph_store.upsert_resume(ctx, resume.clone()).await?;
    resume.uid = Some(uid);
    let points = build_embedding_points(ctx, deps.embedding.as_ref(), &resume, uid).await?;
    let pipeline = pipeline.embedded()?;

    deps.vector_db.delete_resume_vectors(ctx, uid).await?;
    if !points.is_empty() {
        deps.vector_db.store_vectors(ctx, uid, points).await?;
    }
    let pipeline = pipeline.persisted()?;

    let mut metadata = BTreeMap::new();
    let review = match reviewer::review_resume(ctx, deps.llm.as_ref(), &resume).await {
        Ok(review) => Some(review),
        Err(error) => {
            metadata.insert("review_error".to_string(), error.message.clone());
            None
        }
    };
    let _pipeline = pipeline.completed()?;

    Ok(JobResult {
        resume,
        review,
        metadata,
    })
}

/// Deterministic embedding source text, in extraction order: summary, then
/// one item per skill, employment key-point, project key-point, and
/// education extra.
fn collect_embedding_items(resume: &Resume) -> Vec<(String, EmbeddingSource, Option<String>)> {
    let mut items = Vec::new();

    if let Some(summary) = resume
        .professional_profile
        .as_ref()
        .and_then(|profile| profile.summary.as_ref())
    {
        items.push((summary.clone(), EmbeddingSource::Summary, None));
    }

    for skill in &resume.skills {
        items.push((skill.name.clone(), EmbeddingSource::Skill, None));
    }

    for employment in &resume.employment_history {
        for key_point in &employment.key_points {
            items.push((
                key_point.text.clone(),
                EmbeddingSource::Employment,
                Some(employment.position.clone()),
            ));
        }
    }

    for project in &resume.projects {
        for key_point in &project.key_points {
            items.push((
                key_point.text.clone(),
                EmbeddingSource::Project,
                Some(project.title.clone()),
            ));
        }
    }

    for education in &resume.education {
        let context = education.qualification.as_ref().map_or_else(
            || education.institution.name.clone(),
            |qualification| format!("{qualification} at {}", education.institution.name),
        );
        for extra in &education.extras {
            items.push((
                extra.text.clone(),
                EmbeddingSource::Education,
                Some(context.clone()),
            ));
        }
    }

    items
}

async fn build_embedding_points(
    ctx: &RequestContext,
    embedding: &dyn EmbeddingPort,
    resume: &Resume,
    uid: Uid,
) -> Result<Vec<EmbeddingPoint>> {
    let items = collect_embedding_items(resume);
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let texts: Vec<String> = items.iter().map(|(text, _, _)| text.clone()).collect();
    let vectors = embedding
        .embed_batch(ctx, EmbedBatchRequest::from(texts))
        .await?;

    let name = resume.personal_info.name.clone();
    let email = resume.personal_info.contact.email.clone();
    let skills: Vec<String> = resume.skills.iter().map(|skill| skill.name.clone()).collect();
    let technologies: Vec<String> = resume.technologies().into_iter().collect();
    let companies: Vec<String> = resume
        .employment_history
        .iter()
        .filter_map(|item| item.company.as_ref().map(|company| company.name.clone()))
        .collect();
    let role = resume
        .professional_profile
        .as_ref()
        .and_then(|profile| profile.preferences.as_ref())
        .map(|preferences| preferences.role.clone());
    let location = resume
        .personal_info
        .demographics
        .as_ref()
        .and_then(|demographics| demographics.current_location.as_ref())
        .map(format_location);
    let years_experience = resume.years_of_experience();

    let mut points = Vec::with_capacity(items.len());
    for ((text, source, context), vector) in items.into_iter().zip(vectors) {
        points.push(EmbeddingPoint {
            id: uuid::Uuid::new_v4(),
            uid,
            vector: vector.as_slice().to_vec(),
            text,
            source,
            context,
            name: name.clone(),
            email: email.clone(),
            skills: skills.clone(),
            technologies: technologies.clone(),
            companies: companies.clone(),
            role: role.clone(),
            location: location.clone(),
            years_experience,
        });
    }
    Ok(points)
}

fn format_location(location: &resumariner_domain::Location) -> String {
    [&location.city, &location.state, &location.country]
        .into_iter()
        .flatten()
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Drain the job queue forever, ingesting one resume per dequeued task.
/// Returns only on cancellation or a non-retriable queue error.
pub async fn run_worker(
    ctx: &RequestContext,
    deps: &IngestionDeps,
    poll_timeout: Duration,
) -> Result<()> {
    loop {
        if ctx.is_cancelled() {
            return Ok(());
        }
        deps.job_queue.process_retries(ctx).await?;

        let Some(task) = deps.job_queue.dequeue(ctx, poll_timeout).await? else {
            continue;
        };
        process_task(ctx, deps, task).await;
    }
}

/// Remove queue entries past their visibility timeout. Intended to be
/// invoked periodically by a separate maintenance task from `run_worker`.
pub async fn run_cleanup(
    ctx: &RequestContext,
    deps: &IngestionDeps,
    visibility_timeout: Duration,
) -> Result<u64> {
    deps.job_queue.cleanup_expired(ctx, visibility_timeout).await
}

async fn process_task(ctx: &RequestContext, deps: &IngestionDeps, task: TaskEnvelope) {
    if deps.job_queue.mark_processing(ctx, &task).await.is_err() {
        return;
    }
    let _ = deps
        .job_store
        .update(
            ctx,
            task.job_id,
            JobPatch {
                status: Some(JobStatus::Processing),
                result: None,
                result_url: None,
                error: None,
            },
        )
        .await;

    let bytes = match tokio::fs::read(&task.file_path).await {
        Ok(bytes) => bytes,
        Err(io_error) => {
            let error = ErrorEnvelope::expected_with_class(
                ErrorCode::io(),
                format!("failed to read uploaded file: {io_error}"),
                ErrorClass::Retriable,
            );
            fail_task(ctx, deps, task, &error).await;
            return;
        }
    };
    let file_name = Path::new(&task.file_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| task.file_path.clone());

    let job_id = task.job_id;
    let task_id = task.task_id.clone();
    let input = IngestionInput {
        job_id,
        file_name,
        bytes,
        request_review: true,
    };

    match ingest_one(ctx, deps, input).await {
        Ok(result) => {
            let _ = deps
                .job_store
                .update(
                    ctx,
                    job_id,
                    JobPatch {
                        status: Some(JobStatus::Completed),
                        result: Some(result),
                        result_url: None,
                        error: None,
                    },
                )
                .await;
            let _ = deps.job_queue.mark_completed(ctx, &task_id).await;
        }
        Err(error) => fail_task(ctx, deps, task, &error).await,
    }
}

async fn fail_task(ctx: &RequestContext, deps: &IngestionDeps, task: TaskEnvelope, error: &ErrorEnvelope) {
    let _ = deps
        .job_store
        .update(
            ctx,
            task.job_id,
            JobPatch {
                status: Some(JobStatus::Failed),
                result: None,
                result_url: None,
                error: Some(error.message.clone()),
            },
        )
        .await;
    let retryable = error.class.is_retriable();
    let attempt = task.attempts.saturating_add(1);
    let delay = backoff_delay(JOB_RETRY_BACKOFF, attempt);
    let _ = deps.job_queue.mark_failed(ctx, task, retryable, Some(delay)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use resumariner_domain::{
        EducationExtra, EducationItem, EducationStatus, EmploymentDuration, EmploymentHistoryItem,
        EmploymentType, InstitutionInfo, KeyPoint, PersonalInfo, Preferences, ProfessionalProfile,
        Project, Skill, WorkMode,
    };
    use resumariner_domain::Contact;

    fn sample_resume() -> Resume {
        Resume {
            uid: None,
            personal_info: PersonalInfo {
                name: "Max".to_string(),
                resume_lang: "en".to_string(),
                contact: Contact {
                    email: "max@example.com".to_string(),
                    phone: None,
                    links: None,
                },
                demographics: None,
            },
            professional_profile: Some(ProfessionalProfile {
                summary: Some("Backend engineer".to_string()),
                preferences: Some(Preferences {
                    role: "Staff Engineer".to_string(),
                    employment_types: vec![],
                    work_modes: vec![],
                    salary: None,
                }),
            }),
            skills: vec![Skill {
                name: "Rust".to_string(),
            }],
            employment_history: vec![EmploymentHistoryItem {
                position: "Engineer".to_string(),
                employment_type: EmploymentType::FullTime,
                work_mode: WorkMode::Remote,
                company: None,
                duration: EmploymentDuration {
                    date_format: "YYYY.MM".to_string(),
                    start: "2020.01".to_string(),
                    end: "2023.01".to_string(),
                    duration_months: 36,
                },
                location: None,
                key_points: vec![KeyPoint {
                    text: "Shipped the thing".to_string(),
                }],
                technologies: vec![],
            }],
            projects: vec![Project {
                title: "Side project".to_string(),
                url: None,
                technologies: vec![],
                key_points: vec![KeyPoint {
                    text: "Built a tool".to_string(),
                }],
            }],
            education: vec![EducationItem {
                qualification: Some("BSc".to_string()),
                field: "Computer Science".to_string(),
                institution: InstitutionInfo {
                    name: "State University".to_string(),
                },
                location: None,
                start: None,
                end: None,
                status: EducationStatus::Completed,
                coursework: vec![],
                extras: vec![EducationExtra {
                    text: "Graduated with honors".to_string(),
                }],
            }],
            courses: vec![],
            certifications: vec![],
            language_proficiency: vec![],
            awards: vec![],
            scientific_contributions: vec![],
        }
    }

    #[test]
    fn embedding_items_follow_deterministic_order() {
        let resume = sample_resume();
        let items = collect_embedding_items(&resume);
        let sources: Vec<EmbeddingSource> = items.iter().map(|(_, source, _)| *source).collect();
        assert_eq!(
            sources,
            vec![
                EmbeddingSource::Summary,
                EmbeddingSource::Skill,
                EmbeddingSource::Employment,
                EmbeddingSource::Project,
                EmbeddingSource::Education,
            ]
        );
        assert_eq!(items[2].2, Some("Engineer".to_string()));
        assert_eq!(items[3].2, Some("Side project".to_string()));
        assert_eq!(items[4].2, Some("BSc at State University".to_string()));
    }

    #[test]
    fn pipeline_rejects_out_of_order_transitions() {
        let pipeline = IngestionPipeline::<Pending>::new();
        let pipeline = pipeline.parsed().expect("pending -> parsed");
        let pipeline = pipeline.structured().expect("parsed -> structured");
        // Compile-time: `pipeline` has no `.persisted()` method here, only
        // `.embedded()`. Exercise the runtime guard directly instead.
        let mut fsm = pipeline.fsm;
        let result = fsm.transition(IngestionPipelineState::Persisted);
        assert!(result.is_err());
    }

    #[test]
    fn empty_resume_has_no_embedding_items() {
        let mut resume = sample_resume();
        resume.professional_profile = None;
        resume.skills.clear();
        resume.employment_history.clear();
        resume.projects.clear();
        resume.education.clear();
        assert!(collect_embedding_items(&resume).is_empty());
    }
}
