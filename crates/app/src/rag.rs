//! RAG service: three LLM-backed operations that reason over one or more
//! resumes already in the graph/vector stores.
//!
//! Each operation loads its resume(s) via [`GraphStorePort`], optionally
//! pulls supporting vectors via [`VectorDbPort`], and runs one
//! schema-constrained LLM call via [`run_typed`]. A
//! [`TelemetryPort`] timer wraps each call so latency shows up next to the
//! rest of the system's timers without `app` depending on `infra`.

use std::future::Future;
use std::sync::Arc;

use resumariner_domain::{
    CandidateComparison, CandidateScores, ComparisonDimension, InterviewQuestion,
    InterviewQuestionSet, InterviewType, JobMatchExplanation, MatchConcern, MatchRecommendation,
};
use resumariner_ports::{
    EmbedRequest, EmbeddingPort, GraphStorePort, LlmOptions, LlmPort, LlmRequest, TelemetryPort,
    TelemetryTags, Uid, VectorDbPort, VectorSearchOptions, run_typed,
};
use resumariner_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde::Deserialize;
use serde_json::{json, Value};

/// Runs `body` under a telemetry timer named `feature`, and increments a
/// `feature` counter tagged `outcome=success`/`outcome=error` depending on
/// the result. The timer always stops, including on an early `?` return
/// from `body`.
async fn instrumented<T, Fut>(telemetry: &dyn TelemetryPort, feature: &str, body: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    let timer = telemetry.start_timer(feature, None);
    let result = body.await;
    timer.stop();

    let outcome = if result.is_ok() { "success" } else { "error" };
    let mut tags = TelemetryTags::new();
    tags.insert("outcome".into(), outcome.into());
    telemetry.increment_counter(feature, 1, Some(&tags));

    result
}

/// LLM-facing shape of [`JobMatchExplanation`], omitting `uid` since the
/// caller already knows it and the schema never asks the model for it.
#[derive(Debug, Deserialize)]
struct JobMatchExplanationDraft {
    match_score: f64,
    recommendation: MatchRecommendation,
    strengths: Vec<String>,
    #[serde(default)]
    concerns: Vec<MatchConcern>,
    summary: String,
    #[serde(default)]
    discussion_points: Vec<String>,
}

/// LLM-facing shape of [`CandidateComparison`], omitting `ranked_uids` since
/// it is always recomputed from `scores` rather than trusted from the model.
#[derive(Debug, Deserialize)]
struct CandidateComparisonDraft {
    scores: Vec<CandidateScores>,
    dimension_comparisons: Vec<ComparisonDimension>,
    #[serde(default)]
    scenario_recommendations: Vec<String>,
    #[serde(default)]
    risk_assessments: Vec<String>,
}

/// LLM-facing shape of [`InterviewQuestionSet`], omitting `uid` and
/// `interview_type` since both are already known to the caller.
#[derive(Debug, Deserialize)]
struct InterviewQuestionSetDraft {
    questions: Vec<InterviewQuestion>,
    total_duration_minutes: u16,
}

/// Supporting vectors retrieved per [`explain_match`] call, per `spec.md`
/// §4.L's `K=20`.
const EXPLAIN_MATCH_CONTEXT_VECTORS: u32 = 20;

#[derive(Clone)]
pub struct RagDeps {
    pub llm: Arc<dyn LlmPort>,
    pub embedding: Arc<dyn EmbeddingPort>,
    pub vector_db: Arc<dyn VectorDbPort>,
    pub graph_store: Arc<dyn GraphStorePort>,
    pub telemetry: Arc<dyn TelemetryPort>,
}

fn not_found(uid: Uid) -> ErrorEnvelope {
    ErrorEnvelope::expected(ErrorCode::not_found(), format!("resume {uid} not found"))
}

/// Explains how well a resume fits a job description, using up to
/// [`EXPLAIN_MATCH_CONTEXT_VECTORS`] matching embedding points as
/// additional context.
pub async fn explain_match(
    ctx: &RequestContext,
    deps: &RagDeps,
    uid: Uid,
    job_description: &str,
) -> Result<JobMatchExplanation> {
    instrumented(deps.telemetry.as_ref(), "rag.explain_match", async {
        let resume = deps
            .graph_store
            .get_resume(ctx, uid)
            .await?
            .ok_or_else(|| not_found(uid))?;

        let query_vector = deps
            .embedding
            .embed(ctx, EmbedRequest::from(job_description))
            .await?
            .into_vector();
        let supporting_hits = deps
            .vector_db
            .search(
                ctx,
                query_vector.to_vec(),
                VectorSearchOptions {
                    limit: EXPLAIN_MATCH_CONTEXT_VECTORS,
                    min_score: None,
                    filter: resumariner_ports::PayloadFilter::from([(
                        "uid".into(),
                        Value::String(uid.to_string()),
                    )]),
                },
            )
            .await?;
        let supporting_texts: Vec<&str> =
            supporting_hits.iter().map(|hit| hit.point.text.as_str()).collect();

        let resume_json = serde_json::to_value(&resume).unwrap_or(Value::Null);
        let system_prompt = "You are a technical recruiter explaining why a candidate does or does not fit a role."
            .to_string();
        let user_prompt = format!(
            "Resume:\n{resume_json}\n\nMost relevant supporting excerpts:\n{excerpts}\n\nJob description:\n{job_description}",
            excerpts = supporting_texts.join("\n---\n"),
        );
        let request = LlmRequest {
            system_prompt,
            user_prompt,
            schema: job_match_explanation_schema(),
            options: LlmOptions::default(),
        };

        let draft: JobMatchExplanationDraft = run_typed(deps.llm.as_ref(), ctx, request).await?;
        Ok(JobMatchExplanation {
            uid,
            match_score: draft.match_score,
            recommendation: draft.recommendation,
            strengths: draft.strengths,
            concerns: draft.concerns,
            summary: draft.summary,
            discussion_points: draft.discussion_points,
        })
    })
    .await
}

/// Compares 2-5 candidates head-to-head on four fixed dimensions plus an
/// overall weighted score; `ranked_uids` is always recomputed from
/// `overall_score` rather than trusted from the LLM response.
pub async fn compare_candidates(
    ctx: &RequestContext,
    deps: &RagDeps,
    uids: Vec<Uid>,
    criteria: Option<&str>,
    job_context: Option<&str>,
) -> Result<CandidateComparison> {
    instrumented(deps.telemetry.as_ref(), "rag.compare_candidates", async {
        if !(2..=5).contains(&uids.len()) {
            return Err(ErrorEnvelope::invariant(
                ErrorCode::new("rag", "invalid_candidate_count"),
                "compare_candidates requires 2 to 5 candidates",
            ));
        }

        let resumes = deps.graph_store.get_resumes_by_ids(ctx, uids.clone()).await?;
        if resumes.len() != uids.len() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::not_found(),
                "one or more candidates were not found",
            ));
        }
        let resumes_json = serde_json::to_value(&resumes).unwrap_or(Value::Null);

        let system_prompt = "You are a hiring panel lead comparing finalist candidates head-to-head.".to_string();
        let user_prompt = format!(
            "Candidates:\n{resumes_json}\n\nExtra criteria: {criteria}\n\nJob context: {job_context}\n\n\
             Score each candidate 0-10 on technical_depth, experience_relevance, growth_trajectory, and \
             role_fit, and compute overall_score as their average.",
            criteria = criteria.unwrap_or("none"),
            job_context = job_context.unwrap_or("none"),
        );
        let request = LlmRequest {
            system_prompt,
            user_prompt,
            schema: candidate_comparison_schema(),
            options: LlmOptions::default(),
        };

        let draft: CandidateComparisonDraft = run_typed(deps.llm.as_ref(), ctx, request).await?;
        let mut ranked = draft.scores.clone();
        ranked.sort_by(|a, b| b.overall_score.partial_cmp(&a.overall_score).unwrap_or(std::cmp::Ordering::Equal));
        let ranked_uids = ranked.into_iter().map(|score| score.uid).collect();
        Ok(CandidateComparison {
            scores: draft.scores,
            dimension_comparisons: draft.dimension_comparisons,
            scenario_recommendations: draft.scenario_recommendations,
            risk_assessments: draft.risk_assessments,
            ranked_uids,
        })
    })
    .await
}

/// Generates a 6-12 question interview plan for one candidate.
pub async fn generate_interview_questions(
    ctx: &RequestContext,
    deps: &RagDeps,
    uid: Uid,
    interview_type: InterviewType,
    role_context: Option<&str>,
    focus_areas: &[String],
) -> Result<InterviewQuestionSet> {
    instrumented(deps.telemetry.as_ref(), "rag.generate_interview_questions", async {
        let resume = deps
            .graph_store
            .get_resume(ctx, uid)
            .await?
            .ok_or_else(|| not_found(uid))?;
        let resume_json = serde_json::to_value(&resume).unwrap_or(Value::Null);

        let system_prompt = "You are an interview panel designer building a structured question set.".to_string();
        let user_prompt = format!(
            "Resume:\n{resume_json}\n\nInterview type: {interview_type:?}\nRole context: {role_context}\n\
             Focus areas: {focus_areas}",
            role_context = role_context.unwrap_or("none"),
            focus_areas = focus_areas.join(", "),
        );
        let request = LlmRequest {
            system_prompt,
            user_prompt,
            schema: interview_question_set_schema(),
            options: LlmOptions::default(),
        };

        let draft: InterviewQuestionSetDraft = run_typed(deps.llm.as_ref(), ctx, request).await?;
        Ok(InterviewQuestionSet {
            uid,
            interview_type,
            questions: draft.questions,
            total_duration_minutes: draft.total_duration_minutes,
        })
    })
    .await
}

fn job_match_explanation_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "match_score": {"type": "number", "minimum": 0.0, "maximum": 1.0},
            "recommendation": {"type": "string", "enum": ["strong_fit", "moderate_fit", "weak_fit"]},
            "strengths": {"type": "array", "minItems": 1, "maxItems": 5, "items": {"type": "string"}},
            "concerns": {
                "type": "array",
                "maxItems": 5,
                "items": {
                    "type": "object",
                    "properties": {
                        "description": {"type": "string"},
                        "severity": {"type": "string", "enum": ["critical", "moderate", "minor"]}
                    },
                    "required": ["description", "severity"]
                }
            },
            "summary": {"type": "string", "minLength": 50, "maxLength": 500},
            "discussion_points": {"type": "array", "maxItems": 3, "items": {"type": "string"}}
        },
        "required": ["match_score", "recommendation", "strengths", "summary"]
    })
}

fn candidate_comparison_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "scores": {
                "type": "array",
                "minItems": 2,
                "maxItems": 5,
                "items": {
                    "type": "object",
                    "properties": {
                        "uid": {"type": "string"},
                        "technical_depth": {"type": "number", "minimum": 0.0, "maximum": 10.0},
                        "experience_relevance": {"type": "number", "minimum": 0.0, "maximum": 10.0},
                        "growth_trajectory": {"type": "number", "minimum": 0.0, "maximum": 10.0},
                        "role_fit": {"type": "number", "minimum": 0.0, "maximum": 10.0},
                        "overall_score": {"type": "number", "minimum": 0.0, "maximum": 10.0}
                    }
                }
            },
            "dimension_comparisons": {"type": "array", "minItems": 4, "maxItems": 8},
            "scenario_recommendations": {"type": "array", "items": {"type": "string"}},
            "risk_assessments": {"type": "array", "items": {"type": "string"}},
            "ranked_uids": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["scores", "dimension_comparisons"]
    })
}

fn interview_question_set_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "questions": {
                "type": "array",
                "minItems": 6,
                "maxItems": 12,
                "items": {
                    "type": "object",
                    "properties": {
                        "question": {"type": "string"},
                        "category": {
                            "type": "string",
                            "enum": ["technical_skill", "system_design", "behavioral", "culture_fit", "leadership"]
                        },
                        "difficulty": {"type": "string", "enum": ["junior", "mid", "senior", "staff"]},
                        "follow_ups": {"type": "array", "minItems": 1, "maxItems": 4, "items": {"type": "string"}},
                        "red_flags": {"type": "array", "minItems": 1, "maxItems": 3, "items": {"type": "string"}},
                        "good_answer_indicators": {"type": "array", "minItems": 1, "maxItems": 3, "items": {"type": "string"}},
                        "time_estimate_minutes": {"type": "integer", "minimum": 2, "maximum": 15}
                    },
                    "required": ["question", "category", "difficulty"]
                }
            },
            "total_duration_minutes": {"type": "integer", "minimum": 30, "maximum": 90}
        },
        "required": ["questions", "total_duration_minutes"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_match_explanation_schema_bounds_summary_length() {
        let schema = job_match_explanation_schema();
        assert_eq!(schema["properties"]["summary"]["minLength"], 50);
        assert_eq!(schema["properties"]["summary"]["maxLength"], 500);
    }

    #[test]
    fn candidate_comparison_schema_bounds_candidate_count() {
        let schema = candidate_comparison_schema();
        assert_eq!(schema["properties"]["scores"]["minItems"], 2);
        assert_eq!(schema["properties"]["scores"]["maxItems"], 5);
    }

    #[test]
    fn interview_question_set_schema_bounds_question_count() {
        let schema = interview_question_set_schema();
        assert_eq!(schema["properties"]["questions"]["minItems"], 6);
        assert_eq!(schema["properties"]["questions"]["maxItems"], 12);
    }
}
