//! Wire-format DTOs for the v1 HTTP surface.
//!
//! These types are the boundary between the outside world and the domain
//! model: requests are validated before a caller builds the corresponding
//! `app` use-case input, and responses wrap domain types directly rather
//! than re-deriving their shape.

use resumariner_domain::{
    CandidateComparison, HybridWeights, InterviewQuestionSet, InterviewType, Job,
    JobMatchExplanation, JobResult, JobStatus, ReviewResult, SearchFilters, SearchMode, Uid,
};
use resumariner_shared::{ErrorEnvelope, Validate, ValidationError};
use serde::{Deserialize, Serialize};

/// Error shape returned on every non-2xx v1 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiV1ErrorDto {
    /// Stable `namespace:code` identifier, e.g. `"rag:invalid_candidate_count"`.
    pub code: String,
    /// Human-readable message, safe to show to a caller.
    pub message: String,
    /// Whether retrying the same request might succeed.
    pub retriable: bool,
    /// Correlation id of the request that produced this error, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

/// Convert an internal error envelope into the wire error shape, redacting
/// anything beyond code/message/retriability and attaching the request's
/// correlation id for support lookups.
#[must_use]
pub fn error_envelope_to_api_v1_error(
    error: &ErrorEnvelope,
    correlation_id: Option<&str>,
) -> ApiV1ErrorDto {
    ApiV1ErrorDto {
        code: error.code.to_string(),
        message: error.message.clone(),
        retriable: error.class.is_retriable(),
        correlation_id: correlation_id.map(ToString::to_string),
    }
}

/// Envelope wrapping every v1 response body: either `{"ok": true, "data": ...}`
/// or `{"ok": false, "error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiV1Result<T> {
    /// Successful response carrying the operation's output.
    Ok {
        /// Whether the call succeeded; always `true` on this variant.
        ok: bool,
        /// The operation's output payload.
        data: T,
    },
    /// Failed response carrying an error DTO.
    Err {
        /// Whether the call succeeded; always `false` on this variant.
        ok: bool,
        /// The error that occurred.
        error: ApiV1ErrorDto,
    },
}

impl<T> ApiV1Result<T> {
    /// Build a success envelope.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self::Ok { ok: true, data }
    }

    /// Build a failure envelope.
    #[must_use]
    pub const fn err(error: ApiV1ErrorDto) -> Self {
        Self::Err { ok: false, error }
    }
}

/// Validation failure for a v1 request DTO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiV1ValidationErrorDto {
    /// The field that failed validation.
    pub field: String,
    /// What went wrong with it.
    pub reason: String,
}

impl ValidationError for ApiV1ValidationErrorDto {
    fn empty(field: &'static str) -> Self {
        Self {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        }
    }

    fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    fn out_of_range(field: &'static str, value: String, min: String, max: String) -> Self {
        Self {
            field: field.to_string(),
            reason: format!("{value} is out of range [{min}, {max}]"),
        }
    }
}

impl From<ApiV1ValidationErrorDto> for ApiV1ErrorDto {
    fn from(error: ApiV1ValidationErrorDto) -> Self {
        Self {
            code: format!("validation:{}", error.field),
            message: error.reason,
            retriable: false,
            correlation_id: None,
        }
    }
}

// =============================================================================
// Ingest
// =============================================================================

/// Request body for `POST /v1/jobs`. The uploaded bytes travel alongside
/// this DTO as multipart form data; `file_name` and `file_size` describe
/// the part the server already received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(error = "ApiV1ValidationErrorDto")]
pub struct ApiV1IngestRequestDto {
    /// Original file name, used for extension sniffing and diagnostics.
    #[validate(non_empty)]
    pub file_name: String,
    /// Size of the uploaded file in bytes.
    pub file_size: u64,
    /// Whether to run the review pipeline after structuring.
    #[serde(default)]
    pub request_review: bool,
}

/// Response body for a freshly-created ingestion job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiV1IngestResponseDto {
    /// Identifier of the created job, for polling `/v1/jobs/{job_id}`.
    pub job_id: Uid,
    /// Always `pending` immediately after creation.
    pub status: JobStatus,
}

/// Response body for `GET /v1/jobs/{job_id}`, wrapping the stored job
/// record directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiV1JobStatusResponseDto {
    /// The job record as currently persisted.
    pub job: Job,
}

impl ApiV1JobStatusResponseDto {
    /// Wrap a domain job record.
    #[must_use]
    pub const fn new(job: Job) -> Self {
        Self { job }
    }
}

/// The result payload embedded in a completed job, exposed standalone for
/// callers that already know the job id and only want the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiV1JobResultDto {
    /// The pipeline's structured output.
    pub result: JobResult,
}

// =============================================================================
// Search
// =============================================================================

/// Request body for `POST /v1/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(error = "ApiV1ValidationErrorDto")]
pub struct ApiV1SearchRequestDto {
    /// Which search strategy to run.
    pub mode: SearchMode,
    /// Free-text query; required for `semantic` and `hybrid` modes.
    pub query: Option<String>,
    /// Structured filters; an empty/default value matches everything.
    #[serde(default)]
    pub filters: SearchFilters,
    /// Maximum number of results to return.
    #[validate(range(min = 1, max = 200))]
    pub limit: u32,
    /// Minimum score a hit must reach to be included.
    pub min_score: Option<f32>,
    /// Score-merge weights for `hybrid` mode; defaults to `0.7/0.3` when
    /// omitted.
    pub weights: Option<HybridWeights>,
}

/// A single matched point backing a search hit's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiV1MatchedPointDto {
    /// The matched text fragment.
    pub text: String,
    /// Where the match came from, as a label (e.g. `"skills"`, `"graph"`).
    pub source: String,
    /// Surrounding context, when available.
    pub context: Option<String>,
    /// The component score contributed by this match.
    pub score: f32,
}

/// A single search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiV1SearchHitDto {
    /// Matched resume identifier.
    pub uid: Uid,
    /// Combined score in `[0, 1]`.
    pub score: f64,
    /// Matched points contributing to the score.
    pub matched_points: Vec<ApiV1MatchedPointDto>,
}

/// Response body for `POST /v1/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiV1SearchResponseDto {
    /// Hits ordered by descending score.
    pub hits: Vec<ApiV1SearchHitDto>,
}

// =============================================================================
// Review
// =============================================================================

/// Response body for `GET /v1/jobs/{job_id}/review`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiV1ReviewResponseDto {
    /// The review produced for this job, when review was requested.
    pub review: ReviewResult,
}

// =============================================================================
// RAG: explain match
// =============================================================================

/// Request body for `POST /v1/rag/explain-match`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(error = "ApiV1ValidationErrorDto")]
pub struct ApiV1ExplainMatchRequestDto {
    /// Candidate to evaluate.
    pub uid: Uid,
    /// Job description text to match the candidate against.
    #[validate(non_empty)]
    pub job_description: String,
}

/// Response body for `POST /v1/rag/explain-match`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiV1ExplainMatchResponseDto {
    /// The generated match explanation.
    pub explanation: JobMatchExplanation,
}

// =============================================================================
// RAG: compare candidates
// =============================================================================

/// Request body for `POST /v1/rag/compare-candidates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(error = "ApiV1ValidationErrorDto")]
pub struct ApiV1CompareCandidatesRequestDto {
    /// Candidates to compare; must contain 2 to 5 entries.
    #[validate(custom = "validate_candidate_count")]
    pub uids: Vec<Uid>,
    /// Optional additional comparison criteria.
    pub criteria: Option<String>,
    /// Optional job context to ground the comparison in.
    pub job_context: Option<String>,
}

fn validate_candidate_count(uids: &[Uid]) -> Result<(), ApiV1ValidationErrorDto> {
    if (2..=5).contains(&uids.len()) {
        Ok(())
    } else {
        Err(ApiV1ValidationErrorDto::invalid(
            "uids",
            "compare-candidates requires 2 to 5 candidates",
        ))
    }
}

/// Response body for `POST /v1/rag/compare-candidates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiV1CompareCandidatesResponseDto {
    /// The generated comparison.
    pub comparison: CandidateComparison,
}

// =============================================================================
// RAG: interview questions
// =============================================================================

/// Request body for `POST /v1/rag/interview-questions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(error = "ApiV1ValidationErrorDto")]
pub struct ApiV1InterviewQuestionsRequestDto {
    /// Candidate to generate questions for.
    pub uid: Uid,
    /// Kind of interview being prepared for.
    pub interview_type: InterviewType,
    /// Optional role context to ground question generation in.
    pub role_context: Option<String>,
    /// Optional areas to focus questions on.
    #[serde(default)]
    pub focus_areas: Vec<String>,
}

/// Response body for `POST /v1/rag/interview-questions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiV1InterviewQuestionsResponseDto {
    /// The generated question set.
    pub questions: InterviewQuestionSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_uid() -> Uid {
        Uid::new_random()
    }

    #[test]
    fn ingest_request_rejects_empty_file_name() {
        let request = ApiV1IngestRequestDto {
            file_name: String::new(),
            file_size: 10,
            request_review: false,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn ingest_request_accepts_non_empty_file_name() {
        let request = ApiV1IngestRequestDto {
            file_name: "resume.pdf".to_string(),
            file_size: 10,
            request_review: true,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn search_request_rejects_limit_out_of_range() {
        let request = ApiV1SearchRequestDto {
            mode: SearchMode::Semantic,
            query: Some("rust engineer".to_string()),
            filters: SearchFilters::default(),
            limit: 0,
            min_score: None,
            weights: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn search_request_accepts_valid_limit() {
        let request = ApiV1SearchRequestDto {
            mode: SearchMode::Hybrid,
            query: Some("rust engineer".to_string()),
            filters: SearchFilters::default(),
            limit: 20,
            min_score: Some(0.5),
            weights: Some(HybridWeights::default()),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn compare_candidates_rejects_too_few_uids() {
        let request = ApiV1CompareCandidatesRequestDto {
            uids: vec![sample_uid()],
            criteria: None,
            job_context: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn compare_candidates_rejects_too_many_uids() {
        let request = ApiV1CompareCandidatesRequestDto {
            uids: (0..6).map(|_| sample_uid()).collect(),
            criteria: None,
            job_context: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn compare_candidates_accepts_valid_count() {
        let request = ApiV1CompareCandidatesRequestDto {
            uids: vec![sample_uid(), sample_uid(), sample_uid()],
            criteria: Some("leadership".to_string()),
            job_context: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn explain_match_rejects_empty_job_description() {
        let request = ApiV1ExplainMatchRequestDto {
            uid: sample_uid(),
            job_description: "   ".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn error_envelope_converts_to_wire_shape() {
        let envelope = ErrorEnvelope::expected(
            resumariner_shared::ErrorCode::new("rag", "invalid_candidate_count"),
            "compare_candidates requires 2 to 5 candidates",
        );
        let dto = error_envelope_to_api_v1_error(&envelope, Some("req-123"));
        assert_eq!(dto.code, "rag:invalid_candidate_count");
        assert!(!dto.retriable);
        assert_eq!(dto.correlation_id.as_deref(), Some("req-123"));
    }

    #[test]
    fn result_envelope_serializes_with_ok_flag() {
        let result: ApiV1Result<ApiV1IngestResponseDto> = ApiV1Result::ok(ApiV1IngestResponseDto {
            job_id: sample_uid(),
            status: JobStatus::Pending,
        });
        let value = serde_json::to_value(&result).expect("serializable");
        assert_eq!(value["ok"], serde_json::json!(true));
        assert!(value["data"]["job_id"].is_string());
    }
}
