//! Wire-format round-trip tests for the v1 API surface.

use resumariner_api::v1::{
    ApiV1CompareCandidatesRequestDto, ApiV1ErrorDto, ApiV1IngestRequestDto,
    ApiV1IngestResponseDto, ApiV1Result, ApiV1SearchHitDto, ApiV1SearchRequestDto,
    ApiV1SearchResponseDto, error_envelope_to_api_v1_error,
};
use resumariner_domain::{HybridWeights, JobStatus, SearchFilters, SearchMode, Uid};
use resumariner_shared::{ErrorCode, ErrorEnvelope, Validate};
use resumariner_testkit::errors::timeout_error;

#[test]
fn ingest_request_serializes_with_defaulted_review_flag() {
    let request = ApiV1IngestRequestDto {
        file_name: "resume.pdf".to_string(),
        file_size: 4096,
        request_review: false,
    };
    assert!(request.validate().is_ok());

    let value = serde_json::to_value(&request).expect("serializable");
    assert_eq!(value["file_name"], serde_json::json!("resume.pdf"));
    assert_eq!(value["request_review"], serde_json::json!(false));

    let without_review = serde_json::json!({ "file_name": "resume.pdf", "file_size": 4096 });
    let parsed: ApiV1IngestRequestDto =
        serde_json::from_value(without_review).expect("request_review defaults to false");
    assert!(!parsed.request_review);
}

#[test]
fn ingest_response_round_trips_through_json() {
    let response = ApiV1IngestResponseDto {
        job_id: Uid::new_random(),
        status: JobStatus::Pending,
    };
    let value = serde_json::to_value(&response).expect("serializable");
    let parsed: ApiV1IngestResponseDto = serde_json::from_value(value).expect("deserializable");
    assert_eq!(parsed.job_id, response.job_id);
    assert_eq!(parsed.status, JobStatus::Pending);
}

#[test]
fn search_request_with_hybrid_weights_round_trips() {
    let request = ApiV1SearchRequestDto {
        mode: SearchMode::Hybrid,
        query: Some("senior rust engineer".to_string()),
        filters: SearchFilters::default(),
        limit: 25,
        min_score: Some(0.4),
        weights: Some(HybridWeights::default()),
    };
    assert!(request.validate().is_ok());

    let value = serde_json::to_value(&request).expect("serializable");
    let parsed: ApiV1SearchRequestDto = serde_json::from_value(value).expect("deserializable");
    assert_eq!(parsed.mode, SearchMode::Hybrid);
    assert_eq!(parsed.limit, 25);
}

#[test]
fn search_response_wraps_hits_in_order() {
    let response = ApiV1SearchResponseDto {
        hits: vec![ApiV1SearchHitDto {
            uid: Uid::new_random(),
            score: 0.91,
            matched_points: Vec::new(),
        }],
    };
    let value = serde_json::to_value(&response).expect("serializable");
    assert_eq!(value["hits"].as_array().expect("array").len(), 1);
}

#[test]
fn compare_candidates_request_rejects_invalid_cardinality_before_reaching_the_wire() {
    let too_few = ApiV1CompareCandidatesRequestDto {
        uids: vec![Uid::new_random()],
        criteria: None,
        job_context: None,
    };
    assert!(too_few.validate().is_err());
}

#[test]
fn error_envelope_round_trips_to_the_wire_error_shape() {
    let envelope = ErrorEnvelope::expected(
        ErrorCode::new("rag", "invalid_candidate_count"),
        "compare_candidates requires 2 to 5 candidates",
    )
    .with_metadata("uids_len", "1");

    let dto: ApiV1ErrorDto = error_envelope_to_api_v1_error(&envelope, Some("req-abc"));
    let value = serde_json::to_value(&dto).expect("serializable");
    assert_eq!(value["code"], serde_json::json!("rag:invalid_candidate_count"));
    assert_eq!(value["retriable"], serde_json::json!(false));
    assert_eq!(value["correlation_id"], serde_json::json!("req-abc"));
}

#[test]
fn ok_and_err_result_envelopes_serialize_with_distinct_ok_flags() {
    let ok_result: ApiV1Result<ApiV1IngestResponseDto> = ApiV1Result::ok(ApiV1IngestResponseDto {
        job_id: Uid::new_random(),
        status: JobStatus::Completed,
    });
    let ok_value = serde_json::to_value(&ok_result).expect("serializable");
    assert_eq!(ok_value["ok"], serde_json::json!(true));

    let error_dto =
        error_envelope_to_api_v1_error(&ErrorEnvelope::cancelled("request cancelled"), None);
    let err_result: ApiV1Result<ApiV1IngestResponseDto> = ApiV1Result::err(error_dto);
    let err_value = serde_json::to_value(&err_result).expect("serializable");
    assert_eq!(err_value["ok"], serde_json::json!(false));
    assert!(err_value["error"]["code"].is_string());
}

#[test]
fn timeout_fixture_is_retriable_on_the_wire() {
    let dto = error_envelope_to_api_v1_error(&timeout_error(), None);
    assert_eq!(dto.code, "core:timeout");
    assert!(dto.retriable);
}
