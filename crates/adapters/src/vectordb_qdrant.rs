//! Qdrant vector database adapter, speaking Qdrant's REST API directly
//! (`PUT /collections/{name}`, `PUT .../points`, `POST .../points/search`)
//! the same way the Neo4j adapter speaks the HTTP Cypher transaction API:
//! one `reqwest::Client`, one request builder per operation, one response
//! decoder. This is the production counterpart to `vectordb_local`.

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use resumariner_config::QdrantConfig;
use resumariner_ports::{
    BoxFuture, EmbeddingPoint, PayloadFilter, Uid, VectorDbPort, VectorSearchHit,
    VectorSearchOptions,
};
use resumariner_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use uuid::Uuid;

/// Connection settings for the Qdrant REST API.
#[derive(Debug, Clone)]
pub struct QdrantAdapterConfig {
    /// Base URL, e.g. `http://localhost:6333`.
    pub base_url: Box<str>,
    /// Collection name storing resume embedding points.
    pub collection: Box<str>,
    /// API key, when the deployment requires one.
    pub api_key: Option<Box<str>>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl QdrantAdapterConfig {
    /// Build from the shared vector DB config's Qdrant section.
    #[must_use]
    pub fn from_qdrant_config(
        config: &QdrantConfig,
        api_key: Option<Box<str>>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            base_url: config.base_url.clone(),
            collection: config.collection.clone(),
            api_key,
            timeout_ms,
        }
    }
}

/// REST-backed implementation of [`VectorDbPort`] against a Qdrant server.
pub struct QdrantVectorDb {
    client: reqwest::Client,
    collection_endpoint: Box<str>,
}

impl QdrantVectorDb {
    /// Create a new Qdrant vector DB adapter.
    pub fn new(config: &QdrantAdapterConfig) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "base url must be non-empty",
            ));
        }
        let collection = config.collection.trim();
        if collection.is_empty() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "collection name must be non-empty",
            ));
        }
        if config.timeout_ms == 0 {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "timeout must be greater than zero",
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(api_key) = &config.api_key {
            let mut value = HeaderValue::from_str(api_key).map_err(|_| {
                ErrorEnvelope::expected(
                    ErrorCode::invalid_input(),
                    "api key contains invalid header characters",
                )
            })?;
            value.set_sensitive(true);
            headers.insert("api-key", value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("vectordb", "qdrant_client_init_failed"),
                    format!("failed to build vector DB client: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

        Ok(Self {
            client,
            collection_endpoint: format!("{base_url}/collections/{collection}").into_boxed_str(),
        })
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.collection_endpoint)
    }
}

impl VectorDbPort for QdrantVectorDb {
    fn ensure_collection(&self, ctx: &RequestContext, dimension: u32) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("qdrant_vectordb.ensure_collection")?;

            let body = json!({
                "vectors": { "size": dimension, "distance": "Cosine" },
            });
            let response = self
                .client
                .put(self.url(""))
                .json(&body)
                .send()
                .await
                .map_err(|error| map_reqwest_error(&error))?;

            let status = response.status();
            if status == StatusCode::CONFLICT {
                return Ok(());
            }
            let payload = response.bytes().await.map_err(|error| map_reqwest_error(&error))?;
            if !status.is_success() {
                return Err(map_qdrant_http_error(status, &payload));
            }
            Ok(())
        })
    }

    fn store_vectors(
        &self,
        ctx: &RequestContext,
        uid: Uid,
        points: Vec<EmbeddingPoint>,
    ) -> BoxFuture<'_, Result<Vec<Uuid>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("qdrant_vectordb.store_vectors")?;

            self.delete_by_uid(uid).await?;

            if points.is_empty() {
                return Ok(Vec::new());
            }

            let mut ids = Vec::with_capacity(points.len());
            let mut qdrant_points = Vec::with_capacity(points.len());
            for point in points {
                let payload = serde_json::to_value(&point).map_err(|error| {
                    ErrorEnvelope::unexpected(
                        ErrorCode::internal(),
                        format!("failed to encode vector payload: {error}"),
                        ErrorClass::NonRetriable,
                    )
                })?;
                ids.push(point.id);
                qdrant_points.push(json!({
                    "id": point.id,
                    "vector": point.vector,
                    "payload": payload,
                }));
            }

            let body = json!({ "points": qdrant_points });
            let response = self
                .client
                .put(self.url("/points?wait=true"))
                .json(&body)
                .send()
                .await
                .map_err(|error| map_reqwest_error(&error))?;

            let status = response.status();
            let payload = response.bytes().await.map_err(|error| map_reqwest_error(&error))?;
            if !status.is_success() {
                return Err(map_qdrant_http_error(status, &payload));
            }
            Ok(ids)
        })
    }

    fn delete_resume_vectors(&self, ctx: &RequestContext, uid: Uid) -> BoxFuture<'_, Result<u64>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("qdrant_vectordb.delete_resume_vectors")?;
            self.delete_by_uid(uid).await
        })
    }

    fn search(
        &self,
        ctx: &RequestContext,
        query_vector: Vec<f32>,
        options: VectorSearchOptions,
    ) -> BoxFuture<'_, Result<Vec<VectorSearchHit>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("qdrant_vectordb.search")?;

            let mut body = json!({
                "vector": query_vector,
                "limit": options.limit,
                "with_payload": true,
            });
            if let Some(min_score) = options.min_score {
                body["score_threshold"] = json!(min_score);
            }
            if let Some(filter) = translate_filter(&options.filter) {
                body["filter"] = filter;
            }

            let response = self
                .client
                .post(self.url("/points/search"))
                .json(&body)
                .send()
                .await
                .map_err(|error| map_reqwest_error(&error))?;

            let status = response.status();
            let payload = response.bytes().await.map_err(|error| map_reqwest_error(&error))?;
            if !status.is_success() {
                return Err(map_qdrant_http_error(status, &payload));
            }

            let parsed: QdrantSearchResponse = serde_json::from_slice(&payload).map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("vectordb", "qdrant_invalid_response"),
                    format!("failed to decode vector search response: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

            let mut hits = Vec::with_capacity(parsed.result.len());
            for entry in parsed.result {
                let point: EmbeddingPoint = serde_json::from_value(entry.payload).map_err(|error| {
                    ErrorEnvelope::unexpected(
                        ErrorCode::new("vectordb", "qdrant_invalid_payload"),
                        format!("failed to decode vector payload: {error}"),
                        ErrorClass::NonRetriable,
                    )
                })?;
                hits.push(VectorSearchHit {
                    point_id: entry.id,
                    uid: point.uid,
                    score: entry.score,
                    point,
                });
            }
            Ok(hits)
        })
    }
}

impl QdrantVectorDb {
    async fn delete_by_uid(&self, uid: Uid) -> Result<u64> {
        let filter = json!({
            "must": [{ "key": "uid", "match": { "value": uid.to_string() } }],
        });

        let count_body = json!({ "filter": filter, "exact": true });
        let count_response = self
            .client
            .post(self.url("/points/count"))
            .json(&count_body)
            .send()
            .await
            .map_err(|error| map_reqwest_error(&error))?;
        let count_status = count_response.status();
        let count_payload = count_response.bytes().await.map_err(|error| map_reqwest_error(&error))?;
        if !count_status.is_success() {
            return Err(map_qdrant_http_error(count_status, &count_payload));
        }
        let count: QdrantCountResponse = serde_json::from_slice(&count_payload).map_err(|error| {
            ErrorEnvelope::unexpected(
                ErrorCode::new("vectordb", "qdrant_invalid_response"),
                format!("failed to decode vector count response: {error}"),
                ErrorClass::NonRetriable,
            )
        })?;
        if count.result.count == 0 {
            return Ok(0);
        }

        let delete_body = json!({ "filter": filter });
        let delete_response = self
            .client
            .post(self.url("/points/delete?wait=true"))
            .json(&delete_body)
            .send()
            .await
            .map_err(|error| map_reqwest_error(&error))?;
        let delete_status = delete_response.status();
        let delete_payload = delete_response.bytes().await.map_err(|error| map_reqwest_error(&error))?;
        if !delete_status.is_success() {
            return Err(map_qdrant_http_error(delete_status, &delete_payload));
        }
        Ok(count.result.count)
    }
}

/// Translate a port-level payload filter into a Qdrant `must` filter.
/// Array values become `match.any`; scalar strings/integers become
/// `match.value`. Unsupported value shapes (e.g. floats) are dropped —
/// callers should only place matchable keys in `PayloadFilter`.
fn translate_filter(filter: &PayloadFilter) -> Option<Value> {
    if filter.is_empty() {
        return None;
    }
    let mut conditions = Vec::with_capacity(filter.len());
    for (key, value) in filter {
        let condition = match value {
            Value::String(_) | Value::Bool(_) => {
                Some(json!({ "key": key.as_ref(), "match": { "value": value } }))
            },
            Value::Number(number) if number.is_i64() || number.is_u64() => {
                Some(json!({ "key": key.as_ref(), "match": { "value": value } }))
            },
            Value::Array(values) => Some(json!({ "key": key.as_ref(), "match": { "any": values } })),
            _ => None,
        };
        if let Some(condition) = condition {
            conditions.push(condition);
        }
    }
    if conditions.is_empty() {
        None
    } else {
        Some(json!({ "must": conditions }))
    }
}

fn map_reqwest_error(error: &reqwest::Error) -> ErrorEnvelope {
    if error.is_timeout() {
        return ErrorEnvelope::unexpected(
            ErrorCode::timeout(),
            "vector DB request timed out",
            ErrorClass::Retriable,
        );
    }
    if error.is_connect() {
        return ErrorEnvelope::unexpected(
            ErrorCode::io(),
            format!("vector DB connection failed: {error}"),
            ErrorClass::Retriable,
        );
    }
    ErrorEnvelope::unexpected(
        ErrorCode::new("vectordb", "qdrant_request_failed"),
        format!("vector DB request failed: {error}"),
        ErrorClass::NonRetriable,
    )
}

fn map_qdrant_http_error(status: StatusCode, payload: &[u8]) -> ErrorEnvelope {
    let message = String::from_utf8_lossy(payload).into_owned();
    let envelope = match status.as_u16() {
        400 | 404 | 422 => ErrorEnvelope::expected(ErrorCode::invalid_input(), message),
        401 | 403 => ErrorEnvelope::expected(ErrorCode::permission_denied(), message),
        408 => ErrorEnvelope::unexpected(ErrorCode::timeout(), message, ErrorClass::Retriable),
        _ if status.is_server_error() => ErrorEnvelope::unexpected(
            ErrorCode::new("core", "dependency_unavailable"),
            message,
            ErrorClass::Retriable,
        ),
        _ => ErrorEnvelope::unexpected(
            ErrorCode::new("vectordb", "qdrant_http_error"),
            message,
            ErrorClass::NonRetriable,
        ),
    };
    envelope.with_metadata("status", status.as_u16().to_string())
}

#[derive(Debug, Deserialize)]
struct QdrantSearchResponse {
    result: Vec<QdrantSearchEntry>,
}

#[derive(Debug, Deserialize)]
struct QdrantSearchEntry {
    id: Uuid,
    score: f32,
    payload: Value,
}

#[derive(Debug, Deserialize)]
struct QdrantCountResponse {
    result: QdrantCount,
}

#[derive(Debug, Deserialize)]
struct QdrantCount {
    count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_filter_builds_must_conditions_for_strings_and_arrays() {
        let mut filter = PayloadFilter::new();
        filter.insert("role".into(), json!("Engineer"));
        filter.insert("skills".into(), json!(["Rust", "Go"]));

        let translated = translate_filter(&filter).expect("filter should be non-empty");
        let must = translated.get("must").and_then(Value::as_array).expect("must array");
        assert_eq!(must.len(), 2);
    }

    #[test]
    fn translate_filter_returns_none_for_empty_filter() {
        assert!(translate_filter(&PayloadFilter::new()).is_none());
    }

    #[test]
    fn translate_filter_drops_float_values() {
        let mut filter = PayloadFilter::new();
        filter.insert("years_experience".into(), json!(5.5));
        assert!(translate_filter(&filter).is_none());
    }

    #[test]
    fn qdrant_adapter_config_rejects_empty_base_url() {
        let config = QdrantAdapterConfig {
            base_url: "".into(),
            collection: "resume_embeddings".into(),
            api_key: None,
            timeout_ms: 5_000,
        };
        assert!(QdrantVectorDb::new(&config).is_err());
    }
}
