//! OpenAI-compatible embedding adapter.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use resumariner_config::EmbeddingConfig;
use resumariner_ports::{
    BoxFuture, EmbedBatchRequest, EmbedRequest, EmbeddingPort, EmbeddingProviderInfo,
    EmbeddingVector,
};
use resumariner_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible embedding adapter configuration.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingConfig {
    /// API key used for authentication.
    pub api_key: Box<str>,
    /// Embedding model name.
    pub model: Box<str>,
    /// Base URL override (defaults to `https://api.openai.com/v1`).
    pub base_url: Option<Box<str>>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Output dimension the configured model produces.
    pub dimension: u32,
    /// Maximum inputs sent in a single embeddings request; larger batches
    /// are split into chunks of this size.
    pub batch_size: u32,
}

impl OpenAiEmbeddingConfig {
    /// Build from the shared embedding config plus an API key.
    #[must_use]
    pub fn from_embedding_config(api_key: Box<str>, config: &EmbeddingConfig) -> Self {
        Self {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            timeout_ms: config.timeout_ms,
            dimension: config.dimension,
            batch_size: config.batch_size,
        }
    }
}

/// OpenAI-compatible embedding adapter implementation.
pub struct OpenAiEmbedding {
    provider: EmbeddingProviderInfo,
    client: reqwest::Client,
    endpoint: Box<str>,
    model: Box<str>,
    dimension: u32,
    batch_size: usize,
}

impl OpenAiEmbedding {
    /// Create a new OpenAI-compatible embedding adapter.
    pub fn new(config: &OpenAiEmbeddingConfig) -> Result<Self> {
        let api_key = normalize_required("api key", config.api_key.as_ref())?;
        let model = normalize_required("model", config.model.as_ref())?;
        let base_url = normalize_optional_required("base url", config.base_url.as_deref())?
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned().into_boxed_str());
        let base_url = base_url.trim_end_matches('/').to_owned().into_boxed_str();
        if base_url.is_empty() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "base url must be non-empty",
            ));
        }
        if config.timeout_ms == 0 {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "timeout must be greater than zero",
            ));
        }
        if config.dimension == 0 {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "dimension must be greater than zero",
            ));
        }
        if config.batch_size == 0 {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "batch size must be greater than zero",
            ));
        }

        let mut headers = HeaderMap::new();
        let mut auth_header =
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
                ErrorEnvelope::expected(
                    ErrorCode::invalid_input(),
                    "api key contains invalid header characters",
                )
            })?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("embedding", "openai_client_init_failed"),
                    format!("failed to build OpenAI client: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

        let provider = EmbeddingProviderInfo {
            id: format!("openai:{model}").into_boxed_str(),
            name: "OpenAI".into(),
            dimension: config.dimension,
        };
        let endpoint = format!("{base_url}/embeddings").into_boxed_str();

        Ok(Self {
            provider,
            client,
            endpoint,
            model,
            dimension: config.dimension,
            batch_size: usize::try_from(config.batch_size).unwrap_or(usize::MAX),
        })
    }

    async fn embed_many(
        &self,
        ctx: &RequestContext,
        inputs: OpenAiInput,
        expected_count: usize,
        operation: &'static str,
    ) -> Result<Vec<EmbeddingVector>> {
        ctx.ensure_not_cancelled(operation)?;
        if expected_count == 0 {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "embedding input must be non-empty",
            ));
        }

        let request = OpenAiEmbeddingRequest {
            model: self.model.clone(),
            input: inputs,
            dimensions: Some(self.dimension),
        };
        let response = self.send_request(ctx, request, operation).await?;
        map_embeddings(response, expected_count, self.dimension)
    }

    async fn send_request(
        &self,
        ctx: &RequestContext,
        request: OpenAiEmbeddingRequest,
        operation: &'static str,
    ) -> Result<OpenAiEmbeddingResponse> {
        let response = tokio::select! {
            () = ctx.cancelled() => return Err(ErrorEnvelope::cancelled("operation cancelled").with_metadata("operation", operation)),
            result = self.client.post(self.endpoint.as_ref()).json(&request).send() => {
                result.map_err(|error| map_reqwest_error(&error))?
            }
        };

        let status = response.status();
        let payload = tokio::select! {
            () = ctx.cancelled() => return Err(ErrorEnvelope::cancelled("operation cancelled").with_metadata("operation", operation)),
            result = response.bytes() => result.map_err(|error| map_reqwest_error(&error))?,
        };

        if !status.is_success() {
            return Err(map_openai_http_error(status, &payload));
        }

        serde_json::from_slice(&payload).map_err(|error| {
            ErrorEnvelope::unexpected(
                ErrorCode::new("embedding", "openai_invalid_response"),
                format!("failed to decode OpenAI response: {error}"),
                ErrorClass::NonRetriable,
            )
        })
    }
}

impl EmbeddingPort for OpenAiEmbedding {
    fn provider(&self) -> &EmbeddingProviderInfo {
        &self.provider
    }

    fn embed(
        &self,
        ctx: &RequestContext,
        request: EmbedRequest,
    ) -> BoxFuture<'_, Result<EmbeddingVector>> {
        let ctx = ctx.clone();
        let text = sanitize_single(request.text);
        Box::pin(async move {
            let mut vectors = self
                .embed_many(&ctx, OpenAiInput::Single(text), 1, "openai_embedding.embed")
                .await?;
            vectors.pop().ok_or_else(|| {
                ErrorEnvelope::unexpected(
                    ErrorCode::internal(),
                    "missing embedding response",
                    ErrorClass::NonRetriable,
                )
            })
        })
    }

    /// Skips empty/whitespace-only texts rather than embedding a
    /// placeholder for them, so the returned vectors line up with the
    /// non-empty inputs only. Chunks the remaining texts to at most
    /// `batch_size` per request.
    fn embed_batch(
        &self,
        ctx: &RequestContext,
        request: EmbedBatchRequest,
    ) -> BoxFuture<'_, Result<Vec<EmbeddingVector>>> {
        let ctx = ctx.clone();
        let texts: Vec<Box<str>> = request
            .texts
            .into_iter()
            .filter(|text| !text.trim().is_empty())
            .collect();
        Box::pin(async move {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let batch_size = self.batch_size.max(1);
            let mut vectors = Vec::with_capacity(texts.len());
            for chunk in texts.chunks(batch_size) {
                let chunk = chunk.to_vec();
                let expected_count = chunk.len();
                let chunk_vectors = self
                    .embed_many(
                        &ctx,
                        OpenAiInput::Many(chunk),
                        expected_count,
                        "openai_embedding.embed_batch",
                    )
                    .await?;
                vectors.extend(chunk_vectors);
            }
            Ok(vectors)
        })
    }
}

#[derive(Debug, Serialize)]
struct OpenAiEmbeddingRequest {
    model: Box<str>,
    input: OpenAiInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum OpenAiInput {
    Single(Box<str>),
    Many(Vec<Box<str>>),
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingDatum {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<String>,
}

fn normalize_required(label: &str, value: &str) -> Result<Box<str>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            format!("{label} must be set"),
        ));
    }
    Ok(trimmed.to_owned().into_boxed_str())
}

fn normalize_optional_required(label: &str, value: Option<&str>) -> Result<Option<Box<str>>> {
    let trimmed = match value {
        Some(value) => value.trim(),
        None => return Ok(None),
    };
    if trimmed.is_empty() {
        return Err(ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            format!("{label} must be non-empty"),
        ));
    }
    Ok(Some(trimmed.to_owned().into_boxed_str()))
}

/// A single required text can't be skipped the way a batch entry can, so
/// blank input is padded to a single space instead of rejected outright.
fn sanitize_single(text: Box<str>) -> Box<str> {
    if text.trim().is_empty() { " ".into() } else { text }
}

fn map_reqwest_error(error: &reqwest::Error) -> ErrorEnvelope {
    if error.is_timeout() {
        return ErrorEnvelope::unexpected(
            ErrorCode::timeout(),
            "OpenAI request timed out",
            ErrorClass::Retriable,
        );
    }
    if error.is_connect() {
        return ErrorEnvelope::unexpected(
            ErrorCode::io(),
            format!("OpenAI connection failed: {error}"),
            ErrorClass::Retriable,
        );
    }
    ErrorEnvelope::unexpected(
        ErrorCode::new("embedding", "openai_request_failed"),
        format!("OpenAI request failed: {error}"),
        ErrorClass::NonRetriable,
    )
}

fn map_openai_http_error(status: StatusCode, payload: &[u8]) -> ErrorEnvelope {
    let mut envelope = if let Ok(parsed) = serde_json::from_slice::<OpenAiErrorResponse>(payload) {
        let message = parsed.error.message;
        let mut envelope = match status.as_u16() {
            400 | 404 | 422 => ErrorEnvelope::expected(ErrorCode::invalid_input(), message),
            401 | 403 => ErrorEnvelope::expected(ErrorCode::permission_denied(), message),
            408 => ErrorEnvelope::unexpected(ErrorCode::timeout(), message, ErrorClass::Retriable),
            429 => ErrorEnvelope::unexpected(
                ErrorCode::new("core", "rate_limited"),
                message,
                ErrorClass::Retriable,
            ),
            _ if status.is_server_error() => ErrorEnvelope::unexpected(
                ErrorCode::new("core", "dependency_unavailable"),
                message,
                ErrorClass::Retriable,
            ),
            _ => ErrorEnvelope::unexpected(
                ErrorCode::new("embedding", "openai_http_error"),
                message,
                ErrorClass::NonRetriable,
            ),
        };

        if let Some(error_type) = parsed.error.error_type.as_deref() {
            envelope = envelope.with_metadata("error_type", error_type.to_string());
        }
        if let Some(error_code) = parsed.error.code.as_deref() {
            envelope = envelope.with_metadata("error_code", error_code.to_string());
        }
        envelope
    } else {
        ErrorEnvelope::unexpected(
            ErrorCode::new("embedding", "openai_http_error"),
            "OpenAI request failed with non-JSON error",
            if status.is_server_error() {
                ErrorClass::Retriable
            } else {
                ErrorClass::NonRetriable
            },
        )
    };

    envelope = envelope.with_metadata("status", status.as_u16().to_string());
    envelope
}

fn map_embeddings(
    response: OpenAiEmbeddingResponse,
    expected_count: usize,
    expected_dimension: u32,
) -> Result<Vec<EmbeddingVector>> {
    if response.data.len() != expected_count {
        return Err(ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!(
                "embedding response count mismatch (expected {expected_count}, got {})",
                response.data.len()
            ),
            ErrorClass::NonRetriable,
        ));
    }

    let mut slots: Vec<Option<EmbeddingVector>> = vec![None; expected_count];
    for datum in response.data {
        let dimension = u32::try_from(datum.embedding.len()).map_err(|_| {
            ErrorEnvelope::unexpected(
                ErrorCode::internal(),
                "embedding dimension overflow",
                ErrorClass::NonRetriable,
            )
        })?;
        if dimension != expected_dimension {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "embedding dimension mismatch",
            )
            .with_metadata("expected", expected_dimension.to_string())
            .with_metadata("actual", dimension.to_string()));
        }
        let slot = slots.get_mut(datum.index).ok_or_else(|| {
            ErrorEnvelope::unexpected(
                ErrorCode::internal(),
                "embedding response index out of range",
                ErrorClass::NonRetriable,
            )
        })?;
        if slot.is_some() {
            return Err(ErrorEnvelope::unexpected(
                ErrorCode::internal(),
                "embedding response index duplicated",
                ErrorClass::NonRetriable,
            ));
        }
        *slot = Some(EmbeddingVector::new(std::sync::Arc::from(datum.embedding)));
    }

    slots
        .into_iter()
        .map(|slot| {
            slot.ok_or_else(|| {
                ErrorEnvelope::unexpected(
                    ErrorCode::internal(),
                    "embedding response missing index",
                    ErrorClass::NonRetriable,
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_config() -> OpenAiEmbeddingConfig {
        OpenAiEmbeddingConfig {
            api_key: "example-key".into(), // pragma: allowlist secret
            model: "text-embedding-3-small".into(),
            base_url: Some("http://localhost".into()),
            timeout_ms: 1_000,
            dimension: 4,
            batch_size: 64,
        }
    }

    #[test]
    fn openai_request_serializes_single_input() {
        let request = OpenAiEmbeddingRequest {
            model: "text-embedding-3-small".into(),
            input: OpenAiInput::Single("hello".into()),
            dimensions: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "text-embedding-3-small",
                "input": "hello"
            })
        );
    }

    #[test]
    fn map_embeddings_rejects_dimension_mismatch() {
        let response = OpenAiEmbeddingResponse {
            data: vec![OpenAiEmbeddingDatum {
                embedding: vec![0.1, 0.2],
                index: 0,
            }],
        };
        let error = map_embeddings(response, 1, 3).unwrap_err();
        assert_eq!(error.code, ErrorCode::invalid_input());
    }

    #[test]
    fn map_openai_http_error_rate_limited_is_retriable() {
        let payload = serde_json::to_vec(&json!({
            "error": { "message": "rate limited" }
        }))
        .unwrap();
        let envelope = map_openai_http_error(StatusCode::TOO_MANY_REQUESTS, &payload);
        assert_eq!(envelope.class, ErrorClass::Retriable);
        assert_eq!(envelope.code, ErrorCode::new("core", "rate_limited"));
    }

    #[test]
    fn adapter_exposes_configured_dimension() {
        let adapter = OpenAiEmbedding::new(&sample_config()).unwrap();
        assert_eq!(adapter.provider().dimension, 4);
    }

    #[test]
    fn rejects_zero_dimension() {
        let mut config = sample_config();
        config.dimension = 0;
        assert!(OpenAiEmbedding::new(&config).is_err());
    }

    #[test]
    fn rejects_zero_batch_size() {
        let mut config = sample_config();
        config.batch_size = 0;
        assert!(OpenAiEmbedding::new(&config).is_err());
    }

    #[test]
    fn sanitize_single_pads_whitespace_only_text() {
        assert_eq!(sanitize_single("   ".into()), " ".into());
        assert_eq!(sanitize_single("hello".into()), Box::<str>::from("hello"));
    }
}
