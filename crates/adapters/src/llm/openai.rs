//! OpenAI-compatible LLM adapter: schema-constrained chat completions via
//! `response_format: json_schema`.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use resumariner_config::LlmConfig;
use resumariner_ports::{BoxFuture, LlmOptions, LlmPort, LlmRequest};
use resumariner_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// OpenAI-compatible LLM adapter configuration.
#[derive(Debug, Clone)]
pub struct OpenAiLlmConfig {
    /// API key used for authentication.
    pub api_key: Box<str>,
    /// Model name.
    pub model: Box<str>,
    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub base_url: Box<str>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl OpenAiLlmConfig {
    /// Build from the shared LLM config plus an API key.
    #[must_use]
    pub fn from_llm_config(api_key: Box<str>, config: &LlmConfig) -> Self {
        Self {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            timeout_ms: config.timeout_ms,
        }
    }
}

/// OpenAI-compatible LLM adapter implementation.
pub struct OpenAiLlm {
    client: reqwest::Client,
    endpoint: Box<str>,
    model: Box<str>,
}

impl OpenAiLlm {
    /// Create a new OpenAI-compatible LLM adapter.
    pub fn new(config: &OpenAiLlmConfig) -> Result<Self> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "api key must be set",
            ));
        }
        let model = config.model.trim();
        if model.is_empty() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "model must be set",
            ));
        }
        let base_url = config.base_url.trim().trim_end_matches('/');
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
                    ErrorCode::new("llm", "openai_client_init_failed"),
                    format!("failed to build LLM client: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

        Ok(Self {
            client,
            endpoint: format!("{base_url}/chat/completions").into_boxed_str(),
            model: model.to_owned().into_boxed_str(),
        })
    }
}

impl LlmPort for OpenAiLlm {
    fn run(&self, ctx: &RequestContext, request: LlmRequest) -> BoxFuture<'_, Result<Value>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("openai_llm.run")?;

            let body = ChatCompletionRequest {
                model: self.model.clone(),
                temperature: request.options.temperature,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: request.system_prompt,
                    },
                    ChatMessage {
                        role: "user",
                        content: request.user_prompt,
                    },
                ],
                response_format: ResponseFormat {
                    format_type: "json_schema",
                    json_schema: JsonSchemaFormat {
                        name: "structured_response",
                        strict: true,
                        schema: request.schema.clone(),
                    },
                },
            };

            let response = tokio::select! {
                () = ctx.cancelled() => return Err(ErrorEnvelope::cancelled("operation cancelled").with_metadata("operation", "openai_llm.run")),
                result = self.client.post(self.endpoint.as_ref()).json(&body).send() => {
                    result.map_err(|error| map_reqwest_error(&error))?
                }
            };

            let status = response.status();
            let payload = response.bytes().await.map_err(|error| map_reqwest_error(&error))?;
            if !status.is_success() {
                return Err(map_openai_http_error(status, &payload));
            }

            let parsed: ChatCompletionResponse = serde_json::from_slice(&payload).map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("llm", "openai_invalid_response"),
                    format!("failed to decode LLM response: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

            let content = parsed
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| {
                    ErrorEnvelope::unexpected(
                        ErrorCode::internal(),
                        "LLM response contained no choices",
                        ErrorClass::NonRetriable,
                    )
                })?;

            serde_json::from_str(&content).map_err(|error| {
                ErrorEnvelope::expected(
                    ErrorCode::new("llm", "schema_mismatch"),
                    format!("LLM response body was not valid JSON: {error}"),
                )
            })
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: Box<str>,
    temperature: f32,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: &'static str,
    strict: bool,
    schema: Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

fn map_reqwest_error(error: &reqwest::Error) -> ErrorEnvelope {
    if error.is_timeout() {
        return ErrorEnvelope::unexpected(ErrorCode::timeout(), "LLM request timed out", ErrorClass::Retriable);
    }
    if error.is_connect() {
        return ErrorEnvelope::unexpected(
            ErrorCode::io(),
            format!("LLM connection failed: {error}"),
            ErrorClass::Retriable,
        );
    }
    ErrorEnvelope::unexpected(
        ErrorCode::new("llm", "openai_request_failed"),
        format!("LLM request failed: {error}"),
        ErrorClass::NonRetriable,
    )
}

fn map_openai_http_error(status: StatusCode, payload: &[u8]) -> ErrorEnvelope {
    let message = serde_json::from_slice::<OpenAiErrorResponse>(payload)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| "LLM request failed".to_owned());

    let envelope = match status.as_u16() {
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
            ErrorCode::new("llm", "openai_http_error"),
            message,
            ErrorClass::NonRetriable,
        ),
    };
    envelope.with_metadata("status", status.as_u16().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> OpenAiLlmConfig {
        OpenAiLlmConfig {
            api_key: "example-key".into(), // pragma: allowlist secret
            model: "gpt-4o-mini".into(),
            base_url: "http://localhost".into(),
            timeout_ms: 1_000,
        }
    }

    #[test]
    fn adapter_builds_with_valid_config() {
        assert!(OpenAiLlm::new(&sample_config()).is_ok());
    }

    #[test]
    fn rejects_empty_api_key() {
        let mut config = sample_config();
        config.api_key = "".into();
        assert!(OpenAiLlm::new(&config).is_err());
    }

    #[test]
    fn rejects_http_error_with_rate_limit_classification() {
        let payload = serde_json::to_vec(&serde_json::json!({
            "error": { "message": "slow down" }
        }))
        .unwrap();
        let envelope = map_openai_http_error(StatusCode::TOO_MANY_REQUESTS, &payload);
        assert_eq!(envelope.class, ErrorClass::Retriable);
    }

    #[test]
    fn llm_request_with_options() {
        let request = LlmRequest {
            system_prompt: "system".into(),
            user_prompt: "user".into(),
            schema: serde_json::json!({"type": "object"}),
            options: LlmOptions { temperature: 0.1 },
        };
        assert_eq!(request.options.temperature, 0.1);
    }
}
