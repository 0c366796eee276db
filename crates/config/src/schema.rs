//! Backend configuration schema, defaults, validation, and normalization.
//!
//! Deserialization uses `serde` (JSON or TOML). Validation is manual and
//! returns typed errors mapped to `ErrorEnvelope`.

use resumariner_shared::{BoundedU32, BoundedU64, ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Sanitizes a URL for error messages by stripping credentials.
fn sanitize_url_for_error(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.password().is_some() || !parsed.username().is_empty() {
                if parsed.set_username("").is_err() {
                    return "[invalid url: invalid username]".to_string();
                }
                if parsed.set_password(None).is_err() {
                    return "[invalid url: invalid password]".to_string();
                }
            }
            parsed.to_string()
        },
        Err(error) => format!("[invalid url: {error}]"),
    }
}

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

const CORE_TIMEOUT_MIN_MS: u64 = 1_000;
const CORE_TIMEOUT_MAX_MS: u64 = 600_000;
const CORE_MAX_CONCURRENCY_MIN: u32 = 1;
const CORE_MAX_CONCURRENCY_MAX: u32 = 256;
const CORE_MAX_UPLOAD_BYTES_MIN: u64 = 1_024;
const CORE_MAX_UPLOAD_BYTES_MAX: u64 = 200_000_000;

const RETRY_MAX_ATTEMPTS_MIN: u32 = 1;
const RETRY_MAX_ATTEMPTS_MAX: u32 = 10;
const RETRY_BASE_DELAY_MIN_MS: u64 = 1;
const RETRY_BASE_DELAY_MAX_MS: u64 = 60_000;
const RETRY_MAX_DELAY_MIN_MS: u64 = 1;
const RETRY_MAX_DELAY_MAX_MS: u64 = 600_000;

const EMBEDDING_TIMEOUT_MIN_MS: u64 = 1_000;
const EMBEDDING_TIMEOUT_MAX_MS: u64 = 120_000;
const EMBEDDING_BATCH_SIZE_MIN: u32 = 1;
const EMBEDDING_BATCH_SIZE_MAX: u32 = 512;
const EMBEDDING_DIMENSION_MIN: u32 = 1;
const EMBEDDING_DIMENSION_MAX: u32 = 8_192;

const VECTOR_DB_TIMEOUT_MIN_MS: u64 = 1_000;
const VECTOR_DB_TIMEOUT_MAX_MS: u64 = 120_000;

const JOB_QUEUE_VISIBILITY_TIMEOUT_MIN_MS: u64 = 1_000;
const JOB_QUEUE_VISIBILITY_TIMEOUT_MAX_MS: u64 = 3_600_000;
const JOB_QUEUE_MAX_RETRIES_MIN: u32 = 0;
const JOB_QUEUE_MAX_RETRIES_MAX: u32 = 20;

const LLM_TIMEOUT_MIN_MS: u64 = 1_000;
const LLM_TIMEOUT_MAX_MS: u64 = 300_000;

const CIRCUIT_BREAKER_FAIL_MAX_MIN: u32 = 1;
const CIRCUIT_BREAKER_FAIL_MAX_MAX: u32 = 100;
const CIRCUIT_BREAKER_RESET_TIMEOUT_MIN_MS: u64 = 1_000;
const CIRCUIT_BREAKER_RESET_TIMEOUT_MAX_MS: u64 = 600_000;

const INGEST_MAX_PDF_BYTES_MIN: u64 = 1_024;
const INGEST_MAX_PDF_BYTES_MAX: u64 = 200_000_000;
const INGEST_MAX_IMAGE_BYTES_MIN: u64 = 1_024;
const INGEST_MAX_IMAGE_BYTES_MAX: u64 = 200_000_000;

/// Top-level backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct BackendConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// Core runtime settings (HTTP server, concurrency, retry policy).
    pub core: CoreConfig,
    /// Embedding adapter settings.
    pub embedding: EmbeddingConfig,
    /// Vector DB adapter settings.
    pub vector_db: VectorDbConfig,
    /// Job queue (Redis) settings.
    pub job_queue: JobQueueConfig,
    /// Graph store settings.
    pub graph_store: GraphStoreConfig,
    /// LLM adapter settings.
    pub llm: LlmConfig,
    /// Upload size limits enforced before document extraction.
    pub ingest_limits: IngestLimits,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            core: CoreConfig::default(),
            embedding: EmbeddingConfig::default(),
            vector_db: VectorDbConfig::default(),
            job_queue: JobQueueConfig::default(),
            graph_store: GraphStoreConfig::default(),
            llm: LlmConfig::default(),
            ingest_limits: IngestLimits::default(),
        }
    }
}

impl BackendConfig {
    /// Validate and normalize the config, producing bounded numeric limits.
    pub fn validate_and_normalize(self) -> Result<ValidatedBackendConfig, ConfigSchemaError> {
        self.validate_version()?;
        self.core.validate()?;
        self.embedding.validate()?;
        self.vector_db.validate()?;
        self.job_queue.validate()?;
        self.graph_store.validate()?;
        self.llm.validate()?;
        self.ingest_limits.validate()?;

        let limits = ConfigLimits::new(&self)?;
        Ok(ValidatedBackendConfig { raw: self, limits })
    }

    const fn validate_version(&self) -> Result<(), ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }
        Ok(())
    }
}

/// Core runtime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct CoreConfig {
    /// Listen host for the HTTP API.
    pub host: Box<str>,
    /// Listen port for the HTTP API.
    pub port: u16,
    /// Default per-request timeout (ms).
    pub request_timeout_ms: u64,
    /// Maximum concurrent ingestion jobs processed by the worker pool.
    pub max_concurrency: u32,
    /// Maximum accepted upload size (bytes), enforced before parsing.
    pub max_upload_bytes: u64,
    /// Retry policy applied to outbound adapter calls.
    pub retry: RetryConfig,
    /// Structured logging settings.
    pub logging: LoggingConfig,
    /// Circuit breaker tuning shared by every outbound adapter call.
    pub circuit_breaker: CircuitBreakerTuning,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            request_timeout_ms: 30_000,
            max_concurrency: 4,
            max_upload_bytes: 10_000_000,
            retry: RetryConfig::default(),
            logging: LoggingConfig::default(),
            circuit_breaker: CircuitBreakerTuning::default(),
        }
    }
}

impl CoreConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        bounded_u64(
            "core",
            "requestTimeoutMs",
            self.request_timeout_ms,
            CORE_TIMEOUT_MIN_MS,
            CORE_TIMEOUT_MAX_MS,
        )?;
        bounded_u32(
            "core",
            "maxConcurrency",
            self.max_concurrency,
            CORE_MAX_CONCURRENCY_MIN,
            CORE_MAX_CONCURRENCY_MAX,
        )?;
        bounded_u64(
            "core",
            "maxUploadBytes",
            self.max_upload_bytes,
            CORE_MAX_UPLOAD_BYTES_MIN,
            CORE_MAX_UPLOAD_BYTES_MAX,
        )?;
        self.retry.validate()?;
        self.circuit_breaker.validate()
    }
}

/// Log verbosity threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevelSetting {
    /// Debug.
    Debug,
    /// Info.
    Info,
    /// Warn.
    Warn,
    /// Error.
    Error,
}

/// Structured log event encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// One JSON object per line, suitable for log aggregation.
    Json,
    /// Human-readable single-line format, suitable for a local terminal.
    Pretty,
}

/// Structured logging settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Minimum level emitted.
    pub level: LogLevelSetting,
    /// Wire encoding.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevelSetting::Info,
            format: LogFormat::Json,
        }
    }
}

/// Circuit breaker tuning, applied uniformly to every outbound adapter
/// (embedding, vector DB, graph store, LLM).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct CircuitBreakerTuning {
    /// Consecutive failures before the circuit opens.
    pub fail_max: u32,
    /// How long the circuit stays open before a probe call is allowed (ms).
    pub reset_timeout_ms: u64,
}

impl Default for CircuitBreakerTuning {
    fn default() -> Self {
        Self {
            fail_max: 3,
            reset_timeout_ms: 30_000,
        }
    }
}

impl CircuitBreakerTuning {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        bounded_u32(
            "core.circuitBreaker",
            "failMax",
            self.fail_max,
            CIRCUIT_BREAKER_FAIL_MAX_MIN,
            CIRCUIT_BREAKER_FAIL_MAX_MAX,
        )?;
        bounded_u64(
            "core.circuitBreaker",
            "resetTimeoutMs",
            self.reset_timeout_ms,
            CIRCUIT_BREAKER_RESET_TIMEOUT_MIN_MS,
            CIRCUIT_BREAKER_RESET_TIMEOUT_MAX_MS,
        )?;
        Ok(())
    }
}

/// Upload size limits enforced by the document extractor before parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct IngestLimits {
    /// Maximum accepted PDF size (bytes).
    pub max_pdf_bytes: u64,
    /// Maximum accepted image size (bytes), for image-based resumes.
    pub max_image_bytes: u64,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_pdf_bytes: 10_000_000,
            max_image_bytes: 5_000_000,
        }
    }
}

impl IngestLimits {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        bounded_u64(
            "ingestLimits",
            "maxPdfBytes",
            self.max_pdf_bytes,
            INGEST_MAX_PDF_BYTES_MIN,
            INGEST_MAX_PDF_BYTES_MAX,
        )?;
        bounded_u64(
            "ingestLimits",
            "maxImageBytes",
            self.max_image_bytes,
            INGEST_MAX_IMAGE_BYTES_MIN,
            INGEST_MAX_IMAGE_BYTES_MAX,
        )?;
        Ok(())
    }
}

/// Retry policy configuration, mirrors [`resumariner_shared::retry::RetryPolicy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay before the first retry (ms).
    pub base_delay_ms: u64,
    /// Maximum delay between retries (ms).
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 5_000,
        }
    }
}

impl RetryConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        bounded_u32(
            "core.retry",
            "maxAttempts",
            self.max_attempts,
            RETRY_MAX_ATTEMPTS_MIN,
            RETRY_MAX_ATTEMPTS_MAX,
        )?;
        bounded_u64(
            "core.retry",
            "baseDelayMs",
            self.base_delay_ms,
            RETRY_BASE_DELAY_MIN_MS,
            RETRY_BASE_DELAY_MAX_MS,
        )?;
        bounded_u64(
            "core.retry",
            "maxDelayMs",
            self.max_delay_ms,
            RETRY_MAX_DELAY_MIN_MS,
            RETRY_MAX_DELAY_MAX_MS,
        )?;
        Ok(())
    }
}

/// Embedding adapter settings. The API key is never read from this file;
/// it is supplied via `RSM_EMBEDDING_API_KEY`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct EmbeddingConfig {
    /// Base URL for the OpenAI-compatible embeddings endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<Box<str>>,
    /// Embedding model name.
    pub model: Box<str>,
    /// Vector dimension produced by `model`.
    pub dimension: u32,
    /// Timeout for embedding requests (ms).
    pub timeout_ms: u64,
    /// Batch size for embedding calls (one resume's texts per batch).
    pub batch_size: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: "text-embedding-3-small".into(),
            dimension: 1536,
            timeout_ms: 30_000,
            batch_size: 64,
        }
    }
}

impl EmbeddingConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        if let Some(base_url) = &self.base_url {
            validate_http_url("embedding", "baseUrl", base_url)?;
        }
        bounded_u64(
            "embedding",
            "timeoutMs",
            self.timeout_ms,
            EMBEDDING_TIMEOUT_MIN_MS,
            EMBEDDING_TIMEOUT_MAX_MS,
        )?;
        bounded_u32(
            "embedding",
            "batchSize",
            self.batch_size,
            EMBEDDING_BATCH_SIZE_MIN,
            EMBEDDING_BATCH_SIZE_MAX,
        )?;
        bounded_u32(
            "embedding",
            "dimension",
            self.dimension,
            EMBEDDING_DIMENSION_MIN,
            EMBEDDING_DIMENSION_MAX,
        )?;
        Ok(())
    }
}

/// Which vector store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorDbMode {
    /// In-process linear-scan index with optional JSON snapshot persistence.
    Local,
    /// Remote Qdrant collection over its REST API.
    Qdrant,
}

/// Vector DB adapter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct VectorDbConfig {
    /// Backend selection.
    pub mode: VectorDbMode,
    /// Request timeout (ms), applies to the Qdrant backend only.
    pub timeout_ms: u64,
    /// Qdrant connection settings, used when `mode == Qdrant`.
    pub qdrant: QdrantConfig,
    /// Local snapshot settings, used when `mode == Local`.
    pub local: LocalVectorConfig,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            mode: VectorDbMode::Local,
            timeout_ms: 10_000,
            qdrant: QdrantConfig::default(),
            local: LocalVectorConfig::default(),
        }
    }
}

impl VectorDbConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        bounded_u64(
            "vectorDb",
            "timeoutMs",
            self.timeout_ms,
            VECTOR_DB_TIMEOUT_MIN_MS,
            VECTOR_DB_TIMEOUT_MAX_MS,
        )?;
        if self.mode == VectorDbMode::Qdrant {
            validate_http_url("vectorDb.qdrant", "baseUrl", &self.qdrant.base_url)?;
        }
        Ok(())
    }
}

/// Qdrant connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct QdrantConfig {
    /// Base URL of the Qdrant REST API.
    pub base_url: Box<str>,
    /// Collection name storing resume embedding points.
    pub collection: Box<str>,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:6333".into(),
            collection: "resume_embeddings".into(),
        }
    }
}

/// Local (in-process) vector index settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LocalVectorConfig {
    /// Directory holding the JSON snapshot, if persistence is desired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_dir: Option<Box<str>>,
}

impl Default for LocalVectorConfig {
    fn default() -> Self {
        Self { snapshot_dir: None }
    }
}

/// Job queue (Redis-backed) settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct JobQueueConfig {
    /// Redis connection URL. Credentials are stripped before logging.
    pub redis_url: Box<str>,
    /// How long a dequeued task stays invisible before it is reclaimed.
    pub visibility_timeout_ms: u64,
    /// Maximum retry attempts before a task is moved to the dead letter.
    pub max_retries: u32,
}

impl Default for JobQueueConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".into(),
            visibility_timeout_ms: 60_000,
            max_retries: 3,
        }
    }
}

impl JobQueueConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        validate_redis_url("jobQueue", "redisUrl", &self.redis_url)?;
        bounded_u64(
            "jobQueue",
            "visibilityTimeoutMs",
            self.visibility_timeout_ms,
            JOB_QUEUE_VISIBILITY_TIMEOUT_MIN_MS,
            JOB_QUEUE_VISIBILITY_TIMEOUT_MAX_MS,
        )?;
        bounded_u32(
            "jobQueue",
            "maxRetries",
            self.max_retries,
            JOB_QUEUE_MAX_RETRIES_MIN,
            JOB_QUEUE_MAX_RETRIES_MAX,
        )?;
        Ok(())
    }
}

/// Graph store settings (Cypher-speaking property graph over HTTP).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct GraphStoreConfig {
    /// Base URL of the graph store's HTTP query endpoint.
    pub base_url: Box<str>,
    /// Database/graph name, when the backend supports multiple.
    pub database: Box<str>,
}

impl Default for GraphStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7474".into(),
            database: "neo4j".into(),
        }
    }
}

impl GraphStoreConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        validate_http_url("graphStore", "baseUrl", &self.base_url)
    }
}

/// LLM adapter settings. The API key is supplied via `RSM_LLM_API_KEY`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LlmConfig {
    /// Base URL for the OpenAI-compatible chat completions endpoint.
    pub base_url: Box<str>,
    /// Model name.
    pub model: Box<str>,
    /// Request timeout (ms).
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            timeout_ms: 60_000,
        }
    }
}

impl LlmConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        validate_http_url("llm", "baseUrl", &self.base_url)?;
        bounded_u64(
            "llm",
            "timeoutMs",
            self.timeout_ms,
            LLM_TIMEOUT_MIN_MS,
            LLM_TIMEOUT_MAX_MS,
        )?;
        Ok(())
    }
}

/// Validated config wrapper carrying bounded numeric values.
#[derive(Debug, Clone)]
pub struct ValidatedBackendConfig {
    raw: BackendConfig,
    limits: ConfigLimits,
}

impl ValidatedBackendConfig {
    /// Access validated numeric bounds.
    #[must_use]
    pub const fn limits(&self) -> &ConfigLimits {
        &self.limits
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> BackendConfig {
        self.raw
    }
}

impl AsRef<BackendConfig> for ValidatedBackendConfig {
    fn as_ref(&self) -> &BackendConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedBackendConfig {
    type Target = BackendConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Validated numeric limits derived from the config.
#[derive(Debug, Clone, Copy)]
pub struct ConfigLimits {
    /// Core request timeout (ms).
    pub core_request_timeout_ms: BoundedU64<CORE_TIMEOUT_MIN_MS, CORE_TIMEOUT_MAX_MS>,
    /// Core max concurrency.
    pub core_max_concurrency: BoundedU32<CORE_MAX_CONCURRENCY_MIN, CORE_MAX_CONCURRENCY_MAX>,
    /// Embedding batch size.
    pub embedding_batch_size: BoundedU32<EMBEDDING_BATCH_SIZE_MIN, EMBEDDING_BATCH_SIZE_MAX>,
    /// Job queue visibility timeout (ms).
    pub job_queue_visibility_timeout_ms:
        BoundedU64<JOB_QUEUE_VISIBILITY_TIMEOUT_MIN_MS, JOB_QUEUE_VISIBILITY_TIMEOUT_MAX_MS>,
}

impl ConfigLimits {
    fn new(config: &BackendConfig) -> Result<Self, ConfigSchemaError> {
        Ok(Self {
            core_request_timeout_ms: bounded_u64(
                "core",
                "requestTimeoutMs",
                config.core.request_timeout_ms,
                CORE_TIMEOUT_MIN_MS,
                CORE_TIMEOUT_MAX_MS,
            )?,
            core_max_concurrency: bounded_u32(
                "core",
                "maxConcurrency",
                config.core.max_concurrency,
                CORE_MAX_CONCURRENCY_MIN,
                CORE_MAX_CONCURRENCY_MAX,
            )?,
            embedding_batch_size: bounded_u32(
                "embedding",
                "batchSize",
                config.embedding.batch_size,
                EMBEDDING_BATCH_SIZE_MIN,
                EMBEDDING_BATCH_SIZE_MAX,
            )?,
            job_queue_visibility_timeout_ms: bounded_u64(
                "jobQueue",
                "visibilityTimeoutMs",
                config.job_queue.visibility_timeout_ms,
                JOB_QUEUE_VISIBILITY_TIMEOUT_MIN_MS,
                JOB_QUEUE_VISIBILITY_TIMEOUT_MAX_MS,
            )?,
        })
    }
}

/// Parse a backend config from a JSON string, applying validation and normalization.
pub fn parse_backend_config_json(input: &str) -> Result<ValidatedBackendConfig, ErrorEnvelope> {
    let config: BackendConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;
    config.validate_and_normalize().map_err(Into::into)
}

/// Parse a backend config from a TOML string, applying validation and normalization.
pub fn parse_backend_config_toml(input: &str) -> Result<ValidatedBackendConfig, ErrorEnvelope> {
    let config: BackendConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;
    config.validate_and_normalize().map_err(Into::into)
}

fn bounded_u32<const MIN: u32, const MAX: u32>(
    section: &'static str,
    field: &'static str,
    value: u32,
    min: u32,
    max: u32,
) -> Result<BoundedU32<MIN, MAX>, ConfigSchemaError> {
    BoundedU32::try_new(value).map_err(|_| ConfigSchemaError::LimitOutOfRange {
        section,
        field,
        value: u64::from(value),
        min: u64::from(min),
        max: u64::from(max),
    })
}

fn bounded_u64<const MIN: u64, const MAX: u64>(
    section: &'static str,
    field: &'static str,
    value: u64,
    min: u64,
    max: u64,
) -> Result<BoundedU64<MIN, MAX>, ConfigSchemaError> {
    BoundedU64::try_new(value).map_err(|_| ConfigSchemaError::LimitOutOfRange {
        section,
        field,
        value,
        min,
        max,
    })
}

fn validate_http_url(
    section: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ConfigSchemaError> {
    let parsed = Url::parse(value).map_err(|_| ConfigSchemaError::InvalidUrl {
        section,
        field,
        url: sanitize_url_for_error(value),
    })?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigSchemaError::InvalidUrl {
            section,
            field,
            url: sanitize_url_for_error(value),
        });
    }
    Ok(())
}

fn validate_redis_url(
    section: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ConfigSchemaError> {
    let parsed = Url::parse(value).map_err(|_| ConfigSchemaError::InvalidUrl {
        section,
        field,
        url: sanitize_url_for_error(value),
    })?;
    if parsed.scheme() != "redis" && parsed.scheme() != "rediss" {
        return Err(ConfigSchemaError::InvalidUrl {
            section,
            field,
            url: sanitize_url_for_error(value),
        });
    }
    Ok(())
}

/// Configuration schema validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this binary.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// A numeric limit is out of bounds.
    LimitOutOfRange {
        /// Schema section (e.g. `jobQueue`).
        section: &'static str,
        /// Field name in the config file (e.g. `maxRetries`).
        field: &'static str,
        /// Value provided.
        value: u64,
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
    },
    /// A URL entry is invalid for the protocol the section expects.
    InvalidUrl {
        /// Schema section (e.g. `embedding`).
        section: &'static str,
        /// Field name in the config file (e.g. `baseUrl`).
        field: &'static str,
        /// Invalid URL value, with credentials stripped.
        url: String,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::LimitOutOfRange { .. } => ErrorCode::new("config", "invalid_limit"),
            Self::InvalidUrl { .. } => ErrorCode::new("config", "invalid_url"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => write!(
                formatter,
                "unsupported config version: {found} (supported: {supported})"
            ),
            Self::LimitOutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => write!(
                formatter,
                "{section}.{field} must be within [{min}, {max}] (got {value})"
            ),
            Self::InvalidUrl { section, field, .. } => {
                write!(formatter, "invalid URL for {section}.{field}")
            },
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let mut envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => {
                envelope = envelope
                    .with_metadata("found", found.to_string())
                    .with_metadata("supported", supported.to_string());
            },
            ConfigSchemaError::LimitOutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => {
                envelope = envelope
                    .with_metadata("section", section)
                    .with_metadata("field", field)
                    .with_metadata("value", value.to_string())
                    .with_metadata("min", min.to_string())
                    .with_metadata("max", max.to_string());
            },
            ConfigSchemaError::InvalidUrl { section, field, url } => {
                envelope = envelope
                    .with_metadata("section", section)
                    .with_metadata("field", field)
                    .with_metadata("url", url);
            },
        }
        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = BackendConfig::default();
        assert!(config.validate_and_normalize().is_ok());
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut config = BackendConfig::default();
        config.version = 99;
        let error = config.validate_and_normalize().unwrap_err();
        assert!(matches!(error, ConfigSchemaError::UnsupportedVersion { .. }));
    }

    #[test]
    fn rejects_out_of_range_batch_size() {
        let mut config = BackendConfig::default();
        config.embedding.batch_size = 0;
        assert!(config.validate_and_normalize().is_err());
    }

    #[test]
    fn rejects_non_redis_scheme_for_job_queue() {
        let mut config = BackendConfig::default();
        config.job_queue.redis_url = "http://localhost:6379".into();
        let error = config.validate_and_normalize().unwrap_err();
        assert!(matches!(error, ConfigSchemaError::InvalidUrl { .. }));
    }

    #[test]
    fn rejects_qdrant_url_when_mode_is_qdrant() {
        let mut config = BackendConfig::default();
        config.vector_db.mode = VectorDbMode::Qdrant;
        config.vector_db.qdrant.base_url = "not a url".into();
        assert!(config.validate_and_normalize().is_err());
    }

    #[test]
    fn json_roundtrip_parses_defaults() {
        let json = serde_json::to_string(&BackendConfig::default()).unwrap();
        let parsed = parse_backend_config_json(&json).unwrap();
        assert_eq!(parsed.into_inner(), BackendConfig::default());
    }
}
