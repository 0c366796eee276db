//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict (invalid values fail fast) and safe (secret values
//! are redacted in error metadata). All variables use the `RSM_` prefix.

use crate::schema::{BackendConfig, LogFormat, LogLevelSetting, ValidatedBackendConfig, VectorDbMode};
use resumariner_shared::{ErrorCode, ErrorEnvelope, REDACTED_VALUE, SecretString, is_secret_key};
use std::collections::BTreeMap;
use std::fmt;

/// Env var: HTTP listen port.
pub const ENV_CORE_PORT: &str = "RSM_CORE_PORT";
/// Env var: default per-request timeout (ms).
pub const ENV_CORE_REQUEST_TIMEOUT_MS: &str = "RSM_CORE_REQUEST_TIMEOUT_MS";
/// Env var: max concurrent ingestion jobs.
pub const ENV_CORE_MAX_CONCURRENCY: &str = "RSM_CORE_MAX_CONCURRENCY";
/// Env var: max accepted upload size (bytes).
pub const ENV_CORE_MAX_UPLOAD_BYTES: &str = "RSM_CORE_MAX_UPLOAD_BYTES";
/// Env var: retry max attempts.
pub const ENV_CORE_RETRY_MAX_ATTEMPTS: &str = "RSM_CORE_RETRY_MAX_ATTEMPTS";
/// Env var: retry base delay (ms).
pub const ENV_CORE_RETRY_BASE_DELAY_MS: &str = "RSM_CORE_RETRY_BASE_DELAY_MS";
/// Env var: retry max delay (ms).
pub const ENV_CORE_RETRY_MAX_DELAY_MS: &str = "RSM_CORE_RETRY_MAX_DELAY_MS";
/// Env var: minimum log level (`debug`, `info`, `warn`, `error`).
pub const ENV_CORE_LOG_LEVEL: &str = "RSM_CORE_LOG_LEVEL";
/// Env var: log encoding (`json` or `pretty`).
pub const ENV_CORE_LOG_FORMAT: &str = "RSM_CORE_LOG_FORMAT";
/// Env var: circuit breaker failure threshold shared by every adapter.
pub const ENV_CORE_CIRCUIT_BREAKER_FAIL_MAX: &str = "RSM_CORE_CIRCUIT_BREAKER_FAIL_MAX";
/// Env var: circuit breaker recovery timeout (ms).
pub const ENV_CORE_CIRCUIT_BREAKER_RESET_TIMEOUT_MS: &str =
    "RSM_CORE_CIRCUIT_BREAKER_RESET_TIMEOUT_MS";
/// Env var: maximum accepted PDF upload size (bytes).
pub const ENV_INGEST_MAX_PDF_BYTES: &str = "RSM_INGEST_MAX_PDF_BYTES";
/// Env var: maximum accepted image upload size (bytes).
pub const ENV_INGEST_MAX_IMAGE_BYTES: &str = "RSM_INGEST_MAX_IMAGE_BYTES";

/// Env var: embedding model override.
pub const ENV_EMBEDDING_MODEL: &str = "RSM_EMBEDDING_MODEL";
/// Env var: embedding base URL override.
pub const ENV_EMBEDDING_BASE_URL: &str = "RSM_EMBEDDING_BASE_URL";
/// Env var: embedding output dimension override.
pub const ENV_EMBEDDING_DIMENSION: &str = "RSM_EMBEDDING_DIMENSION";
/// Env var: embedding request timeout (ms).
pub const ENV_EMBEDDING_TIMEOUT_MS: &str = "RSM_EMBEDDING_TIMEOUT_MS";
/// Env var: embedding batch size.
pub const ENV_EMBEDDING_BATCH_SIZE: &str = "RSM_EMBEDDING_BATCH_SIZE";
/// Env var: embedding API key (secret, never logged).
pub const ENV_EMBEDDING_API_KEY: &str = "RSM_EMBEDDING_API_KEY";

/// Env var: vector DB backend mode (`local` or `qdrant`).
pub const ENV_VECTOR_DB_MODE: &str = "RSM_VECTOR_DB_MODE";
/// Env var: Qdrant base URL.
pub const ENV_VECTOR_DB_QDRANT_BASE_URL: &str = "RSM_VECTOR_DB_QDRANT_BASE_URL";
/// Env var: Qdrant collection name.
pub const ENV_VECTOR_DB_QDRANT_COLLECTION: &str = "RSM_VECTOR_DB_QDRANT_COLLECTION";
/// Env var: Qdrant API key (secret, never logged).
pub const ENV_VECTOR_DB_QDRANT_API_KEY: &str = "RSM_VECTOR_DB_QDRANT_API_KEY";
/// Env var: local vector snapshot directory.
pub const ENV_VECTOR_DB_LOCAL_SNAPSHOT_DIR: &str = "RSM_VECTOR_DB_LOCAL_SNAPSHOT_DIR";

/// Env var: job queue Redis URL.
pub const ENV_JOB_QUEUE_REDIS_URL: &str = "RSM_JOB_QUEUE_REDIS_URL";
/// Env var: job queue visibility timeout (ms).
pub const ENV_JOB_QUEUE_VISIBILITY_TIMEOUT_MS: &str = "RSM_JOB_QUEUE_VISIBILITY_TIMEOUT_MS";
/// Env var: job queue max retries.
pub const ENV_JOB_QUEUE_MAX_RETRIES: &str = "RSM_JOB_QUEUE_MAX_RETRIES";

/// Env var: graph store base URL.
pub const ENV_GRAPH_STORE_BASE_URL: &str = "RSM_GRAPH_STORE_BASE_URL";
/// Env var: graph store database name.
pub const ENV_GRAPH_STORE_DATABASE: &str = "RSM_GRAPH_STORE_DATABASE";
/// Env var: graph store credentials, `user:password` (secret, never logged).
pub const ENV_GRAPH_STORE_AUTH: &str = "RSM_GRAPH_STORE_AUTH";

/// Env var: LLM base URL.
pub const ENV_LLM_BASE_URL: &str = "RSM_LLM_BASE_URL";
/// Env var: LLM model override.
pub const ENV_LLM_MODEL: &str = "RSM_LLM_MODEL";
/// Env var: LLM request timeout (ms).
pub const ENV_LLM_TIMEOUT_MS: &str = "RSM_LLM_TIMEOUT_MS";
/// Env var: LLM API key (secret, never logged).
pub const ENV_LLM_API_KEY: &str = "RSM_LLM_API_KEY";

const ALL_ENV_VARS: &[&str] = &[
    ENV_CORE_PORT,
    ENV_CORE_REQUEST_TIMEOUT_MS,
    ENV_CORE_MAX_CONCURRENCY,
    ENV_CORE_MAX_UPLOAD_BYTES,
    ENV_CORE_RETRY_MAX_ATTEMPTS,
    ENV_CORE_RETRY_BASE_DELAY_MS,
    ENV_CORE_RETRY_MAX_DELAY_MS,
    ENV_CORE_LOG_LEVEL,
    ENV_CORE_LOG_FORMAT,
    ENV_CORE_CIRCUIT_BREAKER_FAIL_MAX,
    ENV_CORE_CIRCUIT_BREAKER_RESET_TIMEOUT_MS,
    ENV_INGEST_MAX_PDF_BYTES,
    ENV_INGEST_MAX_IMAGE_BYTES,
    ENV_EMBEDDING_MODEL,
    ENV_EMBEDDING_BASE_URL,
    ENV_EMBEDDING_DIMENSION,
    ENV_EMBEDDING_TIMEOUT_MS,
    ENV_EMBEDDING_BATCH_SIZE,
    ENV_EMBEDDING_API_KEY,
    ENV_VECTOR_DB_MODE,
    ENV_VECTOR_DB_QDRANT_BASE_URL,
    ENV_VECTOR_DB_QDRANT_COLLECTION,
    ENV_VECTOR_DB_QDRANT_API_KEY,
    ENV_VECTOR_DB_LOCAL_SNAPSHOT_DIR,
    ENV_JOB_QUEUE_REDIS_URL,
    ENV_JOB_QUEUE_VISIBILITY_TIMEOUT_MS,
    ENV_JOB_QUEUE_MAX_RETRIES,
    ENV_GRAPH_STORE_BASE_URL,
    ENV_GRAPH_STORE_DATABASE,
    ENV_GRAPH_STORE_AUTH,
    ENV_LLM_BASE_URL,
    ENV_LLM_MODEL,
    ENV_LLM_TIMEOUT_MS,
    ENV_LLM_API_KEY,
];

/// Typed env-derived overrides for [`BackendConfig`]. Secret fields are kept
/// out of the config schema entirely and only ever flow through here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendEnv {
    /// Override for `core.port`.
    pub core_port: Option<u16>,
    /// Override for `core.requestTimeoutMs`.
    pub core_request_timeout_ms: Option<u64>,
    /// Override for `core.maxConcurrency`.
    pub core_max_concurrency: Option<u32>,
    /// Override for `core.maxUploadBytes`.
    pub core_max_upload_bytes: Option<u64>,
    /// Override for `core.retry.maxAttempts`.
    pub core_retry_max_attempts: Option<u32>,
    /// Override for `core.retry.baseDelayMs`.
    pub core_retry_base_delay_ms: Option<u64>,
    /// Override for `core.retry.maxDelayMs`.
    pub core_retry_max_delay_ms: Option<u64>,
    /// Override for `core.logging.level`.
    pub core_log_level: Option<LogLevelSetting>,
    /// Override for `core.logging.format`.
    pub core_log_format: Option<LogFormat>,
    /// Override for `core.circuitBreaker.failMax`.
    pub core_circuit_breaker_fail_max: Option<u32>,
    /// Override for `core.circuitBreaker.resetTimeoutMs`.
    pub core_circuit_breaker_reset_timeout_ms: Option<u64>,
    /// Override for `ingestLimits.maxPdfBytes`.
    pub ingest_max_pdf_bytes: Option<u64>,
    /// Override for `ingestLimits.maxImageBytes`.
    pub ingest_max_image_bytes: Option<u64>,

    /// Override for `embedding.model`.
    pub embedding_model: Option<Box<str>>,
    /// Override for `embedding.baseUrl`.
    pub embedding_base_url: Option<Box<str>>,
    /// Override for `embedding.dimension`.
    pub embedding_dimension: Option<u32>,
    /// Override for `embedding.timeoutMs`.
    pub embedding_timeout_ms: Option<u64>,
    /// Override for `embedding.batchSize`.
    pub embedding_batch_size: Option<u32>,
    /// Embedding provider API key. Not part of `BackendConfig`; read
    /// directly by the adapter at startup.
    pub embedding_api_key: Option<SecretString>,

    /// Override for `vectorDb.mode`.
    pub vector_db_mode: Option<VectorDbMode>,
    /// Override for `vectorDb.qdrant.baseUrl`.
    pub vector_db_qdrant_base_url: Option<Box<str>>,
    /// Override for `vectorDb.qdrant.collection`.
    pub vector_db_qdrant_collection: Option<Box<str>>,
    /// Qdrant API key. Not part of `BackendConfig`.
    pub vector_db_qdrant_api_key: Option<SecretString>,
    /// Override for `vectorDb.local.snapshotDir`.
    pub vector_db_local_snapshot_dir: Option<Box<str>>,

    /// Override for `jobQueue.redisUrl`.
    pub job_queue_redis_url: Option<Box<str>>,
    /// Override for `jobQueue.visibilityTimeoutMs`.
    pub job_queue_visibility_timeout_ms: Option<u64>,
    /// Override for `jobQueue.maxRetries`.
    pub job_queue_max_retries: Option<u32>,

    /// Override for `graphStore.baseUrl`.
    pub graph_store_base_url: Option<Box<str>>,
    /// Override for `graphStore.database`.
    pub graph_store_database: Option<Box<str>>,
    /// Graph store `user:password` credentials. Not part of `BackendConfig`.
    pub graph_store_auth: Option<SecretString>,

    /// Override for `llm.baseUrl`.
    pub llm_base_url: Option<Box<str>>,
    /// Override for `llm.model`.
    pub llm_model: Option<Box<str>>,
    /// Override for `llm.timeoutMs`.
    pub llm_timeout_ms: Option<u64>,
    /// LLM provider API key. Not part of `BackendConfig`.
    pub llm_api_key: Option<SecretString>,
}

impl BackendEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            core_port: parse_optional_u16(map, ENV_CORE_PORT)?,
            core_request_timeout_ms: parse_optional_u64(map, ENV_CORE_REQUEST_TIMEOUT_MS)?,
            core_max_concurrency: parse_optional_u32(map, ENV_CORE_MAX_CONCURRENCY)?,
            core_max_upload_bytes: parse_optional_u64(map, ENV_CORE_MAX_UPLOAD_BYTES)?,
            core_retry_max_attempts: parse_optional_u32(map, ENV_CORE_RETRY_MAX_ATTEMPTS)?,
            core_retry_base_delay_ms: parse_optional_u64(map, ENV_CORE_RETRY_BASE_DELAY_MS)?,
            core_retry_max_delay_ms: parse_optional_u64(map, ENV_CORE_RETRY_MAX_DELAY_MS)?,
            core_log_level: parse_optional_log_level(map, ENV_CORE_LOG_LEVEL)?,
            core_log_format: parse_optional_log_format(map, ENV_CORE_LOG_FORMAT)?,
            core_circuit_breaker_fail_max: parse_optional_u32(
                map,
                ENV_CORE_CIRCUIT_BREAKER_FAIL_MAX,
            )?,
            core_circuit_breaker_reset_timeout_ms: parse_optional_u64(
                map,
                ENV_CORE_CIRCUIT_BREAKER_RESET_TIMEOUT_MS,
            )?,
            ingest_max_pdf_bytes: parse_optional_u64(map, ENV_INGEST_MAX_PDF_BYTES)?,
            ingest_max_image_bytes: parse_optional_u64(map, ENV_INGEST_MAX_IMAGE_BYTES)?,

            embedding_model: parse_optional_trimmed_string(map, ENV_EMBEDDING_MODEL)?,
            embedding_base_url: parse_optional_trimmed_string(map, ENV_EMBEDDING_BASE_URL)?,
            embedding_dimension: parse_optional_u32(map, ENV_EMBEDDING_DIMENSION)?,
            embedding_timeout_ms: parse_optional_u64(map, ENV_EMBEDDING_TIMEOUT_MS)?,
            embedding_batch_size: parse_optional_u32(map, ENV_EMBEDDING_BATCH_SIZE)?,
            embedding_api_key: parse_optional_secret(map, ENV_EMBEDDING_API_KEY)?,

            vector_db_mode: parse_optional_vector_db_mode(map, ENV_VECTOR_DB_MODE)?,
            vector_db_qdrant_base_url: parse_optional_trimmed_string(
                map,
                ENV_VECTOR_DB_QDRANT_BASE_URL,
            )?,
            vector_db_qdrant_collection: parse_optional_trimmed_string(
                map,
                ENV_VECTOR_DB_QDRANT_COLLECTION,
            )?,
            vector_db_qdrant_api_key: parse_optional_secret(map, ENV_VECTOR_DB_QDRANT_API_KEY)?,
            vector_db_local_snapshot_dir: parse_optional_trimmed_string(
                map,
                ENV_VECTOR_DB_LOCAL_SNAPSHOT_DIR,
            )?,

            job_queue_redis_url: parse_optional_trimmed_string(map, ENV_JOB_QUEUE_REDIS_URL)?,
            job_queue_visibility_timeout_ms: parse_optional_u64(
                map,
                ENV_JOB_QUEUE_VISIBILITY_TIMEOUT_MS,
            )?,
            job_queue_max_retries: parse_optional_u32(map, ENV_JOB_QUEUE_MAX_RETRIES)?,

            graph_store_base_url: parse_optional_trimmed_string(map, ENV_GRAPH_STORE_BASE_URL)?,
            graph_store_database: parse_optional_trimmed_string(map, ENV_GRAPH_STORE_DATABASE)?,
            graph_store_auth: parse_optional_secret(map, ENV_GRAPH_STORE_AUTH)?,

            llm_base_url: parse_optional_trimmed_string(map, ENV_LLM_BASE_URL)?,
            llm_model: parse_optional_trimmed_string(map, ENV_LLM_MODEL)?,
            llm_timeout_ms: parse_optional_u64(map, ENV_LLM_TIMEOUT_MS)?,
            llm_api_key: parse_optional_secret(map, ENV_LLM_API_KEY)?,
        })
    }

    /// Parse env overrides from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for name in ALL_ENV_VARS {
            if let Ok(value) = std::env::var(name) {
                map.insert((*name).to_string(), value);
            }
        }
        Self::from_map(&map)
    }
}

/// Apply env overrides to a base config (env wins over file/default values).
/// Returns the validated config; secret fields are returned separately by
/// the caller via `env` since they never enter `BackendConfig`.
pub fn apply_env_overrides(
    base: BackendConfig,
    env: &BackendEnv,
) -> Result<ValidatedBackendConfig, ErrorEnvelope> {
    let mut config = base;

    if let Some(port) = env.core_port {
        config.core.port = port;
    }
    set_u64(&mut config.core.request_timeout_ms, env.core_request_timeout_ms);
    set_u32(&mut config.core.max_concurrency, env.core_max_concurrency);
    set_u64(&mut config.core.max_upload_bytes, env.core_max_upload_bytes);
    set_u32(&mut config.core.retry.max_attempts, env.core_retry_max_attempts);
    set_u64(&mut config.core.retry.base_delay_ms, env.core_retry_base_delay_ms);
    set_u64(&mut config.core.retry.max_delay_ms, env.core_retry_max_delay_ms);
    if let Some(level) = env.core_log_level {
        config.core.logging.level = level;
    }
    if let Some(format) = env.core_log_format {
        config.core.logging.format = format;
    }
    set_u32(
        &mut config.core.circuit_breaker.fail_max,
        env.core_circuit_breaker_fail_max,
    );
    set_u64(
        &mut config.core.circuit_breaker.reset_timeout_ms,
        env.core_circuit_breaker_reset_timeout_ms,
    );
    set_u64(&mut config.ingest_limits.max_pdf_bytes, env.ingest_max_pdf_bytes);
    set_u64(
        &mut config.ingest_limits.max_image_bytes,
        env.ingest_max_image_bytes,
    );

    set_opt_box_str(&mut config.embedding.model, env.embedding_model.as_deref());
    if let Some(base_url) = env.embedding_base_url.as_deref() {
        config.embedding.base_url = Some(base_url.to_owned().into_boxed_str());
    }
    set_u32(&mut config.embedding.dimension, env.embedding_dimension);
    set_u64(&mut config.embedding.timeout_ms, env.embedding_timeout_ms);
    set_u32(&mut config.embedding.batch_size, env.embedding_batch_size);

    if let Some(mode) = env.vector_db_mode {
        config.vector_db.mode = mode;
    }
    set_opt_box_str(
        &mut config.vector_db.qdrant.base_url,
        env.vector_db_qdrant_base_url.as_deref(),
    );
    set_opt_box_str(
        &mut config.vector_db.qdrant.collection,
        env.vector_db_qdrant_collection.as_deref(),
    );
    if let Some(dir) = env.vector_db_local_snapshot_dir.as_deref() {
        config.vector_db.local.snapshot_dir = Some(dir.to_owned().into_boxed_str());
    }

    set_opt_box_str(
        &mut config.job_queue.redis_url,
        env.job_queue_redis_url.as_deref(),
    );
    set_u64(
        &mut config.job_queue.visibility_timeout_ms,
        env.job_queue_visibility_timeout_ms,
    );
    set_u32(&mut config.job_queue.max_retries, env.job_queue_max_retries);

    set_opt_box_str(
        &mut config.graph_store.base_url,
        env.graph_store_base_url.as_deref(),
    );
    set_opt_box_str(
        &mut config.graph_store.database,
        env.graph_store_database.as_deref(),
    );

    set_opt_box_str(&mut config.llm.base_url, env.llm_base_url.as_deref());
    set_opt_box_str(&mut config.llm.model, env.llm_model.as_deref());
    set_u64(&mut config.llm.timeout_ms, env.llm_timeout_ms);

    config.validate_and_normalize().map_err(Into::into)
}

fn set_u32(field: &mut u32, value: Option<u32>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn set_u64(field: &mut u64, value: Option<u64>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn set_opt_box_str(field: &mut Box<str>, value: Option<&str>) {
    if let Some(value) = value {
        *field = value.to_owned().into_boxed_str();
    }
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    Ok(Some(trimmed.to_owned().into_boxed_str()))
}

fn parse_optional_secret(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<SecretString>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptySecret { var });
    }
    Ok(Some(SecretString::new(trimmed.to_owned())))
}

fn parse_optional_u64(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u64>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt { var, value: raw.clone() })
}

fn parse_optional_u32(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u32>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt { var, value: raw.clone() })
}

fn parse_optional_u16(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u16>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    trimmed
        .parse::<u16>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt { var, value: raw.clone() })
}

fn parse_optional_vector_db_mode(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<VectorDbMode>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "local" => Ok(Some(VectorDbMode::Local)),
        "qdrant" => Ok(Some(VectorDbMode::Qdrant)),
        _ => Err(EnvParseError::InvalidEnum { var, value: raw.clone() }),
    }
}

fn parse_optional_log_level(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<LogLevelSetting>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "debug" => Ok(Some(LogLevelSetting::Debug)),
        "info" => Ok(Some(LogLevelSetting::Info)),
        "warn" => Ok(Some(LogLevelSetting::Warn)),
        "error" => Ok(Some(LogLevelSetting::Error)),
        _ => Err(EnvParseError::InvalidEnum { var, value: raw.clone() }),
    }
}

fn parse_optional_log_format(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<LogFormat>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "json" => Ok(Some(LogFormat::Json)),
        "pretty" => Ok(Some(LogFormat::Pretty)),
        _ => Err(EnvParseError::InvalidEnum { var, value: raw.clone() }),
    }
}

fn redact_value(var: &str, value: &str) -> String {
    if is_secret_key(var) {
        REDACTED_VALUE.to_string()
    } else {
        value.to_string()
    }
}

/// Environment variable parsing error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// A secret env var was present but empty after trimming.
    EmptySecret {
        /// Env var name.
        var: &'static str,
    },
    /// Integer env var had an invalid value.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Enum env var had an invalid value.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } | Self::EmptySecret { .. } => {
                ErrorCode::new("config", "empty_env_var")
            },
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } | Self::EmptySecret { var } => {
                write!(formatter, "{var} must be non-empty")
            },
            Self::InvalidInt { var, .. } => write!(formatter, "{var} must be an integer"),
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let mut envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } | EnvParseError::EmptySecret { var } => {
                envelope = envelope.with_metadata("env_var", var);
            },
            EnvParseError::InvalidInt { var, value } | EnvParseError::InvalidEnum { var, value } => {
                envelope = envelope
                    .with_metadata("env_var", var)
                    .with_metadata("value", redact_value(var, &value));
            },
        }

        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_of(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn empty_map_yields_no_overrides() {
        let env = BackendEnv::from_map(&BTreeMap::new()).unwrap();
        assert_eq!(env, BackendEnv::default());
    }

    #[test]
    fn parses_core_overrides_and_applies_them() {
        let map = map_of(&[(ENV_CORE_MAX_CONCURRENCY, "8"), (ENV_CORE_PORT, "9090")]);
        let env = BackendEnv::from_map(&map).unwrap();
        let validated = apply_env_overrides(BackendConfig::default(), &env).unwrap();
        assert_eq!(validated.core.max_concurrency, 8);
        assert_eq!(validated.core.port, 9090);
    }

    #[test]
    fn rejects_invalid_vector_db_mode() {
        let map = map_of(&[(ENV_VECTOR_DB_MODE, "milvus")]);
        let error = BackendEnv::from_map(&map).unwrap_err();
        assert!(matches!(error, EnvParseError::InvalidEnum { .. }));
    }

    #[test]
    fn empty_secret_env_var_is_rejected() {
        let map = map_of(&[(ENV_LLM_API_KEY, "   ")]);
        let error = BackendEnv::from_map(&map).unwrap_err();
        assert!(matches!(error, EnvParseError::EmptySecret { .. }));
    }
}
