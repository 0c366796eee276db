//! # resumariner-config
//!
//! Configuration schema, validation, and normalization logic for the
//! ingestion/search backend. This crate depends on `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (file + env overrides).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use schema::{
    BackendConfig, CURRENT_CONFIG_VERSION, CircuitBreakerTuning, ConfigLimits, ConfigSchemaError,
    CoreConfig, EmbeddingConfig, GraphStoreConfig, IngestLimits, JobQueueConfig, LlmConfig,
    LocalVectorConfig, LogFormat, LogLevelSetting, LoggingConfig, QdrantConfig, RetryConfig,
    ValidatedBackendConfig, VectorDbConfig, VectorDbMode, parse_backend_config_json,
    parse_backend_config_toml,
};

pub use env::{BackendEnv, EnvParseError, apply_env_overrides};
pub use load::{
    load_backend_config_from_path, load_backend_config_from_sources, load_backend_config_std_env,
    to_pretty_json, to_pretty_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use resumariner_shared::shared_crate_version;

    #[test]
    fn config_crate_compiles() {
        let version = config_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn config_can_use_shared() {
        let shared_version = shared_crate_version();
        assert!(!shared_version.is_empty());
    }
}
