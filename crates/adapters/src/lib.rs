//! # resumariner-adapters
//!
//! Adapter implementations for ports (embedding, vector store, logging,
//! telemetry, etc.). This crate depends on `ports`, `shared`, `config`, and
//! `vector`; it never depends on `app` or `infra`.

/// Reference PDF document extractor.
pub mod document_extractor;
/// External embedding adapters.
pub mod embedding;

/// Graph store adapters (Neo4j HTTP/Cypher, in-memory).
pub mod graph_store;
/// Redis-backed job queue adapter.
pub mod job_queue;
/// Redis-backed job store adapter.
pub mod job_store;
/// LLM adapters.
pub mod llm;
pub mod log_sink;
pub mod logger;
pub mod telemetry;
/// Local, linear-scan vector store adapter.
pub mod vectordb_local;
/// Qdrant REST vector store adapter.
pub mod vectordb_qdrant;
/// Upload validation: extension/signature dispatch, size limits, content scan.
pub mod validation;

/// Placeholder module for adapters.
pub mod placeholder {
    /// Placeholder function to verify the crate compiles.
    #[must_use]
    pub const fn adapters_crate_version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

pub use placeholder::adapters_crate_version;

#[cfg(test)]
mod tests {
    use super::*;
    use resumariner_ports::ports_crate_version;
    use resumariner_shared::shared_crate_version;
    use resumariner_vector::vector_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;
        let mut in_dev_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]";
                in_dev_deps = line == "[dev-dependencies]";
                continue;
            }
            if !(in_deps || in_dev_deps) {
                continue;
            }
            if line.starts_with("resumariner-") {
                let key = line.split('=').next().unwrap_or("").trim();
                let name = key.split('.').next().unwrap_or("").trim();
                deps.push(name.to_string());
            }
        }

        deps
    }

    /// Adapters must stay a leaf layer: it compiles without importing the
    /// use-case (`app`) or composition-root (`infra`) crates.
    #[test]
    fn adapters_do_not_depend_on_app_or_infra() {
        let deps = workspace_deps();
        let forbidden = ["resumariner-app", "resumariner-infra"];

        for dep in &deps {
            assert!(
                !forbidden.contains(&dep.as_str()),
                "forbidden dependency found: {dep}"
            );
        }
    }

    #[test]
    fn adapters_crate_compiles() {
        let version = adapters_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn adapters_can_use_ports_shared_vector() {
        let ports_version = ports_crate_version();
        let shared_version = shared_crate_version();
        let vector_version = vector_crate_version();

        assert!(!ports_version.is_empty());
        assert!(!shared_version.is_empty());
        assert!(!vector_version.is_empty());
    }
}
