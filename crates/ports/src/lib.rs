//! # resumariner-ports
//!
//! Port traits for the resumariner hexagonal architecture.
//!
//! This crate defines the interfaces between the domain and infrastructure
//! layers: job store, job queue, LLM client, embedding client, document
//! extractor, graph store, vector store, plus structured logging and
//! telemetry. It depends only on `domain` and `shared`.

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by port traits.
///
/// We deliberately use boxed futures for boundary traits (I/O-bound work), and
/// prefer batch APIs for hot paths where allocation overhead matters.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod document_extractor;
pub mod embedding;
pub mod graph_store;
pub mod job_queue;
pub mod job_store;
pub mod llm;
pub mod logger;
pub mod telemetry;
pub mod vectordb;

pub use document_extractor::*;
pub use embedding::*;
pub use graph_store::*;
pub use job_queue::*;
pub use job_store::*;
pub use llm::*;
pub use logger::*;
pub use telemetry::*;
pub use vectordb::*;

// Re-export selected domain types used in port signatures, so adapter crates
// can implement ports without directly depending on `resumariner-domain`.
pub use resumariner_domain::{
    CefrLevel, Email, EmbeddingPoint, Job, JobId, JobResult, JobStatus, ParsedDocument, Resume,
    SearchFilters, TaskEnvelope, Uid,
};

#[cfg(test)]
mod tests {
    use super::*;
    use resumariner_domain::domain_crate_version;
    use resumariner_shared::shared_crate_version;

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

    /// ports depends only on domain + shared
    #[test]
    fn ports_depends_only_on_domain_and_shared() {
        let deps = workspace_deps();
        let allowed = ["resumariner-domain", "resumariner-shared"];

        for dep in &deps {
            assert!(
                allowed.contains(&dep.as_str()),
                "unexpected dependency found: {dep}"
            );
        }

        for expected in allowed {
            assert!(
                deps.iter().any(|dep| dep == expected),
                "missing dependency: {expected}"
            );
        }
    }

    #[test]
    fn ports_crate_compiles() {
        let version = ports_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn ports_can_use_domain_and_shared() {
        let domain_version = domain_crate_version();
        let shared_version = shared_crate_version();

        assert!(!domain_version.is_empty());
        assert!(!shared_version.is_empty());
    }
}
