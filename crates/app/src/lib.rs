//! # resumariner-app
//!
//! Application use cases: resume ingestion, content structuring, review,
//! search coordination, and RAG. This crate depends on `ports`, `domain`,
//! and `shared` only — never on `adapters` or `infra`.

pub mod ingest;
pub mod rag;
pub mod reviewer;
pub mod search;
pub mod structurer;

pub use ingest::{IngestionDeps, IngestionInput, ingest_one, run_cleanup, run_worker};
pub use rag::{RagDeps, compare_candidates, explain_match, generate_interview_questions};
pub use reviewer::review_resume;
pub use search::{
    CountedOption, CountryOption, EducationLevelOption, FilterOptions, HybridSearchInput,
    LanguageOption, MatchedPoint, SearchCoordinatorDeps, SearchHit, SemanticSearchInput,
    filter_options, hybrid_search, search, semantic_search, structured_search,
};
pub use structurer::structure_resume;

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use resumariner_domain::domain_crate_version;
    use resumariner_ports::ports_crate_version;
    use resumariner_shared::shared_crate_version;

    #[test]
    fn app_crate_compiles() {
        let version = app_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn app_can_use_ports_domain_shared() {
        let ports_version = ports_crate_version();
        let domain_version = domain_crate_version();
        let shared_version = shared_crate_version();

        assert!(!ports_version.is_empty());
        assert!(!domain_version.is_empty());
        assert!(!shared_version.is_empty());
    }
}
