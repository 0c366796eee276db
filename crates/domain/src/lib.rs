//! # resumariner-domain
//!
//! Domain entities, primitives, and value objects for the resume ingestion
//! and hybrid-search engine.
//!
//! This crate contains the core domain model with no infrastructure
//! dependencies:
//!
//! - **Primitives** - `Uid`, `JobId`, `Email`, `CefrLevel`
//! - **Resume** - the resume aggregate and its exclusive children
//! - **Job** - ingestion job records and the queue task envelope
//! - **ParsedDocument** - extracted document content, pre-structuring
//! - **EmbeddingPoint** - vector-store payload derived from a resume
//! - **Search** - structured search filters and hybrid score merging
//! - **Review** - resume review feedback and criteria
//! - **Rag** - structured-output types for the RAG service
//!
//! ## Dependency Rules
//!
//! - Depends only on the `shared` crate
//! - No infrastructure or adapter dependencies
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

// Re-export shared types for convenience
pub use resumariner_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod embedding_point;
pub mod job;
pub mod parsed_document;
pub mod primitives;
pub mod rag;
pub mod resume;
pub mod review;
pub mod search;

pub use embedding_point::{EmbeddingPoint, EmbeddingSource};
pub use job::{Job, JobResult, JobStatus, TaskEnvelope};
pub use parsed_document::{PageLink, ParsedDocument, ParsedPage, ProcessingMethod};
pub use primitives::{CefrLevel, Email, JobId, PrimitiveError, Uid};
pub use rag::{
    CandidateComparison, CandidateScores, ComparisonDimension, ConcernSeverity, InterviewQuestion,
    InterviewQuestionSet, InterviewType, JobMatchExplanation, MatchConcern, MatchRecommendation,
    QuestionCategory, SeniorityLevel,
};
pub use resume::{
    Award, AwardType, Certification, CompanyInfo, Contact, ContactLinks, Coursework, Course,
    Demographics, EducationExtra, EducationItem, EducationStatus, EmploymentDuration,
    EmploymentHistoryItem, EmploymentType, InstitutionInfo, KeyPoint, Language,
    LanguageProficiency, Location, PersonalInfo, Preferences, ProfessionalProfile, Project,
    PublicationType, Resume, ScientificContribution, Skill, Technology, WorkAuthorization,
    WorkMode, normalize_legacy_resume_json,
};
pub use review::{REVIEW_CRITERIA, ReviewCriteria, ReviewResult, SectionFeedback, SeverityLevel, criteria_for_section};
pub use search::{
    EducationRequirement, HybridWeights, LanguageRequirement, LocationRequirement, SearchFilters,
    SearchMode,
};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_crate_compiles() {
        let version = domain_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn domain_depends_on_shared() {
        // Verify we can access shared crate
        let shared_version = shared_crate_version();
        assert!(!shared_version.is_empty());
    }
}
