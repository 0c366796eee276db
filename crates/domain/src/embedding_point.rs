//! Vector-store payload produced from a structured resume.

use crate::primitives::Uid;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which part of the resume an [`EmbeddingPoint`] was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingSource {
    /// Professional summary.
    Summary,
    /// A single skill.
    Skill,
    /// An employment history entry.
    Employment,
    /// A project.
    Project,
    /// An education entry.
    Education,
}

/// One searchable vector point plus the payload used for server-side
/// filtering. `id` is a fresh UUID on every write; `uid` is the join key
/// back to the resume in the graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingPoint {
    /// Fresh identifier for this point.
    pub id: Uuid,
    /// Resume this point belongs to.
    pub uid: Uid,
    /// Embedding vector; dimension must equal the configured collection
    /// dimension (default 384).
    pub vector: Vec<f32>,
    /// Source text the vector was computed from.
    pub text: String,
    /// Which resume section this point was derived from.
    pub source: EmbeddingSource,
    /// Extra context describing where in the section this came from, e.g.
    /// a company name for an employment-history point.
    pub context: Option<String>,
    /// Candidate name, denormalized for display without a graph lookup.
    pub name: String,
    /// Candidate email, denormalized and indexed for filtering.
    pub email: String,
    /// Skill names, for payload filtering.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Technology names, for payload filtering.
    #[serde(default)]
    pub technologies: Vec<String>,
    /// Company names from employment history, for payload filtering.
    #[serde(default)]
    pub companies: Vec<String>,
    /// Desired or most recent role, when known.
    pub role: Option<String>,
    /// Candidate location, when known.
    pub location: Option<String>,
    /// Total years of experience at the time this point was written.
    pub years_experience: f64,
}

impl EmbeddingPoint {
    /// Whether `vector`'s length matches the configured collection
    /// dimension. Mismatched points are skipped by the vector store
    /// adapter rather than stored.
    #[must_use]
    pub fn has_dimension(&self, expected_dimension: usize) -> bool {
        self.vector.len() == expected_dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_point(dimension: usize) -> EmbeddingPoint {
        EmbeddingPoint {
            id: Uuid::new_v4(),
            uid: Uid::new_random(),
            vector: vec![0.1; dimension],
            text: "Experienced backend engineer".to_string(),
            source: EmbeddingSource::Summary,
            context: None,
            name: "Max".to_string(),
            email: "max@example.com".to_string(),
            skills: vec!["Rust".to_string()],
            technologies: vec![],
            companies: vec![],
            role: Some("Backend Engineer".to_string()),
            location: None,
            years_experience: 4.5,
        }
    }

    #[test]
    fn dimension_check_matches_configured_size() {
        let point = sample_point(384);
        assert!(point.has_dimension(384));
        assert!(!point.has_dimension(768));
    }
}
