//! Structured search filters shared by the semantic, structured, and hybrid
//! search coordinator modes.

use crate::resume::EducationStatus;
use crate::primitives::CefrLevel;
use serde::{Deserialize, Serialize};

/// A country, optionally narrowed to a set of acceptable cities. Within
/// `SearchFilters.locations`, entries combine as any-of.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRequirement {
    /// Required country.
    pub country: String,
    /// Acceptable cities within that country; empty means any city.
    #[serde(default)]
    pub cities: Vec<String>,
}

/// An education requirement: a qualification-level match, optionally
/// narrowed to a set of acceptable statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationRequirement {
    /// Qualification level to match, e.g. `"Bachelor"`.
    pub level: String,
    /// Acceptable completion statuses; empty means any status.
    #[serde(default)]
    pub statuses: Vec<EducationStatus>,
}

/// A language requirement: the candidate must hold a proficiency in
/// `language` at or above `min_cefr`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRequirement {
    /// Language name, matched case-insensitively.
    pub language: String,
    /// Minimum CEFR level required.
    pub min_cefr: CefrLevel,
}

/// Structured filters accepted by every search coordinator mode. Each field
/// is independently optional; an all-`None`/empty filter set matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Resume must be connected to every listed skill (AND semantics).
    #[serde(default)]
    pub skills: Vec<String>,
    /// Case-insensitive substring match on the desired role.
    pub role: Option<String>,
    /// Any employment item's company name must match.
    pub company: Option<String>,
    /// Location requirements, combined as any-of across entries.
    #[serde(default)]
    pub locations: Vec<LocationRequirement>,
    /// Minimum total years of experience.
    pub years_experience: Option<f64>,
    /// Education requirements, combined as any-of across entries.
    #[serde(default)]
    pub education: Vec<EducationRequirement>,
    /// Language requirements, combined as AND across entries.
    #[serde(default)]
    pub languages: Vec<LanguageRequirement>,
}

impl SearchFilters {
    /// Whether every filter field is empty/unset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
            && self.role.is_none()
            && self.company.is_none()
            && self.locations.is_empty()
            && self.years_experience.is_none()
            && self.education.is_empty()
            && self.languages.is_empty()
    }
}

/// Which search strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Vector similarity search only.
    Semantic,
    /// Cypher query against the graph store only.
    Structured,
    /// Both modes run concurrently and scores are merged.
    Hybrid,
}

/// Score-merge weights for hybrid search. `SPEC_FULL.md` defaults to
/// `w_v=0.7, w_g=0.3`; if both weights are zero, callers should substitute
/// `0.5/0.5` rather than dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HybridWeights {
    /// Weight applied to the vector-search score component.
    pub vector_weight: f64,
    /// Weight applied to the graph-search presence component.
    pub graph_weight: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            vector_weight: 0.7,
            graph_weight: 0.3,
        }
    }
}

impl HybridWeights {
    /// Normalize to valid weights, falling back to `0.5/0.5` when both
    /// inputs are zero.
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.vector_weight <= 0.0 && self.graph_weight <= 0.0 {
            Self {
                vector_weight: 0.5,
                graph_weight: 0.5,
            }
        } else {
            self
        }
    }

    /// Combine a vector score (present in semantic results) and a graph
    /// presence flag into a single score, capped at `1.0`.
    #[must_use]
    pub fn combine(self, vector_score: Option<f64>, present_in_graph: bool) -> f64 {
        let weights = self.normalized();
        let v_component = vector_score.unwrap_or(0.0) * weights.vector_weight;
        let g_component = f64::from(u8::from(present_in_graph)) * weights.graph_weight;
        match vector_score {
            Some(_) if present_in_graph => (v_component + g_component).min(1.0),
            Some(_) => v_component.max(g_component),
            None => g_component,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_are_empty() {
        assert!(SearchFilters::default().is_empty());
    }

    #[test]
    fn non_default_filters_are_not_empty() {
        let filters = SearchFilters {
            skills: vec!["Rust".to_string()],
            ..SearchFilters::default()
        };
        assert!(!filters.is_empty());
    }

    #[test]
    fn hybrid_weights_fall_back_when_both_zero() {
        let weights = HybridWeights {
            vector_weight: 0.0,
            graph_weight: 0.0,
        }
        .normalized();
        assert!((weights.vector_weight - 0.5).abs() < f64::EPSILON);
        assert!((weights.graph_weight - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn hybrid_combine_caps_at_one_when_present_in_both() {
        let weights = HybridWeights::default();
        let combined = weights.combine(Some(1.0), true);
        assert!(combined <= 1.0);
    }

    #[test]
    fn hybrid_combine_takes_max_when_vector_only() {
        let weights = HybridWeights::default();
        let combined = weights.combine(Some(0.9), false);
        assert!((combined - 0.63).abs() < 1e-9);
    }
}
