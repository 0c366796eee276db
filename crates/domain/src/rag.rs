//! Structured-output types for the RAG service's three LLM-backed
//! operations: match explanation, candidate comparison, interview
//! question generation.

use crate::primitives::Uid;
use serde::{Deserialize, Serialize};

/// Overall fit recommendation for [`JobMatchExplanation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRecommendation {
    /// Strong fit for the role.
    StrongFit,
    /// Moderate fit; worth a conversation.
    ModerateFit,
    /// Weak fit.
    WeakFit,
}

/// How serious a concern raised in a match explanation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcernSeverity {
    /// Likely disqualifying.
    Critical,
    /// Worth raising in screening.
    Moderate,
    /// Minor, easily addressed.
    Minor,
}

/// A single concern raised against a candidate/role match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConcern {
    /// Concern description.
    pub description: String,
    /// How serious the concern is.
    pub severity: ConcernSeverity,
}

/// `ExplainMatch` output: how well one resume fits one job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatchExplanation {
    /// Resume evaluated.
    pub uid: Uid,
    /// Match score in `[0, 1]`.
    pub match_score: f64,
    /// Overall recommendation.
    pub recommendation: MatchRecommendation,
    /// 1-5 strengths supporting the match.
    pub strengths: Vec<String>,
    /// 0-5 concerns, each with a severity.
    pub concerns: Vec<MatchConcern>,
    /// 2-3 sentence summary, 50-500 characters.
    pub summary: String,
    /// Up to 3 points worth raising in a screening conversation.
    pub discussion_points: Vec<String>,
}

impl JobMatchExplanation {
    /// Whether `strengths`, `concerns`, `summary`, and
    /// `discussion_points` satisfy the documented cardinality bounds.
    #[must_use]
    pub fn has_valid_cardinality(&self) -> bool {
        (1..=5).contains(&self.strengths.len())
            && self.concerns.len() <= 5
            && (50..=500).contains(&self.summary.chars().count())
            && self.discussion_points.len() <= 3
    }
}

/// One scored dimension used to compare candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonDimension {
    /// Dimension name, e.g. `"technical depth"`.
    pub name: String,
    /// Per-candidate assessment text, keyed by candidate `uid` string form.
    pub assessments: std::collections::BTreeMap<String, String>,
}

/// Per-candidate scores on the four fixed comparison dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateScores {
    /// Candidate this score set belongs to.
    pub uid: Uid,
    /// Technical depth score, 0-10.
    pub technical_depth: f64,
    /// Experience relevance score, 0-10.
    pub experience_relevance: f64,
    /// Growth trajectory score, 0-10.
    pub growth_trajectory: f64,
    /// Culture/role fit score, 0-10.
    pub role_fit: f64,
    /// Weighted overall score.
    pub overall_score: f64,
}

/// `CompareCandidates` output: a head-to-head comparison of 2-5 candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateComparison {
    /// Per-candidate dimension scores.
    pub scores: Vec<CandidateScores>,
    /// 4-8 dimension-level comparisons across all candidates.
    pub dimension_comparisons: Vec<ComparisonDimension>,
    /// Recommended scenarios for preferring one candidate over another.
    pub scenario_recommendations: Vec<String>,
    /// Risk assessments per candidate or overall.
    pub risk_assessments: Vec<String>,
    /// Candidate `uid`s ordered by `overall_score` descending.
    pub ranked_uids: Vec<Uid>,
}

impl CandidateComparison {
    /// Whether the candidate count and dimension-comparison count satisfy
    /// the documented bounds.
    #[must_use]
    pub fn has_valid_cardinality(&self) -> bool {
        (2..=5).contains(&self.scores.len()) && (4..=8).contains(&self.dimension_comparisons.len())
    }
}

/// Which kind of interview is being prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewType {
    /// Technical interview.
    Technical,
    /// Behavioral interview.
    Behavioral,
    /// General screening interview.
    General,
}

/// Broad category of an interview question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    /// Probes hands-on technical skill.
    TechnicalSkill,
    /// Probes system or architecture design thinking.
    SystemDesign,
    /// Probes past behavior and decision-making.
    Behavioral,
    /// Probes culture or team fit.
    CultureFit,
    /// Probes leadership or mentorship experience.
    Leadership,
}

/// Expected seniority level for a question's difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeniorityLevel {
    /// Entry-level difficulty.
    Junior,
    /// Mid-level difficulty.
    Mid,
    /// Senior-level difficulty.
    Senior,
    /// Staff/principal-level difficulty.
    Staff,
}

/// A single interview question with grading guidance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    /// The question text.
    pub question: String,
    /// Question category.
    pub category: QuestionCategory,
    /// Expected seniority level for a strong answer.
    pub difficulty: SeniorityLevel,
    /// 1-4 natural follow-up questions.
    pub follow_ups: Vec<String>,
    /// 1-3 red flags to watch for in the answer.
    pub red_flags: Vec<String>,
    /// 1-3 indicators of a good answer.
    pub good_answer_indicators: Vec<String>,
    /// Recommended time for this question, in minutes (2-15).
    pub time_estimate_minutes: u8,
}

/// `GenerateInterviewQuestions` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewQuestionSet {
    /// Candidate these questions were generated for.
    pub uid: Uid,
    /// Interview type requested.
    pub interview_type: InterviewType,
    /// 6-12 questions.
    pub questions: Vec<InterviewQuestion>,
    /// Total recommended interview duration, in minutes (30-90).
    pub total_duration_minutes: u16,
}

impl InterviewQuestionSet {
    /// Whether the question count and each question's bounded fields
    /// satisfy the documented cardinality bounds.
    #[must_use]
    pub fn has_valid_cardinality(&self) -> bool {
        let questions_in_range = (6..=12).contains(&self.questions.len());
        let duration_in_range = (30..=90).contains(&self.total_duration_minutes);
        let each_question_valid = self.questions.iter().all(|question| {
            (1..=4).contains(&question.follow_ups.len())
                && (1..=3).contains(&question.red_flags.len())
                && (1..=3).contains(&question.good_answer_indicators.len())
                && (2..=15).contains(&question.time_estimate_minutes)
        });
        questions_in_range && duration_in_range && each_question_valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_explanation() -> JobMatchExplanation {
        JobMatchExplanation {
            uid: Uid::new_random(),
            match_score: 0.8,
            recommendation: MatchRecommendation::StrongFit,
            strengths: vec!["Deep Rust experience".to_string()],
            concerns: vec![],
            summary: "a".repeat(60),
            discussion_points: vec![],
        }
    }

    #[test]
    fn match_explanation_validates_cardinality() {
        assert!(sample_explanation().has_valid_cardinality());

        let mut too_short = sample_explanation();
        too_short.summary = "too short".to_string();
        assert!(!too_short.has_valid_cardinality());
    }

    #[test]
    fn candidate_comparison_requires_two_to_five_candidates() {
        let comparison = CandidateComparison {
            scores: vec![],
            dimension_comparisons: vec![],
            scenario_recommendations: vec![],
            risk_assessments: vec![],
            ranked_uids: vec![],
        };
        assert!(!comparison.has_valid_cardinality());
    }

    #[test]
    fn interview_question_set_validates_bounds() {
        let question = InterviewQuestion {
            question: "Describe a production incident you debugged.".to_string(),
            category: QuestionCategory::TechnicalSkill,
            difficulty: SeniorityLevel::Senior,
            follow_ups: vec!["What was the root cause?".to_string()],
            red_flags: vec!["Blames others without self-reflection".to_string()],
            good_answer_indicators: vec!["Clear timeline and root-cause analysis".to_string()],
            time_estimate_minutes: 8,
        };
        let set = InterviewQuestionSet {
            uid: Uid::new_random(),
            interview_type: InterviewType::Technical,
            questions: std::iter::repeat(question).take(6).collect(),
            total_duration_minutes: 48,
        };
        assert!(set.has_valid_cardinality());
    }
}
