//! Structured resume review feedback.

use serde::{Deserialize, Serialize};

/// How severe a piece of review feedback is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    /// Critical issue; should block the resume from going out as-is.
    Must,
    /// Important recommendation.
    Should,
    /// Optional improvement.
    Advise,
}

/// Feedback for a single resume section, bucketed by severity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFeedback {
    /// Critical issues to fix.
    pub must: Option<Vec<String>>,
    /// Important recommendations.
    pub should: Option<Vec<String>>,
    /// Optional improvements.
    pub advise: Option<Vec<String>>,
}

impl SectionFeedback {
    /// Whether any feedback was recorded at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.must.as_ref().is_none_or(|items| items.is_empty())
            && self.should.as_ref().is_none_or(|items| items.is_empty())
            && self.advise.as_ref().is_none_or(|items| items.is_empty())
    }
}

/// The fixed set of per-section review instructions handed to the reviewer
/// LLM prompt. Mirrors the criteria table used to prompt-engineer review
/// generation; not itself LLM output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewCriteria {
    /// Human-readable section name.
    pub section_name: &'static str,
    /// What counts as a `must`-severity issue in this section.
    pub must_criteria: &'static str,
    /// What counts as a `should`-severity issue in this section.
    pub should_criteria: &'static str,
    /// What counts as an `advise`-severity issue in this section.
    pub advise_criteria: &'static str,
}

/// Review criteria for every reviewable resume section, keyed by the same
/// field name used on [`Resume`](crate::resume::Resume) and [`ReviewResult`].
pub const REVIEW_CRITERIA: &[(&str, ReviewCriteria)] = &[
    (
        "personal_info",
        ReviewCriteria {
            section_name: "Personal Information",
            must_criteria: "Verify email, phone (international format), full name, LinkedIn URL. Technical roles with under 3 years of experience need a GitHub link.",
            should_criteria: "Check name capitalization and contact clarity.",
            advise_criteria: "Suggest improvements for missing or ambiguous contact info.",
        },
    ),
    (
        "professional_profile",
        ReviewCriteria {
            section_name: "Professional Profile",
            must_criteria: "Ensure realistic career objectives. Report omissions or unclear statements.",
            should_criteria: "Check employment type and role consistency.",
            advise_criteria: "Suggest details to strengthen the profile.",
        },
    ),
    (
        "skills",
        ReviewCriteria {
            section_name: "Skills",
            must_criteria: "Verify relevance, categorization, and alignment with the profile. No proficiency levels.",
            should_criteria: "Check grouping and formatting.",
            advise_criteria: "Suggest categorization improvements.",
        },
    ),
    (
        "employment_history",
        ReviewCriteria {
            section_name: "Employment History",
            must_criteria: "Verify dates, company, position, responsibilities, and tech stack.",
            should_criteria: "Ensure an XYZ format: accomplished X measured by Y, by doing Z.",
            advise_criteria: "Suggest quantifiable achievements.",
        },
    ),
    (
        "projects",
        ReviewCriteria {
            section_name: "Projects",
            must_criteria: "Ensure relevance and completeness if the section exists.",
            should_criteria: "Check description clarity and consistency.",
            advise_criteria: "Suggest details for underspecified projects.",
        },
    ),
    (
        "education",
        ReviewCriteria {
            section_name: "Education",
            must_criteria: "Verify institution, qualification, field, and dates.",
            should_criteria: "Check date formats and degree naming.",
            advise_criteria: "For students and new grads, suggest highlighting coursework or a thesis.",
        },
    ),
    (
        "courses",
        ReviewCriteria {
            section_name: "Courses",
            must_criteria: "Verify name, organization, and completion year if courses exist.",
            should_criteria: "Check naming consistency and URL validity.",
            advise_criteria: "Suggest adding URLs or certificates.",
        },
    ),
    (
        "certifications",
        ReviewCriteria {
            section_name: "Certifications",
            must_criteria: "Verify dates and issuing organizations if certifications exist.",
            should_criteria: "Check relevance and currency.",
            advise_criteria: "Suggest removing outdated certifications or adding relevant ones.",
        },
    ),
    (
        "language_proficiency",
        ReviewCriteria {
            section_name: "Language Proficiency",
            must_criteria: "For international experience, verify CEFR levels.",
            should_criteria: "Check language naming consistency.",
            advise_criteria: "Suggest adding languages for international candidates.",
        },
    ),
    (
        "awards",
        ReviewCriteria {
            section_name: "Awards",
            must_criteria: "Verify names, organizations, and dates.",
            should_criteria: "Ensure descriptions are clear and relevant.",
            advise_criteria: "Suggest highlighting prestigious or relevant awards.",
        },
    ),
    (
        "scientific_contributions",
        ReviewCriteria {
            section_name: "Scientific Contributions",
            must_criteria: "Verify publication details, authors, and dates.",
            should_criteria: "Check formatting consistency.",
            advise_criteria: "Suggest organizing by impact or relevance.",
        },
    ),
];

/// Look up the review criteria for a section by its field name.
#[must_use]
pub fn criteria_for_section(section: &str) -> Option<ReviewCriteria> {
    REVIEW_CRITERIA
        .iter()
        .find(|(name, _criteria)| *name == section)
        .map(|(_name, criteria)| *criteria)
}

/// Full review output for one resume, one optional [`SectionFeedback`] per
/// reviewable section plus an overall score and summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    /// Feedback on `personal_info`.
    pub personal_info: Option<SectionFeedback>,
    /// Feedback on `professional_profile`.
    pub professional_profile: Option<SectionFeedback>,
    /// Feedback on `skills`.
    pub skills: Option<SectionFeedback>,
    /// Feedback on `employment_history`.
    pub employment_history: Option<SectionFeedback>,
    /// Feedback on `projects`.
    pub projects: Option<SectionFeedback>,
    /// Feedback on `education`.
    pub education: Option<SectionFeedback>,
    /// Feedback on `courses`.
    pub courses: Option<SectionFeedback>,
    /// Feedback on `certifications`.
    pub certifications: Option<SectionFeedback>,
    /// Feedback on `language_proficiency`.
    pub language_proficiency: Option<SectionFeedback>,
    /// Feedback on `awards`.
    pub awards: Option<SectionFeedback>,
    /// Feedback on `scientific_contributions`.
    pub scientific_contributions: Option<SectionFeedback>,
    /// Overall score, 0-100.
    pub overall_score: Option<u8>,
    /// Free-text summary of the review.
    pub summary: Option<String>,
}

impl ReviewResult {
    /// Whether the score, if present, is in the valid 0-100 range.
    #[must_use]
    pub fn has_valid_score(&self) -> bool {
        self.overall_score.is_none_or(|score| score <= 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_resume_section_has_criteria() {
        let sections = [
            "personal_info",
            "professional_profile",
            "skills",
            "employment_history",
            "projects",
            "education",
            "courses",
            "certifications",
            "language_proficiency",
            "awards",
            "scientific_contributions",
        ];
        for section in sections {
            assert!(criteria_for_section(section).is_some(), "missing criteria for {section}");
        }
    }

    #[test]
    fn unknown_section_has_no_criteria() {
        assert!(criteria_for_section("not_a_section").is_none());
    }

    #[test]
    fn section_feedback_empty_when_all_none_or_empty() {
        let feedback = SectionFeedback::default();
        assert!(feedback.is_empty());

        let with_items = SectionFeedback {
            must: Some(vec!["fix this".to_string()]),
            ..SectionFeedback::default()
        };
        assert!(!with_items.is_empty());
    }
}
