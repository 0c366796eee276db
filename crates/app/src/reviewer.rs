//! Per-section resume review, grounded in the fixed
//! [`REVIEW_CRITERIA`](resumariner_domain::REVIEW_CRITERIA) prompt table.
//!
//! One LLM call per section present in the resume, plus one closing call
//! for the overall score and summary. Callers treat a failure here as
//! non-fatal (see [`crate::ingest`]) and record it in job metadata instead
//! of failing the job.

use resumariner_domain::{criteria_for_section, Resume, ReviewResult, SectionFeedback, REVIEW_CRITERIA};
use resumariner_ports::{run_typed, LlmOptions, LlmPort, LlmRequest};
use resumariner_shared::{RequestContext, Result};
use serde::Deserialize;
use serde_json::{json, Value};

/// Generate a full section-by-section review plus an overall score.
pub async fn review_resume(ctx: &RequestContext, llm: &dyn LlmPort, resume: &Resume) -> Result<ReviewResult> {
    let resume_json = serde_json::to_value(resume).unwrap_or(Value::Null);
    let mut result = ReviewResult::default();

    for (section, _criteria) in REVIEW_CRITERIA.iter().copied() {
        if !section_present(resume, section) {
            continue;
        }
        let Some(criteria) = criteria_for_section(section) else {
            continue;
        };
        let section_value = resume_json.get(section).cloned().unwrap_or(Value::Null);
        let feedback = review_section(ctx, llm, &criteria, &section_value).await?;
        if !feedback.is_empty() {
            assign_feedback(&mut result, section, feedback);
        }
    }

    let overall = review_overall(ctx, llm, &result).await?;
    result.overall_score = Some(overall.overall_score);
    result.summary = Some(overall.summary);
    Ok(result)
}

fn section_present(resume: &Resume, section: &str) -> bool {
    match section {
        "personal_info" => true,
        "professional_profile" => resume.professional_profile.is_some(),
        "skills" => !resume.skills.is_empty(),
        "employment_history" => !resume.employment_history.is_empty(),
        "projects" => !resume.projects.is_empty(),
        "education" => !resume.education.is_empty(),
        "courses" => !resume.courses.is_empty(),
        "certifications" => !resume.certifications.is_empty(),
        "language_proficiency" => !resume.language_proficiency.is_empty(),
        "awards" => !resume.awards.is_empty(),
        "scientific_contributions" => !resume.scientific_contributions.is_empty(),
        _ => false,
    }
}

fn assign_feedback(result: &mut ReviewResult, section: &str, feedback: SectionFeedback) {
    let slot = match section {
        "personal_info" => &mut result.personal_info,
        "professional_profile" => &mut result.professional_profile,
        "skills" => &mut result.skills,
        "employment_history" => &mut result.employment_history,
        "projects" => &mut result.projects,
        "education" => &mut result.education,
        "courses" => &mut result.courses,
        "certifications" => &mut result.certifications,
        "language_proficiency" => &mut result.language_proficiency,
        "awards" => &mut result.awards,
        "scientific_contributions" => &mut result.scientific_contributions,
        _ => return,
    };
    *slot = Some(feedback);
}

async fn review_section(
    ctx: &RequestContext,
    llm: &dyn LlmPort,
    criteria: &resumariner_domain::ReviewCriteria,
    section_value: &Value,
) -> Result<SectionFeedback> {
    let system_prompt = "You are a meticulous resume reviewer. Evaluate only the section given and bucket every issue by severity.".to_string();
    let user_prompt = format!(
        "Section: {name}\n\n\
         MUST-fix criteria: {must}\n\
         SHOULD-fix criteria: {should}\n\
         ADVISE (optional) criteria: {advise}\n\n\
         Return null (not an empty array) for any bucket with no issues.\n\n\
         Section data:\n{data}",
        name = criteria.section_name,
        must = criteria.must_criteria,
        should = criteria.should_criteria,
        advise = criteria.advise_criteria,
        data = section_value,
    );
    let request = LlmRequest {
        system_prompt,
        user_prompt,
        schema: section_feedback_schema(),
        options: LlmOptions::default(),
    };
    run_typed(llm, ctx, request).await
}

#[derive(Debug, Deserialize)]
struct OverallReview {
    overall_score: u8,
    summary: String,
}

async fn review_overall(ctx: &RequestContext, llm: &dyn LlmPort, result: &ReviewResult) -> Result<OverallReview> {
    let feedback_json = serde_json::to_value(result).unwrap_or(Value::Null);
    let system_prompt = "You are a meticulous resume reviewer producing a final verdict.".to_string();
    let user_prompt = format!(
        "Given the following per-section feedback, assign an integer overall_score from 0 (unusable) to 100 \
         (excellent) and write a short summary (2-3 sentences).\n\n{feedback_json}"
    );
    let request = LlmRequest {
        system_prompt,
        user_prompt,
        schema: overall_review_schema(),
        options: LlmOptions::default(),
    };
    run_typed(llm, ctx, request).await
}

fn section_feedback_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "must": {"type": ["array", "null"], "items": {"type": "string"}},
            "should": {"type": ["array", "null"], "items": {"type": "string"}},
            "advise": {"type": ["array", "null"], "items": {"type": "string"}}
        }
    })
}

fn overall_review_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "overall_score": {"type": "integer", "minimum": 0, "maximum": 100},
            "summary": {"type": "string"}
        },
        "required": ["overall_score", "summary"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_sections_cover_every_criteria_entry() {
        for (section, _criteria) in REVIEW_CRITERIA.iter().copied() {
            assert!(criteria_for_section(section).is_some());
        }
    }

    #[test]
    fn overall_schema_bounds_score() {
        let schema = overall_review_schema();
        assert_eq!(schema["properties"]["overall_score"]["maximum"], 100);
    }
}
