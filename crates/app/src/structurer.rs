//! Turns a parsed document into a structured [`Resume`] via the LLM port.
//!
//! Mirrors the original content-structuring service's two-pass design: a
//! first attempt at the default temperature, then one retry at a lower
//! temperature with a stricter prompt if the first response doesn't
//! deserialize into `Resume`.

use resumariner_domain::{normalize_legacy_resume_json, ParsedDocument, Resume};
use resumariner_ports::{LlmOptions, LlmPort, LlmRequest};
use resumariner_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde_json::{json, Value};

const MAX_RESUME_CHARS: usize = 30_000;

const SYSTEM_PROMPT: &str =
    "You are a CV parser. Extract information from resumes and return structured data exactly matching the schema.";

const RETRY_SYSTEM_PROMPT: &str = "You are a specialized CV parser. Extract exact information from resumes and return a fully compliant JSON object matching the schema.";

/// Structure a parsed document into a `Resume`, retrying once at a lower
/// temperature with a stricter prompt if the first attempt doesn't
/// deserialize cleanly.
pub async fn structure_resume(
    ctx: &RequestContext,
    llm: &dyn LlmPort,
    parsed: &ParsedDocument,
) -> Result<Resume> {
    let full_text = parsed.full_text();
    let truncated = truncate_chars(&full_text, MAX_RESUME_CHARS);
    let links: Vec<String> = parsed
        .all_links()
        .into_iter()
        .map(|link| match &link.text {
            Some(text) => format!("{text}: {}", link.url),
            None => link.url.clone(),
        })
        .collect();
    let schema = resume_json_schema();

    let prompt = build_prompt(&truncated, &links, &schema);
    let first_request = LlmRequest {
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt: prompt.clone(),
        schema: schema.clone(),
        options: LlmOptions::default(),
    };

    if let Ok(resume) = run_structured(ctx, llm, first_request).await {
        return Ok(resume);
    }

    let retry_prompt = format!(
        "IMPORTANT: Return a valid JSON object matching the schema exactly.\n\n\
         Focus on these common issues:\n\
         1. All required fields must be present\n\
         2. Format dates as MM.YYYY\n\
         3. Use null for missing values, not empty strings\n\
         4. Use exactly the enum values specified\n\n{prompt}"
    );
    let retry_request = LlmRequest {
        system_prompt: RETRY_SYSTEM_PROMPT.to_string(),
        user_prompt: retry_prompt,
        schema,
        options: LlmOptions { temperature: 0.1 },
    };
    run_structured(ctx, llm, retry_request).await
}

async fn run_structured(ctx: &RequestContext, llm: &dyn LlmPort, request: LlmRequest) -> Result<Resume> {
    let mut value = llm.run(ctx, request).await?;
    normalize_legacy_resume_json(&mut value);
    serde_json::from_value(value).map_err(|parse_error| {
        ErrorEnvelope::expected_with_class(
            ErrorCode::new("resume_structuring", "schema_mismatch"),
            format!("structured resume did not match schema: {parse_error}"),
            ErrorClass::NonRetriable,
        )
    })
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn build_prompt(text: &str, links: &[String], schema: &Value) -> String {
    format!(
        "CRITICAL PROCESSING RULES:\n\
         - Return JSON with filled-in data, never the bare schema.\n\
         - Preserve the resume's original language in content values.\n\
         - Use default capitalization; no excessive caps lock.\n\
         - Strip leading bullet delimiters ('-', '.', etc.) from key points.\n\n\
         URL HANDLING RULES:\n\
         (a) keep every URL attributed to at most one entity;\n\
         (b) a company-profile URL (e.g. a LinkedIn company path) goes on that employer's company_url;\n\
         (c) a project or repository URL goes on the matching project's url;\n\
         (d) convert language proficiency descriptions to CEFR (A1, A2, B1, B2, C1, C2, or Native);\n\
         (e) default an unspecified employment start month to 01;\n\
         (f) leave location.city null when only the country is known;\n\
         an ambiguous URL that matches nothing specific goes under other_links, never duplicated elsewhere.\n\n\
         SECTION-SPECIFIC RULES:\n\
         - Education status must be one of completed, ongoing, incomplete.\n\
         - Qualification is the degree title (e.g. Bachelor, Master), not the field of study.\n\
         - Only include projects explicitly described as personal/pet projects, not duplicated from employment.\n\n\
         Return JSON matching this schema (keys in English, values in the resume's original language unless noted):\n\
         {schema}\n\n\
         Provided URLs:\n\
         {links}\n\n\
         Resume Text (process verbatim):\n\
         {text}",
        links = links.join("\n"),
        text = text,
    )
}

/// A pragmatic, non-exhaustive JSON Schema for [`Resume`] — enough to steer
/// the LLM's shape without encoding every nested cardinality constraint.
fn resume_json_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "personal_info": {
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "resume_lang": {"type": "string"},
                    "contact": {
                        "type": "object",
                        "properties": {
                            "email": {"type": "string"},
                            "phone": {"type": ["string", "null"]},
                            "links": {"type": ["object", "null"]}
                        },
                        "required": ["email"]
                    },
                    "demographics": {"type": ["object", "null"]}
                },
                "required": ["name", "resume_lang", "contact"]
            },
            "professional_profile": {
                "type": ["object", "null"],
                "properties": {
                    "summary": {"type": ["string", "null"]},
                    "preferences": {"type": ["object", "null"]}
                }
            },
            "skills": {"type": "array", "items": {"type": "object", "properties": {"name": {"type": "string"}}}},
            "employment_history": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "position": {"type": "string"},
                        "employment_type": {"type": "string", "enum": ["full-time", "part-time", "contract"]},
                        "work_mode": {"type": "string", "enum": ["onsite", "hybrid", "remote"]},
                        "company": {"type": ["object", "null"]},
                        "duration": {
                            "type": "object",
                            "properties": {
                                "date_format": {"type": "string"},
                                "start": {"type": "string"},
                                "end": {"type": "string"},
                                "duration_months": {"type": "integer"}
                            }
                        },
                        "location": {"type": ["object", "null"]},
                        "key_points": {"type": "array", "items": {"type": "object", "properties": {"text": {"type": "string"}}}},
                        "technologies": {"type": "array", "items": {"type": "object", "properties": {"name": {"type": "string"}}}}
                    },
                    "required": ["position", "duration"]
                }
            },
            "projects": {
                "type": ["array", "null"],
                "items": {
                    "type": "object",
                    "properties": {
                        "title": {"type": "string"},
                        "url": {"type": ["string", "null"]},
                        "technologies": {"type": "array"},
                        "key_points": {"type": "array"}
                    }
                }
            },
            "education": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "qualification": {"type": ["string", "null"]},
                        "field": {"type": "string"},
                        "institution": {"type": "object", "properties": {"name": {"type": "string"}}},
                        "location": {"type": ["object", "null"]},
                        "start": {"type": ["string", "null"]},
                        "end": {"type": ["string", "null"]},
                        "status": {"type": "string", "enum": ["completed", "ongoing", "incomplete"]},
                        "coursework": {"type": "array"},
                        "extras": {"type": "array"}
                    }
                }
            },
            "courses": {"type": "array"},
            "certifications": {"type": ["array", "null"]},
            "language_proficiency": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "language": {"type": "object", "properties": {"name": {"type": "string"}}},
                        "self_assessed": {"type": "string"},
                        "cefr": {"type": "string", "enum": ["A1", "A2", "B1", "B2", "C1", "C2", "Native"]}
                    }
                }
            },
            "awards": {"type": "array"},
            "scientific_contributions": {"type": "array"}
        },
        "required": ["personal_info"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundaries() {
        let text: String = "a".repeat(40_000);
        let truncated = truncate_chars(&text, MAX_RESUME_CHARS);
        assert_eq!(truncated.chars().count(), MAX_RESUME_CHARS);
    }

    #[test]
    fn schema_requires_personal_info() {
        let schema = resume_json_schema();
        assert_eq!(schema["required"][0], "personal_info");
    }
}
