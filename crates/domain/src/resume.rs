//! The `Resume` aggregate and its exclusive children.
//!
//! Resume documents arrive from an LLM extraction step in a schema that has
//! drifted over time: some fields were renamed, some were flattened into a
//! single string where the current shape wants a small record. Rather than
//! relying on runtime introspection, legacy shapes are normalized explicitly
//! by [`normalize_legacy_resume_json`] before the payload is deserialized
//! into the current, strongly-typed [`Resume`].

use crate::primitives::{CefrLevel, Email, PrimitiveError, Uid};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a candidate wants to work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkMode {
    /// In-office.
    Onsite,
    /// Mixed remote/onsite.
    Hybrid,
    /// Fully remote.
    Remote,
}

/// Employment arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    /// Full-time employment.
    FullTime,
    /// Part-time employment.
    PartTime,
    /// Fixed-term contract.
    Contract,
}

/// Completion state of an education item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EducationStatus {
    /// Program was completed.
    Completed,
    /// Program is in progress.
    Ongoing,
    /// Program was started but not finished.
    Incomplete,
}

/// Category of a non-academic award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardType {
    /// Hackathon placement.
    Hackathon,
    /// Competitive placement outside a hackathon.
    Competition,
    /// General recognition or honor.
    Recognition,
    /// Scholarship award.
    Scholarship,
    /// Anything not covered above.
    Other,
}

/// Category of a scientific or technical publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationType {
    /// Peer-reviewed journal article.
    JournalArticle,
    /// Conference paper.
    ConferencePaper,
    /// Filed or granted patent.
    Patent,
    /// Academic thesis or dissertation.
    Thesis,
    /// Internal or client-facing technical report.
    TechnicalReport,
    /// Anything not covered above.
    Other,
}

/// A place, with every field optional since resumes rarely give all three.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// City name; left `None` when only the country is known.
    pub city: Option<String>,
    /// State or province.
    pub state: Option<String>,
    /// Country name.
    pub country: Option<String>,
}

/// Secondary contact links beyond email/phone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactLinks {
    /// Telegram handle or URL.
    pub telegram: Option<String>,
    /// LinkedIn profile URL.
    pub linkedin: Option<String>,
    /// GitHub profile URL.
    pub github: Option<String>,
    /// Any other named links (label -> URL), e.g. a personal site.
    pub other_links: Option<std::collections::BTreeMap<String, String>>,
}

/// Primary contact details. `email` is the global upsert key (invariant I1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Globally-unique email address.
    pub email: String,
    /// Phone number, free-form.
    pub phone: Option<String>,
    /// Secondary links.
    pub links: Option<ContactLinks>,
}

/// Work-authorization status in the candidate's stated location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkAuthorization {
    /// Citizenship, if stated.
    pub citizenship: Option<String>,
    /// Whether the candidate holds a work permit already.
    pub work_permit: Option<bool>,
    /// Whether visa sponsorship would be required.
    pub visa_sponsorship_required: Option<bool>,
}

/// Demographic details gated behind an explicit sub-record so they stay
/// optional as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    /// Candidate's current location.
    pub current_location: Option<Location>,
    /// Work-authorization status.
    pub work_authorization: Option<WorkAuthorization>,
}

/// Name, language, contact, and demographic information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    /// Candidate's full name.
    pub name: String,
    /// Language the resume itself is written in (BCP-47-ish free text).
    pub resume_lang: String,
    /// Contact details.
    pub contact: Contact,
    /// Demographic details.
    pub demographics: Option<Demographics>,
}

/// Employment preference block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Desired role or title.
    pub role: String,
    /// Acceptable employment types.
    pub employment_types: Vec<EmploymentType>,
    /// Acceptable work modes.
    pub work_modes: Vec<WorkMode>,
    /// Desired salary, free-form.
    pub salary: Option<String>,
}

/// Free-text summary plus structured preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalProfile {
    /// Candidate-authored or LLM-authored summary.
    pub summary: Option<String>,
    /// Structured job preferences.
    pub preferences: Option<Preferences>,
}

/// Shared lookup node: a company name, globally unique (invariant I2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    /// Canonical company name.
    pub name: String,
    /// Company URL, when the source document links to it.
    pub url: Option<String>,
}

/// Start/end bounds for an employment period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentDuration {
    /// Date format the `start`/`end` strings are encoded in, e.g. `"YYYY.MM"`.
    pub date_format: String,
    /// Start date.
    pub start: String,
    /// End date, or empty string for an ongoing role.
    pub end: String,
    /// Duration in whole months.
    pub duration_months: i64,
}

impl EmploymentDuration {
    /// Validate invariant I5: `duration_months >= 0`, and `end` empty
    /// (ongoing) or lexicographically >= `start` under the same format.
    pub fn validate(&self) -> Result<(), PrimitiveError> {
        if self.duration_months < 0 {
            return Err(PrimitiveError::NegativeDurationMonths {
                value: self.duration_months,
            });
        }
        if !self.end.is_empty() && self.end < self.start {
            return Err(PrimitiveError::EndBeforeStart {
                start: self.start.clone(),
                end: self.end.clone(),
            });
        }
        Ok(())
    }

    /// Whether this employment period is still ongoing.
    #[must_use]
    pub fn is_ongoing(&self) -> bool {
        self.end.is_empty()
    }
}

/// A single resume bullet point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPoint {
    /// Bullet text.
    pub text: String,
}

/// An in-resume-only technology leaf (not a shared lookup node; see
/// `SPEC_FULL.md` §9 open-question resolution).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technology {
    /// Technology name as written on the resume.
    pub name: String,
}

/// Shared lookup node: a skill name, globally unique (invariant I2). Has
/// set semantics within a single resume (no duplicate names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Skill name.
    pub name: String,
}

/// One employment history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentHistoryItem {
    /// Job title.
    pub position: String,
    /// Employment arrangement; defaults to full-time when unspecified.
    #[serde(default = "default_employment_type")]
    pub employment_type: EmploymentType,
    /// Work mode; defaults to onsite when unspecified.
    #[serde(default = "default_work_mode")]
    pub work_mode: WorkMode,
    /// Employer. `None` only if the LLM genuinely could not name one.
    pub company: Option<CompanyInfo>,
    /// Employment period.
    pub duration: EmploymentDuration,
    /// Work location.
    pub location: Option<Location>,
    /// Bullet points describing the role.
    #[serde(default)]
    pub key_points: Vec<KeyPoint>,
    /// Technologies used in this role.
    #[serde(default)]
    pub technologies: Vec<Technology>,
}

const fn default_employment_type() -> EmploymentType {
    EmploymentType::FullTime
}

const fn default_work_mode() -> WorkMode {
    WorkMode::Onsite
}

/// A side project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project title.
    pub title: String,
    /// Project URL (repository, demo, etc.).
    pub url: Option<String>,
    /// Technologies used.
    #[serde(default)]
    pub technologies: Vec<Technology>,
    /// Bullet points describing the project.
    #[serde(default)]
    pub key_points: Vec<KeyPoint>,
}

/// Shared lookup node: an institution name, globally unique (invariant I2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionInfo {
    /// Institution name.
    pub name: String,
}

/// A single coursework line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coursework {
    /// Coursework text.
    pub text: String,
}

/// A single education "extra" bullet (honors, activities, thesis title...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationExtra {
    /// Extra bullet text.
    pub text: String,
}

/// One education entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationItem {
    /// Degree/qualification name, when the LLM could identify one.
    pub qualification: Option<String>,
    /// Field of study.
    pub field: String,
    /// Institution attended.
    pub institution: InstitutionInfo,
    /// Location of the institution.
    pub location: Option<Location>,
    /// Start date, free-form.
    pub start: Option<String>,
    /// End date, free-form.
    pub end: Option<String>,
    /// Completion status.
    pub status: EducationStatus,
    /// Coursework line items.
    #[serde(default)]
    pub coursework: Vec<Coursework>,
    /// Extra bullets.
    #[serde(default)]
    pub extras: Vec<EducationExtra>,
}

/// A standalone course (not part of a degree program).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Course name.
    pub name: String,
    /// Issuing organization.
    pub organization: String,
    /// Year completed.
    pub year: Option<i32>,
    /// URL to the course page.
    pub course_url: Option<String>,
    /// URL to the completion certificate.
    pub certificate_url: Option<String>,
}

/// A professional certification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certification {
    /// Certification name.
    pub name: String,
    /// Issuing organization.
    pub issue_org: Option<String>,
    /// Year issued.
    pub issue_year: Option<i32>,
    /// URL to the certificate.
    pub certificate_link: Option<String>,
}

/// Shared lookup node: a language name, globally unique (invariant I2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Language name, e.g. `"English"`.
    pub name: String,
}

/// A single language-proficiency claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageProficiency {
    /// Language.
    pub language: Language,
    /// Self-assessed level, free-form (e.g. `"fluent"`).
    pub self_assessed: String,
    /// CEFR level, normalized by the content structurer.
    pub cefr: String,
}

impl LanguageProficiency {
    /// Parse the CEFR level for comparison purposes.
    pub fn cefr_level(&self) -> Result<CefrLevel, PrimitiveError> {
        CefrLevel::parse(&self.cefr)
    }
}

/// A non-academic award or recognition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    /// Award name.
    pub name: String,
    /// Award category.
    pub award_type: AwardType,
    /// Organization that granted the award.
    pub organization: String,
    /// Year granted.
    pub year: Option<i32>,
    /// Placement/position, e.g. `"1st place"`.
    pub position: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// URL with more detail.
    pub url: Option<String>,
}

/// A scientific or technical publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScientificContribution {
    /// Title of the contribution.
    pub title: String,
    /// Publication category.
    pub publication_type: PublicationType,
    /// Year published.
    pub year: Option<i32>,
    /// Venue (journal, conference, office).
    pub venue: Option<String>,
    /// Digital object identifier.
    pub doi: Option<String>,
    /// URL with more detail.
    pub url: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

/// The resume aggregate root.
///
/// `uid` is `None` until the ingestion worker assigns or reuses one (see
/// `SPEC_FULL.md` §4.J). Every other field mirrors `spec.md` §3 exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resume {
    /// Resume aggregate identifier; set by the ingestion worker, not by the
    /// content structurer.
    pub uid: Option<Uid>,
    /// Name, contact, and demographic information.
    pub personal_info: PersonalInfo,
    /// Summary and preferences.
    pub professional_profile: Option<ProfessionalProfile>,
    /// Skills (set semantics within a resume).
    #[serde(default)]
    pub skills: Vec<Skill>,
    /// Employment history, most recent typically first as authored.
    #[serde(default)]
    pub employment_history: Vec<EmploymentHistoryItem>,
    /// Side projects.
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Education history.
    #[serde(default)]
    pub education: Vec<EducationItem>,
    /// Standalone courses.
    #[serde(default)]
    pub courses: Vec<Course>,
    /// Certifications.
    #[serde(default)]
    pub certifications: Vec<Certification>,
    /// Language proficiencies.
    #[serde(default)]
    pub language_proficiency: Vec<LanguageProficiency>,
    /// Awards.
    #[serde(default)]
    pub awards: Vec<Award>,
    /// Scientific contributions.
    #[serde(default)]
    pub scientific_contributions: Vec<ScientificContribution>,
}

impl Resume {
    /// Total years of experience, rounded to one decimal place, summed
    /// across every employment history item.
    #[must_use]
    pub fn years_of_experience(&self) -> f64 {
        let total_months: i64 = self
            .employment_history
            .iter()
            .map(|item| item.duration.duration_months)
            .sum();
        (f64::from(u32::try_from(total_months.max(0)).unwrap_or(u32::MAX)) / 12.0 * 10.0).round()
            / 10.0
    }

    /// Case-insensitive skill membership check.
    #[must_use]
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills
            .iter()
            .any(|owned| owned.name.eq_ignore_ascii_case(skill))
    }

    /// Every distinct technology named across employment history and
    /// projects.
    #[must_use]
    pub fn technologies(&self) -> std::collections::BTreeSet<String> {
        let mut techs = std::collections::BTreeSet::new();
        for item in &self.employment_history {
            techs.extend(item.technologies.iter().map(|tech| tech.name.clone()));
        }
        for project in &self.projects {
            techs.extend(project.technologies.iter().map(|tech| tech.name.clone()));
        }
        techs
    }

    /// Parsed, validated contact email.
    pub fn email(&self) -> Result<Email, PrimitiveError> {
        Email::parse(&self.personal_info.contact.email)
    }
}

/// Normalize a raw (LLM-produced or legacy-stored) JSON resume payload into
/// the shape `Resume` expects, in place.
///
/// Mirrors the `model_validator(mode="before")` hooks of the original
/// Python domain model: legacy flat fields are hoisted into their current
/// nested shape, and bare strings are promoted into single-field records.
/// This is explicit normalization, not runtime reflection, per the "dynamic
/// resume schema" design note.
pub fn normalize_legacy_resume_json(value: &mut Value) {
    let Some(root) = value.as_object_mut() else {
        return;
    };

    normalize_top_level_profile(root);
    normalize_personal_info(root);
    normalize_string_list(root, "skills", "name");

    if let Some(items) = root.get_mut("employment_history").and_then(Value::as_array_mut) {
        for item in items {
            normalize_employment_item(item);
        }
    }
    if let Some(items) = root.get_mut("projects").and_then(Value::as_array_mut) {
        for item in items {
            normalize_project_item(item);
        }
    }
    if let Some(items) = root.get_mut("education").and_then(Value::as_array_mut) {
        for item in items {
            normalize_education_item(item);
        }
    }
    if let Some(items) = root
        .get_mut("language_proficiency")
        .and_then(Value::as_array_mut)
    {
        for item in items {
            normalize_language_item(item);
        }
    }
}

fn normalize_top_level_profile(root: &mut Map<String, Value>) {
    let has_profile = root.contains_key("professional_profile");
    let has_summary = root.contains_key("summary");
    let has_preferences = root.contains_key("preferences");
    if !has_profile && (has_summary || has_preferences) {
        let summary = root.remove("summary").unwrap_or(Value::Null);
        let preferences = root.remove("preferences").unwrap_or(Value::Null);
        let mut profile = Map::new();
        profile.insert("summary".to_string(), summary);
        profile.insert("preferences".to_string(), preferences);
        root.insert("professional_profile".to_string(), Value::Object(profile));
    }
}

fn normalize_personal_info(root: &mut Map<String, Value>) {
    let Some(personal) = root.get_mut("personal_info").and_then(Value::as_object_mut) else {
        return;
    };

    let has_location = personal.contains_key("current_location");
    let has_auth = personal.contains_key("work_authorization");
    if has_location || has_auth {
        let mut demographics = personal
            .remove("demographics")
            .and_then(|value| value.as_object().cloned())
            .unwrap_or_default();
        if has_location && !demographics.contains_key("current_location") {
            if let Some(location) = personal.remove("current_location") {
                demographics.insert("current_location".to_string(), location);
            }
        }
        if has_auth && !demographics.contains_key("work_authorization") {
            if let Some(auth) = personal.remove("work_authorization") {
                demographics.insert("work_authorization".to_string(), auth);
            }
        }
        personal.insert("demographics".to_string(), Value::Object(demographics));
    }
}

fn normalize_employment_item(item: &mut Value) {
    let Some(map) = item.as_object_mut() else {
        return;
    };

    if let Some(Value::String(name)) = map.get("company").cloned() {
        let mut company = Map::new();
        company.insert("name".to_string(), Value::String(name));
        map.insert("company".to_string(), Value::Object(company));
    }

    if map.contains_key("tech_stack") && !map.contains_key("technologies") {
        if let Some(tech_stack) = map.remove("tech_stack") {
            map.insert("technologies".to_string(), tech_stack);
        }
    }

    let has_legacy_duration = map.contains_key("start_date")
        || map.contains_key("end_date")
        || map.contains_key("date_format")
        || map.contains_key("duration_months");
    if has_legacy_duration {
        let date_format = map
            .remove("date_format")
            .unwrap_or_else(|| Value::String("YYYY.MM".to_string()));
        let start = map
            .remove("start_date")
            .unwrap_or_else(|| Value::String(String::new()));
        let end = map
            .remove("end_date")
            .unwrap_or_else(|| Value::String(String::new()));
        let duration_months = map.remove("duration_months").unwrap_or_else(|| Value::from(0));
        let mut duration = Map::new();
        duration.insert("date_format".to_string(), date_format);
        duration.insert("start".to_string(), start);
        duration.insert("end".to_string(), end);
        duration.insert("duration_months".to_string(), duration_months);
        map.insert("duration".to_string(), Value::Object(duration));
    }

    normalize_string_list_in(map, "key_points", "text");
    normalize_string_list_in(map, "technologies", "name");
}

fn normalize_project_item(item: &mut Value) {
    let Some(map) = item.as_object_mut() else {
        return;
    };
    if map.contains_key("tech_stack") && !map.contains_key("technologies") {
        if let Some(tech_stack) = map.remove("tech_stack") {
            map.insert("technologies".to_string(), tech_stack);
        }
    }
    normalize_string_list_in(map, "technologies", "name");
    normalize_string_list_in(map, "key_points", "text");
}

fn normalize_education_item(item: &mut Value) {
    let Some(map) = item.as_object_mut() else {
        return;
    };
    if let Some(Value::String(name)) = map.get("institution").cloned() {
        let mut institution = Map::new();
        institution.insert("name".to_string(), Value::String(name));
        map.insert("institution".to_string(), Value::Object(institution));
    }
    if map.contains_key("start_date") && !map.contains_key("start") {
        if let Some(start) = map.remove("start_date") {
            map.insert("start".to_string(), start);
        }
    }
    if map.contains_key("end_date") && !map.contains_key("end") {
        if let Some(end) = map.remove("end_date") {
            map.insert("end".to_string(), end);
        }
    }
    normalize_string_list_in(map, "coursework", "text");
    normalize_string_list_in(map, "extras", "text");
}

fn normalize_language_item(item: &mut Value) {
    let Some(map) = item.as_object_mut() else {
        return;
    };
    if let Some(Value::String(name)) = map.get("language").cloned() {
        let mut language = Map::new();
        language.insert("name".to_string(), Value::String(name));
        map.insert("language".to_string(), Value::Object(language));
    }
}

fn normalize_string_list(root: &mut Map<String, Value>, field: &str, key: &str) {
    normalize_string_list_in(root, field, key);
}

fn normalize_string_list_in(map: &mut Map<String, Value>, field: &str, key: &str) {
    let Some(Value::Array(items)) = map.get_mut(field) else {
        return;
    };
    for entry in items.iter_mut() {
        if let Value::String(text) = entry.clone() {
            let mut record = Map::new();
            record.insert(key.to_string(), Value::String(text));
            *entry = Value::Object(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_legacy_company_string() {
        let mut value = serde_json::json!({
            "personal_info": {
                "name": "Max",
                "resume_lang": "en",
                "contact": {"email": "max@example.com"}
            },
            "employment_history": [{
                "position": "Engineer",
                "company": "Acme Corp",
                "start_date": "2020.01",
                "end_date": "2023.07",
                "duration_months": 42,
                "key_points": ["Shipped things"],
                "tech_stack": ["Python", "Django"]
            }]
        });

        normalize_legacy_resume_json(&mut value);
        let resume: Resume = serde_json::from_value(value).expect("normalized resume parses");
        let employment = resume.employment_history.first().expect("one entry");
        assert_eq!(employment.company.as_ref().map(|c| c.name.as_str()), Some("Acme Corp"));
        assert_eq!(employment.duration.duration_months, 42);
        assert_eq!(employment.key_points.first().unwrap().text, "Shipped things");
        assert_eq!(employment.technologies.len(), 2);
    }

    #[test]
    fn normalizes_legacy_top_level_profile() {
        let mut value = serde_json::json!({
            "personal_info": {
                "name": "Max",
                "resume_lang": "en",
                "contact": {"email": "max@example.com"}
            },
            "summary": "Experienced engineer",
            "skills": ["Python", "Go"]
        });

        normalize_legacy_resume_json(&mut value);
        let resume: Resume = serde_json::from_value(value).expect("normalized resume parses");
        assert_eq!(
            resume.professional_profile.and_then(|p| p.summary),
            Some("Experienced engineer".to_string())
        );
        assert_eq!(resume.skills.len(), 2);
        assert!(resume.has_skill("python"));
    }

    #[test]
    fn years_of_experience_sums_and_rounds() {
        let mut value = serde_json::json!({
            "personal_info": {
                "name": "Max",
                "resume_lang": "en",
                "contact": {"email": "max@example.com"}
            },
            "employment_history": [
                {"position": "A", "company": {"name": "X"}, "duration": {"date_format": "YYYY.MM", "start": "2018.01", "end": "2020.01", "duration_months": 24}},
                {"position": "B", "company": {"name": "Y"}, "duration": {"date_format": "YYYY.MM", "start": "2020.01", "end": "", "duration_months": 7}}
            ]
        });
        let resume: Resume = serde_json::from_value(value.take()).expect("resume parses");
        assert!((resume.years_of_experience() - 2.6).abs() < 0.05);
    }
}
