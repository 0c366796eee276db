//! Neo4j graph store adapter, speaking the HTTP Cypher transaction API
//! (`POST /db/{name}/tx/commit`): one `reqwest::Client`, one request
//! builder per Cypher statement batch, one response decoder.

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use resumariner_config::GraphStoreConfig;
use resumariner_domain::{Resume, SearchFilters, Uid};
use resumariner_ports::{BoxFuture, GraphStorePort};
use resumariner_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Connection settings for the Neo4j HTTP Cypher transaction endpoint.
#[derive(Debug, Clone)]
pub struct Neo4jGraphConfig {
    /// Base URL, e.g. `http://localhost:7474`.
    pub base_url: Box<str>,
    /// Database/graph name.
    pub database: Box<str>,
    /// HTTP basic-auth username, when required.
    pub username: Option<Box<str>>,
    /// HTTP basic-auth password, when required.
    pub password: Option<Box<str>>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Neo4jGraphConfig {
    /// Build from the shared graph store config, optionally adding
    /// credentials sourced from the environment.
    #[must_use]
    pub fn from_graph_store_config(
        config: &GraphStoreConfig,
        username: Option<Box<str>>,
        password: Option<Box<str>>,
    ) -> Self {
        Self {
            base_url: config.base_url.clone(),
            database: config.database.clone(),
            username,
            password,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// HTTP/Cypher-transaction-backed implementation of [`GraphStorePort`].
pub struct Neo4jGraphStore {
    client: reqwest::Client,
    tx_endpoint: Box<str>,
}

impl Neo4jGraphStore {
    /// Create a new Neo4j graph store adapter.
    pub fn new(config: &Neo4jGraphConfig) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "base url must be non-empty",
            ));
        }
        let database = config.database.trim();
        if database.is_empty() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "database name must be non-empty",
            ));
        }
        if config.timeout_ms == 0 {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "timeout must be greater than zero",
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            let credentials = base64_basic_auth(username, password);
            let mut auth_header = HeaderValue::from_str(&format!("Basic {credentials}")).map_err(|_| {
                ErrorEnvelope::expected(
                    ErrorCode::invalid_input(),
                    "credentials contain invalid header characters",
                )
            })?;
            auth_header.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_header);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("graph_store", "neo4j_client_init_failed"),
                    format!("failed to build graph store client: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

        Ok(Self {
            client,
            tx_endpoint: format!("{base_url}/db/{database}/tx/commit").into_boxed_str(),
        })
    }

    async fn run(&self, statements: Vec<CypherStatement>) -> Result<Vec<Vec<Value>>> {
        let body = CypherTxRequest { statements };
        let response = self
            .client
            .post(self.tx_endpoint.as_ref())
            .json(&body)
            .send()
            .await
            .map_err(|error| map_reqwest_error(&error))?;

        let status = response.status();
        let payload = response.bytes().await.map_err(|error| map_reqwest_error(&error))?;
        if !status.is_success() {
            return Err(map_neo4j_http_error(status, &payload));
        }

        let parsed: CypherTxResponse = serde_json::from_slice(&payload).map_err(|error| {
            ErrorEnvelope::unexpected(
                ErrorCode::new("graph_store", "neo4j_invalid_response"),
                format!("failed to decode graph store response: {error}"),
                ErrorClass::NonRetriable,
            )
        })?;

        if let Some(error) = parsed.errors.into_iter().next() {
            return Err(ErrorEnvelope::unexpected(
                ErrorCode::new("graph_store", "neo4j_cypher_error"),
                format!("{}: {}", error.code, error.message),
                ErrorClass::NonRetriable,
            ));
        }

        Ok(parsed
            .results
            .into_iter()
            .map(|result| result.data.into_iter().map(|row| row.row).collect())
            .collect())
    }
}

impl GraphStorePort for Neo4jGraphStore {
    fn upsert_resume(&self, ctx: &RequestContext, resume: Resume) -> BoxFuture<'_, Result<Uid>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("neo4j_graph_store.upsert_resume")?;

            let email = resume.personal_info.contact.email.clone();
            let uid = match resume.uid {
                Some(uid) => uid,
                None => match self.get_resume_by_email_inner(&email).await? {
                    Some(existing) => existing.uid.unwrap_or_else(Uid::new_random),
                    None => Uid::new_random(),
                },
            };

            self.delete_cascade_inner(uid).await?;

            let mut resume = resume;
            resume.uid = Some(uid);
            let document = serde_json::to_value(&resume).map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::internal(),
                    format!("failed to encode resume: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

            let current_location = resume
                .personal_info
                .demographics
                .as_ref()
                .and_then(|demographics| demographics.current_location.as_ref());

            let mut statements = vec![CypherStatement {
                statement: UPSERT_RESUME_NODE.to_owned(),
                parameters: json!({
                    "uid": uid.to_string(),
                    "data": document,
                    "name": resume.personal_info.name,
                    "email": email,
                    "role": resume.professional_profile.as_ref()
                        .and_then(|profile| profile.preferences.as_ref())
                        .map(|preferences| preferences.role.clone())
                        .unwrap_or_default(),
                    "yearsExperience": resume.years_of_experience(),
                    "country": current_location.and_then(|location| location.country.clone()),
                    "city": current_location.and_then(|location| location.city.clone()),
                }),
            }];

            for skill in &resume.skills {
                statements.push(CypherStatement {
                    statement: LINK_SKILL.to_owned(),
                    parameters: json!({ "uid": uid.to_string(), "name": skill.name }),
                });
            }
            for item in &resume.employment_history {
                if let Some(company) = &item.company {
                    statements.push(CypherStatement {
                        statement: LINK_COMPANY.to_owned(),
                        parameters: json!({ "uid": uid.to_string(), "name": company.name }),
                    });
                }
            }
            for item in &resume.education {
                statements.push(CypherStatement {
                    statement: LINK_INSTITUTION.to_owned(),
                    parameters: json!({
                        "uid": uid.to_string(),
                        "name": item.institution.name,
                        "level": item.qualification.clone().unwrap_or_default(),
                        "status": item.status,
                    }),
                });
            }
            for proficiency in &resume.language_proficiency {
                statements.push(CypherStatement {
                    statement: LINK_LANGUAGE.to_owned(),
                    parameters: json!({ "uid": uid.to_string(), "name": proficiency.language.name, "cefr": proficiency.cefr }),
                });
            }

            self.run(statements).await?;
            Ok(uid)
        })
    }

    fn get_resume(&self, ctx: &RequestContext, uid: Uid) -> BoxFuture<'_, Result<Option<Resume>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("neo4j_graph_store.get_resume")?;
            self.get_resume_inner(uid).await
        })
    }

    fn get_resumes_by_ids(&self, ctx: &RequestContext, uids: Vec<Uid>) -> BoxFuture<'_, Result<Vec<Resume>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("neo4j_graph_store.get_resumes_by_ids")?;
            if uids.is_empty() {
                return Ok(Vec::new());
            }
            let ids: Vec<String> = uids.iter().map(ToString::to_string).collect();
            let rows = self
                .run(vec![CypherStatement {
                    statement: FETCH_RESUMES_BY_UIDS.to_owned(),
                    parameters: json!({ "uids": ids }),
                }])
                .await?;
            decode_resume_rows(rows)
        })
    }

    fn get_resume_by_email(&self, ctx: &RequestContext, email: &str) -> BoxFuture<'_, Result<Option<Resume>>> {
        let ctx = ctx.clone();
        let email = email.to_owned();
        Box::pin(async move {
            ctx.ensure_not_cancelled("neo4j_graph_store.get_resume_by_email")?;
            self.get_resume_by_email_inner(&email).await
        })
    }

    fn delete_resume(&self, ctx: &RequestContext, uid: Uid) -> BoxFuture<'_, Result<bool>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("neo4j_graph_store.delete_resume")?;
            let rows = self
                .run(vec![CypherStatement {
                    statement: DELETE_RESUME_NODE_ONLY.to_owned(),
                    parameters: json!({ "uid": uid.to_string() }),
                }])
                .await?;
            Ok(rows.first().and_then(|rows| rows.first()).is_some())
        })
    }

    fn delete_resume_cascade(&self, ctx: &RequestContext, uid: Uid) -> BoxFuture<'_, Result<bool>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("neo4j_graph_store.delete_resume_cascade")?;
            self.delete_cascade_inner(uid).await
        })
    }

    fn search_structured(
        &self,
        ctx: &RequestContext,
        filters: SearchFilters,
        limit: u32,
    ) -> BoxFuture<'_, Result<Vec<Uid>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("neo4j_graph_store.search_structured")?;
            if limit == 0 {
                return Err(ErrorEnvelope::expected(
                    ErrorCode::invalid_input(),
                    "limit must be greater than zero",
                ));
            }

            let (statement, parameters) = build_search_statement(&filters, limit);
            let rows = self
                .run(vec![CypherStatement { statement, parameters }])
                .await?;

            let uids = rows
                .into_iter()
                .flatten()
                .filter_map(|row| row.into_iter().next())
                .filter_map(|value| value.as_str().map(ToOwned::to_owned))
                .filter_map(|raw| Uid::parse(raw).ok())
                .collect();
            Ok(uids)
        })
    }
}

impl Neo4jGraphStore {
    async fn get_resume_inner(&self, uid: Uid) -> Result<Option<Resume>> {
        let rows = self
            .run(vec![CypherStatement {
                statement: FETCH_RESUME_BY_UID.to_owned(),
                parameters: json!({ "uid": uid.to_string() }),
            }])
            .await?;
        Ok(decode_resume_rows(rows)?.into_iter().next())
    }

    async fn get_resume_by_email_inner(&self, email: &str) -> Result<Option<Resume>> {
        let rows = self
            .run(vec![CypherStatement {
                statement: FETCH_RESUME_BY_EMAIL.to_owned(),
                parameters: json!({ "email": email.to_ascii_lowercase() }),
            }])
            .await?;
        Ok(decode_resume_rows(rows)?.into_iter().next())
    }

    async fn delete_cascade_inner(&self, uid: Uid) -> Result<bool> {
        let rows = self
            .run(vec![CypherStatement {
                statement: DELETE_RESUME_CASCADE.to_owned(),
                parameters: json!({ "uid": uid.to_string() }),
            }])
            .await?;
        Ok(rows
            .first()
            .and_then(|rows| rows.first())
            .and_then(|row| row.first())
            .and_then(Value::as_i64)
            .is_some_and(|count| count > 0))
    }
}

fn decode_resume_rows(rows: Vec<Vec<Value>>) -> Result<Vec<Resume>> {
    rows.into_iter()
        .flatten()
        .filter_map(|row| row.into_iter().next())
        .map(|document| {
            serde_json::from_value(document).map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("graph_store", "neo4j_decode_failed"),
                    format!("failed to decode resume document: {error}"),
                    ErrorClass::NonRetriable,
                )
            })
        })
        .collect()
}

fn build_search_statement(filters: &SearchFilters, limit: u32) -> (String, Value) {
    let mut clauses = Vec::new();
    let mut parameters = serde_json::Map::new();

    if !filters.skills.is_empty() {
        clauses.push(
            "all(skillName IN $skills WHERE EXISTS { MATCH (resume)-[:HAS_SKILL]->(:SkillNode {name: skillName}) })"
                .to_owned(),
        );
        parameters.insert("skills".to_owned(), json!(filters.skills));
    }
    if let Some(role) = &filters.role {
        clauses.push("toLower(resume.role) CONTAINS toLower($role)".to_owned());
        parameters.insert("role".to_owned(), json!(role));
    }
    if let Some(company) = &filters.company {
        clauses.push(
            "EXISTS { MATCH (resume)-[:HAS_EMPLOYMENT_HISTORY]->(:EmploymentHistoryItemNode)-[:AT_COMPANY]->(company:CompanyNode) WHERE toLower(company.name) CONTAINS toLower($company) }"
                .to_owned(),
        );
        parameters.insert("company".to_owned(), json!(company));
    }
    if let Some(years) = filters.years_experience {
        clauses.push("resume.yearsExperience >= $yearsExperience".to_owned());
        parameters.insert("yearsExperience".to_owned(), json!(years));
    }
    if !filters.locations.is_empty() {
        let mut location_clauses = Vec::new();
        for (index, requirement) in filters.locations.iter().enumerate() {
            let country_param = format!("locationCountry{index}");
            let cities_param = format!("locationCities{index}");
            location_clauses.push(format!(
                "(toLower(resume.country) = toLower(${country_param}) AND (size(${cities_param}) = 0 OR toLower(resume.city) IN [city IN ${cities_param} | toLower(city)]))"
            ));
            parameters.insert(country_param, json!(requirement.country));
            parameters.insert(cities_param, json!(requirement.cities));
        }
        clauses.push(format!("({})", location_clauses.join(" OR ")));
    }
    if !filters.education.is_empty() {
        let mut education_clauses = Vec::new();
        for (index, requirement) in filters.education.iter().enumerate() {
            let level_param = format!("educationLevel{index}");
            let statuses_param = format!("educationStatuses{index}");
            education_clauses.push(format!(
                "EXISTS {{ MATCH (resume)-[:HAS_EDUCATION]->(edu:EducationItemNode) WHERE toLower(edu.level) CONTAINS toLower(${level_param}) AND (size(${statuses_param}) = 0 OR edu.status IN ${statuses_param}) }}"
            ));
            parameters.insert(level_param, json!(requirement.level));
            parameters.insert(statuses_param, json!(requirement.statuses));
        }
        clauses.push(format!("({})", education_clauses.join(" OR ")));
    }
    for (index, requirement) in filters.languages.iter().enumerate() {
        let language_param = format!("language{index}");
        let cefr_param = format!("minCefr{index}");
        clauses.push(format!(
            "EXISTS {{ MATCH (resume)-[:HAS_LANGUAGE_PROFICIENCY]->(lp:LanguageProficiencyNode)-[:OF_LANGUAGE]->(language:LanguageNode) WHERE toLower(language.name) = toLower(${language_param}) AND lp.cefr >= ${cefr_param} }}"
        ));
        parameters.insert(language_param, json!(requirement.language));
        parameters.insert(cefr_param, json!(requirement.min_cefr));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    parameters.insert("limit".to_owned(), json!(limit));

    let statement = format!(
        "MATCH (resume:ResumeNode) {where_clause} RETURN resume.uid AS uid ORDER BY resume.uid DESC LIMIT $limit"
    );
    (statement, Value::Object(parameters))
}

fn base64_basic_auth(username: &str, password: &str) -> String {
    use std::fmt::Write;

    const TABLE: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let input = format!("{username}:{password}");
    let bytes = input.as_bytes();
    let mut out = String::with_capacity((bytes.len() + 2) / 3 * 4);

    for chunk in bytes.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied();
        let b2 = chunk.get(2).copied();

        let n = (u32::from(b0) << 16) | (u32::from(b1.unwrap_or(0)) << 8) | u32::from(b2.unwrap_or(0));
        let _ = write!(
            out,
            "{}{}{}{}",
            TABLE[((n >> 18) & 0x3F) as usize] as char,
            TABLE[((n >> 12) & 0x3F) as usize] as char,
            if b1.is_some() { TABLE[((n >> 6) & 0x3F) as usize] as char } else { '=' },
            if b2.is_some() { TABLE[(n & 0x3F) as usize] as char } else { '=' },
        );
    }
    out
}

fn map_reqwest_error(error: &reqwest::Error) -> ErrorEnvelope {
    if error.is_timeout() {
        return ErrorEnvelope::unexpected(ErrorCode::timeout(), "graph store request timed out", ErrorClass::Retriable);
    }
    if error.is_connect() {
        return ErrorEnvelope::unexpected(
            ErrorCode::io(),
            format!("graph store connection failed: {error}"),
            ErrorClass::Retriable,
        );
    }
    ErrorEnvelope::unexpected(
        ErrorCode::new("graph_store", "neo4j_request_failed"),
        format!("graph store request failed: {error}"),
        ErrorClass::NonRetriable,
    )
}

fn map_neo4j_http_error(status: StatusCode, payload: &[u8]) -> ErrorEnvelope {
    let message = String::from_utf8_lossy(payload).into_owned();
    let envelope = match status.as_u16() {
        400 | 404 | 422 => ErrorEnvelope::expected(ErrorCode::invalid_input(), message),
        401 | 403 => ErrorEnvelope::expected(ErrorCode::permission_denied(), message),
        408 => ErrorEnvelope::unexpected(ErrorCode::timeout(), message, ErrorClass::Retriable),
        _ if status.is_server_error() => ErrorEnvelope::unexpected(
            ErrorCode::new("core", "dependency_unavailable"),
            message,
            ErrorClass::Retriable,
        ),
        _ => ErrorEnvelope::unexpected(
            ErrorCode::new("graph_store", "neo4j_http_error"),
            message,
            ErrorClass::NonRetriable,
        ),
    };
    envelope.with_metadata("status", status.as_u16().to_string())
}

#[derive(Debug, Serialize)]
struct CypherTxRequest {
    statements: Vec<CypherStatement>,
}

#[derive(Debug, Serialize)]
struct CypherStatement {
    statement: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct CypherTxResponse {
    results: Vec<CypherResult>,
    errors: Vec<CypherError>,
}

#[derive(Debug, Deserialize)]
struct CypherResult {
    data: Vec<CypherRow>,
}

#[derive(Debug, Deserialize)]
struct CypherRow {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct CypherError {
    code: String,
    message: String,
}

const UPSERT_RESUME_NODE: &str = "MERGE (resume:ResumeNode {uid: $uid}) \
    SET resume.data = $data, resume.name = $name, resume.email = $email, \
        resume.role = $role, resume.yearsExperience = $yearsExperience, \
        resume.country = $country, resume.city = $city";

const LINK_SKILL: &str = "MATCH (resume:ResumeNode {uid: $uid}) \
    MERGE (skill:SkillNode {name: $name}) \
    MERGE (resume)-[:HAS_SKILL]->(skill)";

const LINK_COMPANY: &str = "MATCH (resume:ResumeNode {uid: $uid}) \
    MERGE (company:CompanyNode {name: $name}) \
    MERGE (resume)-[:HAS_EMPLOYMENT_HISTORY]->(:EmploymentHistoryItemNode)-[:AT_COMPANY]->(company)";

const LINK_INSTITUTION: &str = "MATCH (resume:ResumeNode {uid: $uid}) \
    MERGE (institution:InstitutionNode {name: $name}) \
    MERGE (resume)-[:HAS_EDUCATION]->(:EducationItemNode {level: $level, status: $status})-[:STUDIED_AT]->(institution)";

const LINK_LANGUAGE: &str = "MATCH (resume:ResumeNode {uid: $uid}) \
    MERGE (language:LanguageNode {name: $name}) \
    MERGE (resume)-[:HAS_LANGUAGE_PROFICIENCY]->(:LanguageProficiencyNode {cefr: $cefr})-[:OF_LANGUAGE]->(language)";

const FETCH_RESUME_BY_UID: &str = "MATCH (resume:ResumeNode {uid: $uid}) RETURN resume.data AS data";

const FETCH_RESUME_BY_EMAIL: &str =
    "MATCH (resume:ResumeNode {email: $email}) RETURN resume.data AS data LIMIT 1";

const FETCH_RESUMES_BY_UIDS: &str =
    "MATCH (resume:ResumeNode) WHERE resume.uid IN $uids RETURN resume.data AS data";

const DELETE_RESUME_NODE_ONLY: &str =
    "MATCH (resume:ResumeNode {uid: $uid}) WITH resume, resume.uid AS found DETACH DELETE resume RETURN found";

const DELETE_RESUME_CASCADE: &str = "MATCH (resume:ResumeNode {uid: $uid})
OPTIONAL MATCH (resume)-[:HAS_EMPLOYMENT_HISTORY]->(eh:EmploymentHistoryItemNode)
OPTIONAL MATCH (eh)-[:HAS_DURATION]->(dur:EmploymentDurationNode)
OPTIONAL MATCH (eh)-[:LOCATED_AT]->(eloc:LocationNode)
OPTIONAL MATCH (eh)-[:HAS_KEY_POINT]->(kp:KeyPointNode)
OPTIONAL MATCH (resume)-[:HAS_PROJECT]->(proj:ProjectNode)
OPTIONAL MATCH (proj)-[:HAS_KEY_POINT]->(pkp:KeyPointNode)
OPTIONAL MATCH (resume)-[:HAS_EDUCATION]->(edu:EducationItemNode)
OPTIONAL MATCH (edu)-[:INCLUDES_COURSEWORK]->(cw:CourseworkNode)
OPTIONAL MATCH (edu)-[:HAS_EXTRA]->(ex:EducationExtraNode)
OPTIONAL MATCH (edu)-[:LOCATED_AT]->(eduloc:LocationNode)
OPTIONAL MATCH (resume)-[:HAS_COURSE]->(course:CourseNode)
OPTIONAL MATCH (resume)-[:HAS_CERTIFICATION]->(cert:CertificationNode)
OPTIONAL MATCH (resume)-[:HAS_AWARD]->(award:AwardNode)
OPTIONAL MATCH (resume)-[:HAS_SCIENTIFIC_CONTRIBUTION]->(sc:ScientificContributionNode)
OPTIONAL MATCH (resume)-[:HAS_LANGUAGE_PROFICIENCY]->(lp:LanguageProficiencyNode)
WITH resume, count(resume) AS found, lp, sc, award, cert, course, ex, cw, eduloc, edu, pkp, proj, kp, eloc, dur, eh
DETACH DELETE lp, sc, award, cert, course
DETACH DELETE ex, cw, eduloc, edu
DETACH DELETE pkp, proj
DETACH DELETE kp, eloc, dur, eh
DETACH DELETE resume
RETURN found";

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Neo4jGraphConfig {
        Neo4jGraphConfig {
            base_url: "http://localhost:7474".into(),
            database: "neo4j".into(),
            username: None,
            password: None,
            timeout_ms: 1_000,
        }
    }

    #[test]
    fn adapter_builds_with_valid_config() {
        assert!(Neo4jGraphStore::new(&sample_config()).is_ok());
    }

    #[test]
    fn rejects_empty_database_name() {
        let mut config = sample_config();
        config.database = "".into();
        assert!(Neo4jGraphStore::new(&config).is_err());
    }

    #[test]
    fn search_statement_includes_skill_clause() {
        let filters = SearchFilters {
            skills: vec!["rust".to_owned()],
            ..Default::default()
        };
        let (statement, _) = build_search_statement(&filters, 10);
        assert!(statement.contains("HAS_SKILL"));
    }

    #[test]
    fn search_statement_includes_location_education_and_language_clauses() {
        use resumariner_domain::{CefrLevel, EducationRequirement, EducationStatus, LanguageRequirement, LocationRequirement};

        let filters = SearchFilters {
            locations: vec![LocationRequirement {
                country: "Spain".to_owned(),
                cities: vec!["Madrid".to_owned()],
            }],
            education: vec![EducationRequirement {
                level: "Bachelor".to_owned(),
                statuses: vec![EducationStatus::Completed],
            }],
            languages: vec![LanguageRequirement {
                language: "English".to_owned(),
                min_cefr: CefrLevel::B2,
            }],
            ..Default::default()
        };
        let (statement, parameters) = build_search_statement(&filters, 10);
        assert!(statement.contains("resume.country"));
        assert!(statement.contains("HAS_EDUCATION"));
        assert!(statement.contains("HAS_LANGUAGE_PROFICIENCY"));
        assert_eq!(parameters["locationCountry0"], json!("Spain"));
        assert_eq!(parameters["educationLevel0"], json!("Bachelor"));
        assert_eq!(parameters["minCefr0"], json!("B2"));
    }

    #[test]
    fn basic_auth_header_encodes_credentials() {
        assert_eq!(base64_basic_auth("neo4j", "pass"), "bmVvNGo6cGFzcw=="); // pragma: allowlist secret
    }
}
