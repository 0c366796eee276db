//! Search coordinator: semantic (vector), structured (graph), and hybrid
//! modes, plus a filter-options aggregation used to populate search UIs.
//!
//! Hybrid mode fans the two searches out concurrently and merges them with
//! [`HybridWeights::combine`], preserving a strict result-tier ordering:
//! resumes present in both result sets first, then vector-only hits, then
//! structured-only hits — each tier sorted by combined score.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use resumariner_domain::{EducationStatus, HybridWeights, SearchFilters, SearchMode};
use resumariner_ports::{
    EmbedRequest, EmbeddingPort, GraphStorePort, PayloadFilter, Resume, Uid, VectorDbPort,
    VectorSearchHit, VectorSearchOptions,
};
use resumariner_shared::{RequestContext, Result};
use serde::{Deserialize, Serialize};

/// Upper bound on how many of a single resume's points are folded into one
/// semantic-search hit. `spec.md` doesn't name a number; five keeps the
/// summary of "why this resume matched" readable without dropping the
/// highest-scoring point.
const MAX_MATCHES_PER_RESULT: usize = 5;

/// Resumes scanned when aggregating filter options. Every resume currently
/// in the graph, capped generously since there is no dedicated count/list
/// operation on [`GraphStorePort`].
const FILTER_OPTIONS_SCAN_LIMIT: u32 = 10_000;

#[derive(Clone)]
pub struct SearchCoordinatorDeps {
    pub embedding: Arc<dyn EmbeddingPort>,
    pub vector_db: Arc<dyn VectorDbPort>,
    pub graph_store: Arc<dyn GraphStorePort>,
}

/// A single matching point backing a semantic-search hit, surfaced so
/// callers can show "why this matched".
#[derive(Debug, Clone, Serialize)]
pub struct MatchedPoint {
    pub text: String,
    pub source: resumariner_domain::EmbeddingSource,
    pub context: Option<String>,
    pub score: f32,
}

/// One scored search result, enriched with the backing resume when found.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub uid: Uid,
    pub score: f64,
    pub matched_points: Vec<MatchedPoint>,
    pub resume: Option<Resume>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SemanticSearchInput {
    pub query: String,
    pub limit: u32,
    pub min_score: Option<f32>,
    #[serde(default)]
    pub filters: SearchFilters,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HybridSearchInput {
    pub query: String,
    pub limit: u32,
    pub min_score: Option<f32>,
    #[serde(default)]
    pub filters: SearchFilters,
    pub weights: Option<HybridWeights>,
}

/// Vector similarity search, scoped by whichever `filters` dimensions the
/// vector payload can express: `skills` (any-of), `role`, and `company` via
/// its mapping to the payload's `companies` field. `locations`, `education`,
/// and `languages` have no representation in the vector payload and are
/// silently ignored here; use structured or hybrid mode for those.
pub async fn semantic_search(
    ctx: &RequestContext,
    deps: &SearchCoordinatorDeps,
    input: SemanticSearchInput,
) -> Result<Vec<SearchHit>> {
    let query_vector = deps
        .embedding
        .embed(ctx, EmbedRequest::from(input.query.as_str()))
        .await?
        .into_vector();
    let options = VectorSearchOptions {
        limit: input.limit,
        min_score: input.min_score,
        filter: payload_filter_from(&input.filters),
    };
    let hits = deps
        .vector_db
        .search(ctx, query_vector.to_vec(), options)
        .await?;
    let grouped = group_hits_by_uid(hits);
    let mut scored: Vec<(Uid, f64, Vec<MatchedPoint>)> = grouped
        .into_iter()
        .map(|(uid, mut points)| {
            points.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
            points.truncate(MAX_MATCHES_PER_RESULT);
            let score = points.first().map_or(0.0, |point| f64::from(point.score));
            let matched_points = points
                .into_iter()
                .map(|hit| MatchedPoint {
                    text: hit.point.text,
                    source: hit.point.source,
                    context: hit.point.context,
                    score: hit.score,
                })
                .collect();
            (uid, score, matched_points)
        })
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let uids: Vec<Uid> = scored.iter().map(|(uid, _, _)| *uid).collect();
    let resumes_by_uid = fetch_resumes_by_uid(ctx, deps.graph_store.as_ref(), uids).await?;

    Ok(scored
        .into_iter()
        .map(|(uid, score, matched_points)| SearchHit {
            uid,
            score,
            matched_points,
            resume: resumes_by_uid.get(&uid).cloned(),
        })
        .collect())
}

/// Cypher-backed structured search against [`GraphStorePort`]. Every
/// `SearchFilters` dimension applies with full AND/substring semantics.
pub async fn structured_search(
    ctx: &RequestContext,
    deps: &SearchCoordinatorDeps,
    filters: SearchFilters,
    limit: u32,
) -> Result<Vec<SearchHit>> {
    let uids = deps.graph_store.search_structured(ctx, filters, limit).await?;
    let resumes_by_uid = fetch_resumes_by_uid(ctx, deps.graph_store.as_ref(), uids.clone()).await?;
    Ok(uids
        .into_iter()
        .map(|uid| SearchHit {
            uid,
            score: 1.0,
            matched_points: Vec::new(),
            resume: resumes_by_uid.get(&uid).cloned(),
        })
        .collect())
}

/// Concurrently runs semantic and structured search at `limit * 2` each,
/// then merges by [`HybridWeights::combine`] with a strict tier order: both
/// present, then vector-only, then structured-only, sorted by combined score
/// within each tier.
pub async fn hybrid_search(
    ctx: &RequestContext,
    deps: &SearchCoordinatorDeps,
    input: HybridSearchInput,
) -> Result<Vec<SearchHit>> {
    let weights = input.weights.unwrap_or_default();
    let fan_out_limit = input.limit.saturating_mul(2).max(1);

    let semantic_input = SemanticSearchInput {
        query: input.query,
        limit: fan_out_limit,
        min_score: input.min_score,
        filters: input.filters.clone(),
    };
    let (semantic_result, structured_result) = tokio::join!(
        semantic_search(ctx, deps, semantic_input),
        deps.graph_store.search_structured(ctx, input.filters, fan_out_limit)
    );
    let semantic_hits = semantic_result?;
    let structured_uids = structured_result?;
    let structured_set: HashSet<Uid> = structured_uids.iter().copied().collect();

    let mut vector_hits_by_uid: HashMap<Uid, SearchHit> = HashMap::new();
    for hit in semantic_hits {
        vector_hits_by_uid.insert(hit.uid, hit);
    }

    let mut all_uids: HashSet<Uid> = vector_hits_by_uid.keys().copied().collect();
    all_uids.extend(structured_set.iter().copied());

    let mut both = Vec::new();
    let mut vector_only = Vec::new();
    let mut structured_only = Vec::new();
    for uid in all_uids {
        let vector_score = vector_hits_by_uid.get(&uid).map(|hit| hit.score);
        let present_in_graph = structured_set.contains(&uid);
        let combined = weights.combine(vector_score, present_in_graph);
        match (vector_score.is_some(), present_in_graph) {
            (true, true) => both.push((uid, combined)),
            (true, false) => vector_only.push((uid, combined)),
            (false, true) => structured_only.push((uid, combined)),
            (false, false) => {}
        }
    }
    for tier in [&mut both, &mut vector_only, &mut structured_only] {
        tier.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    }

    let mut ordered = both;
    ordered.extend(vector_only);
    ordered.extend(structured_only);
    ordered.truncate(input.limit as usize);

    let missing_uids: Vec<Uid> = ordered
        .iter()
        .filter(|(uid, _)| !vector_hits_by_uid.contains_key(uid))
        .map(|(uid, _)| *uid)
        .collect();
    let extra_resumes = fetch_resumes_by_uid(ctx, deps.graph_store.as_ref(), missing_uids).await?;

    Ok(ordered
        .into_iter()
        .map(|(uid, combined)| {
            if let Some(mut hit) = vector_hits_by_uid.remove(&uid) {
                hit.score = combined;
                hit
            } else {
                SearchHit {
                    uid,
                    score: combined,
                    matched_points: Vec::new(),
                    resume: extra_resumes.get(&uid).cloned(),
                }
            }
        })
        .collect())
}

/// Dispatch on [`SearchMode`], always returning the hybrid `Weights` for
/// structured/semantic only when relevant.
pub async fn search(
    ctx: &RequestContext,
    deps: &SearchCoordinatorDeps,
    mode: SearchMode,
    query: Option<String>,
    filters: SearchFilters,
    limit: u32,
    min_score: Option<f32>,
    weights: Option<HybridWeights>,
) -> Result<Vec<SearchHit>> {
    match mode {
        SearchMode::Semantic => {
            let query = query.unwrap_or_default();
            semantic_search(
                ctx,
                deps,
                SemanticSearchInput { query, limit, min_score, filters },
            )
            .await
        }
        SearchMode::Structured => structured_search(ctx, deps, filters, limit).await,
        SearchMode::Hybrid => {
            let query = query.unwrap_or_default();
            hybrid_search(
                ctx,
                deps,
                HybridSearchInput { query, limit, min_score, filters, weights },
            )
            .await
        }
    }
}

fn group_hits_by_uid(hits: Vec<VectorSearchHit>) -> HashMap<Uid, Vec<VectorSearchHit>> {
    let mut grouped: HashMap<Uid, Vec<VectorSearchHit>> = HashMap::new();
    for hit in hits {
        grouped.entry(hit.uid).or_default().push(hit);
    }
    grouped
}

async fn fetch_resumes_by_uid(
    ctx: &RequestContext,
    graph_store: &dyn GraphStorePort,
    uids: Vec<Uid>,
) -> Result<HashMap<Uid, Resume>> {
    if uids.is_empty() {
        return Ok(HashMap::new());
    }
    let resumes = graph_store.get_resumes_by_ids(ctx, uids).await?;
    Ok(resumes
        .into_iter()
        .filter_map(|resume| resume.uid.map(|uid| (uid, resume)))
        .collect())
}

/// Translates the payload-expressible subset of `filters` into the vector
/// store's filter language: `skills` (any-of against the payload's `skills`
/// field), `role` (exact match), and `company` (mapped to the payload's
/// `companies` field).
fn payload_filter_from(filters: &SearchFilters) -> PayloadFilter {
    let mut payload_filter = PayloadFilter::new();
    if !filters.skills.is_empty() {
        payload_filter.insert(
            "skills".into(),
            serde_json::Value::Array(filters.skills.iter().cloned().map(serde_json::Value::String).collect()),
        );
    }
    if let Some(role) = &filters.role {
        payload_filter.insert("role".into(), serde_json::Value::String(role.clone()));
    }
    if let Some(company) = &filters.company {
        payload_filter.insert(
            "companies".into(),
            serde_json::Value::Array(vec![serde_json::Value::String(company.clone())]),
        );
    }
    payload_filter
}

#[derive(Debug, Clone, Serialize)]
pub struct CountedOption {
    pub value: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountryOption {
    pub country: String,
    pub count: u32,
    pub cities: Vec<CountedOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EducationLevelOption {
    pub level: String,
    pub count: u32,
    pub statuses: Vec<CountedOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageOption {
    pub language: String,
    pub count: u32,
    pub cefr_levels: Vec<CountedOption>,
}

/// Aggregated facet options for building a search UI, computed by scanning
/// every resume in the graph. There is no dedicated aggregate/count
/// operation on [`GraphStorePort`], so this issues an unfiltered
/// `search_structured` scan capped at [`FILTER_OPTIONS_SCAN_LIMIT`].
#[derive(Debug, Clone, Serialize, Default)]
pub struct FilterOptions {
    pub skills: Vec<CountedOption>,
    pub roles: Vec<CountedOption>,
    pub companies: Vec<CountedOption>,
    pub countries: Vec<CountryOption>,
    pub education_levels: Vec<EducationLevelOption>,
    pub languages: Vec<LanguageOption>,
}

pub async fn filter_options(ctx: &RequestContext, deps: &SearchCoordinatorDeps) -> Result<FilterOptions> {
    let uids = deps
        .graph_store
        .search_structured(ctx, SearchFilters::default(), FILTER_OPTIONS_SCAN_LIMIT)
        .await?;
    let resumes = deps.graph_store.get_resumes_by_ids(ctx, uids).await?;

    let mut skills: HashMap<String, u32> = HashMap::new();
    let mut roles: HashMap<String, u32> = HashMap::new();
    let mut companies: HashMap<String, u32> = HashMap::new();
    let mut country_counts: HashMap<String, u32> = HashMap::new();
    let mut city_counts: HashMap<String, HashMap<String, u32>> = HashMap::new();
    let mut education_counts: HashMap<String, u32> = HashMap::new();
    let mut education_status_counts: HashMap<String, HashMap<String, u32>> = HashMap::new();
    let mut language_counts: HashMap<String, u32> = HashMap::new();
    let mut language_cefr_counts: HashMap<String, HashMap<String, u32>> = HashMap::new();

    for resume in &resumes {
        for skill in &resume.skills {
            *skills.entry(skill.name.clone()).or_insert(0) += 1;
        }
        if let Some(role) = resume
            .professional_profile
            .as_ref()
            .and_then(|profile| profile.preferences.as_ref())
            .map(|preferences| preferences.role.clone())
        {
            *roles.entry(role).or_insert(0) += 1;
        }
        for employment in &resume.employment_history {
            if let Some(company) = &employment.company {
                *companies.entry(company.name.clone()).or_insert(0) += 1;
            }
        }
        if let Some(location) = resume
            .personal_info
            .demographics
            .as_ref()
            .and_then(|demographics| demographics.current_location.as_ref())
        {
            if let Some(country) = &location.country {
                *country_counts.entry(country.clone()).or_insert(0) += 1;
                if let Some(city) = &location.city {
                    *city_counts.entry(country.clone()).or_default().entry(city.clone()).or_insert(0) += 1;
                }
            }
        }
        for education in &resume.education {
            if let Some(level) = &education.qualification {
                *education_counts.entry(level.clone()).or_insert(0) += 1;
                let status = education_status_label(education.status).to_string();
                *education_status_counts.entry(level.clone()).or_default().entry(status).or_insert(0) += 1;
            }
        }
        for proficiency in &resume.language_proficiency {
            let language = proficiency.language.name.clone();
            *language_counts.entry(language.clone()).or_insert(0) += 1;
            *language_cefr_counts.entry(language).or_default().entry(proficiency.cefr.clone()).or_insert(0) += 1;
        }
    }

    let mut countries: Vec<CountryOption> = country_counts
        .into_iter()
        .map(|(country, count)| {
            let cities = city_counts.remove(&country).map(into_sorted_options).unwrap_or_default();
            CountryOption { country, count, cities }
        })
        .collect();
    countries.sort_by(|a, b| a.country.cmp(&b.country));

    let mut education_levels: Vec<EducationLevelOption> = education_counts
        .into_iter()
        .map(|(level, count)| {
            let statuses = education_status_counts.remove(&level).map(into_sorted_options).unwrap_or_default();
            EducationLevelOption { level, count, statuses }
        })
        .collect();
    education_levels.sort_by(|a, b| a.level.cmp(&b.level));

    let mut languages: Vec<LanguageOption> = language_counts
        .into_iter()
        .map(|(language, count)| {
            let cefr_levels = language_cefr_counts.remove(&language).map(into_sorted_options).unwrap_or_default();
            LanguageOption { language, count, cefr_levels }
        })
        .collect();
    languages.sort_by(|a, b| a.language.cmp(&b.language));

    Ok(FilterOptions {
        skills: into_sorted_options(skills),
        roles: into_sorted_options(roles),
        companies: into_sorted_options(companies),
        countries,
        education_levels,
        languages,
    })
}

fn education_status_label(status: EducationStatus) -> &'static str {
    match status {
        EducationStatus::Completed => "completed",
        EducationStatus::Ongoing => "ongoing",
        EducationStatus::Incomplete => "incomplete",
    }
}

fn into_sorted_options(counts: HashMap<String, u32>) -> Vec<CountedOption> {
    let mut options: Vec<CountedOption> = counts
        .into_iter()
        .map(|(value, count)| CountedOption { value, count })
        .collect();
    options.sort_by(|a, b| a.value.cmp(&b.value));
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_hits_by_uid_preserves_all_points() {
        let uid = Uid::new_random();
        let hits = vec![sample_hit(uid, 0.9), sample_hit(uid, 0.7)];
        let grouped = group_hits_by_uid(hits);
        assert_eq!(grouped.get(&uid).map(Vec::len), Some(2));
    }

    #[test]
    fn payload_filter_maps_company_to_companies_field() {
        let filters = SearchFilters {
            company: Some("Acme".to_string()),
            ..SearchFilters::default()
        };
        let payload_filter = payload_filter_from(&filters);
        assert!(payload_filter.contains_key("companies"));
        assert!(!payload_filter.contains_key("company"));
    }

    #[test]
    fn payload_filter_ignores_unsupported_dimensions() {
        let filters = SearchFilters {
            years_experience: Some(5.0),
            ..SearchFilters::default()
        };
        let payload_filter = payload_filter_from(&filters);
        assert!(payload_filter.is_empty());
    }

    #[test]
    fn education_status_label_matches_serde_rename() {
        assert_eq!(education_status_label(EducationStatus::Completed), "completed");
    }

    fn sample_hit(uid: Uid, score: f32) -> VectorSearchHit {
        VectorSearchHit {
            point_id: uuid::Uuid::new_v4(),
            uid,
            score,
            point: resumariner_domain::EmbeddingPoint {
                id: uuid::Uuid::new_v4(),
                uid,
                vector: vec![0.1, 0.2],
                text: "text".to_string(),
                source: resumariner_domain::EmbeddingSource::Summary,
                context: None,
                name: "Name".to_string(),
                email: "name@example.com".to_string(),
                skills: Vec::new(),
                technologies: Vec::new(),
                companies: Vec::new(),
                role: None,
                location: None,
                years_experience: 0.0,
            },
        }
    }
}
