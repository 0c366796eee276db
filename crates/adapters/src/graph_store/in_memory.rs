//! In-memory `GraphStorePort` implementation. Stores resumes directly
//! rather than as a graph, since tests care about upsert/query semantics,
//! not about the storage engine.

use resumariner_domain::{Resume, SearchFilters, Uid};
use resumariner_ports::{BoxFuture, GraphStorePort};
use resumariner_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory implementation of [`GraphStorePort`], keyed by `uid` with a
/// secondary email index mirroring the email upsert-join invariant.
#[derive(Default)]
pub struct InMemoryGraphStore {
    resumes: RwLock<BTreeMap<Uid, Resume>>,
}

impl InMemoryGraphStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn find_by_email(&self, email: &str) -> Option<Uid> {
        let resumes = self.resumes.read().expect("graph store lock poisoned");
        resumes
            .values()
            .find(|resume| resume.personal_info.contact.email.eq_ignore_ascii_case(email))
            .and_then(|resume| resume.uid)
    }
}

impl GraphStorePort for InMemoryGraphStore {
    fn upsert_resume(&self, ctx: &RequestContext, mut resume: Resume) -> BoxFuture<'_, Result<Uid>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_graph_store.upsert_resume")?;

            let email = resume.personal_info.contact.email.clone();
            let uid = resume.uid.or_else(|| self.find_by_email(&email)).unwrap_or_else(Uid::new_random);
            resume.uid = Some(uid);

            let mut resumes = self.resumes.write().expect("graph store lock poisoned");
            resumes.insert(uid, resume);
            Ok(uid)
        })
    }

    fn get_resume(&self, ctx: &RequestContext, uid: Uid) -> BoxFuture<'_, Result<Option<Resume>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_graph_store.get_resume")?;
            let resumes = self.resumes.read().expect("graph store lock poisoned");
            Ok(resumes.get(&uid).cloned())
        })
    }

    fn get_resumes_by_ids(&self, ctx: &RequestContext, uids: Vec<Uid>) -> BoxFuture<'_, Result<Vec<Resume>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_graph_store.get_resumes_by_ids")?;
            let resumes = self.resumes.read().expect("graph store lock poisoned");
            Ok(uids.into_iter().filter_map(|uid| resumes.get(&uid).cloned()).collect())
        })
    }

    fn get_resume_by_email(&self, ctx: &RequestContext, email: &str) -> BoxFuture<'_, Result<Option<Resume>>> {
        let ctx = ctx.clone();
        let email = email.to_owned();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_graph_store.get_resume_by_email")?;
            let resumes = self.resumes.read().expect("graph store lock poisoned");
            Ok(resumes
                .values()
                .find(|resume| resume.personal_info.contact.email.eq_ignore_ascii_case(&email))
                .cloned())
        })
    }

    fn delete_resume(&self, ctx: &RequestContext, uid: Uid) -> BoxFuture<'_, Result<bool>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_graph_store.delete_resume")?;
            let mut resumes = self.resumes.write().expect("graph store lock poisoned");
            Ok(resumes.remove(&uid).is_some())
        })
    }

    fn delete_resume_cascade(&self, ctx: &RequestContext, uid: Uid) -> BoxFuture<'_, Result<bool>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("in_memory_graph_store.delete_resume_cascade")?;
            let mut resumes = self.resumes.write().expect("graph store lock poisoned");
            Ok(resumes.remove(&uid).is_some())
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
            ctx.ensure_not_cancelled("in_memory_graph_store.search_structured")?;
            if limit == 0 {
                return Err(ErrorEnvelope::expected(
                    ErrorCode::invalid_input(),
                    "limit must be greater than zero",
                ));
            }

            let resumes = self.resumes.read().expect("graph store lock poisoned");
            let mut matches: Vec<(Uid, &Resume)> = resumes
                .iter()
                .filter(|(_, resume)| matches_filters(resume, &filters))
                .map(|(uid, resume)| (*uid, resume))
                .collect();

            matches.sort_by(|(uid_a, _), (uid_b, _)| uid_b.to_string().cmp(&uid_a.to_string()));
            matches.truncate(limit as usize);
            Ok(matches.into_iter().map(|(uid, _)| uid).collect())
        })
    }
}

fn matches_filters(resume: &Resume, filters: &SearchFilters) -> bool {
    matches_skills(resume, &filters.skills)
        && matches_role(resume, filters.role.as_deref())
        && matches_company(resume, filters.company.as_deref())
        && matches_locations(resume, &filters.locations)
        && matches_years_experience(resume, filters.years_experience)
        && matches_education(resume, &filters.education)
        && matches_languages(resume, &filters.languages)
}

fn matches_skills(resume: &Resume, required: &[String]) -> bool {
    required.iter().all(|needed| {
        resume
            .skills
            .iter()
            .any(|skill| skill.name.eq_ignore_ascii_case(needed))
    })
}

fn matches_role(resume: &Resume, role: Option<&str>) -> bool {
    let Some(role) = role else { return true };
    let role = role.to_ascii_lowercase();
    resume
        .professional_profile
        .as_ref()
        .and_then(|profile| profile.preferences.as_ref())
        .is_some_and(|preferences| preferences.role.to_ascii_lowercase().contains(&role))
}

fn matches_company(resume: &Resume, company: Option<&str>) -> bool {
    let Some(company) = company else { return true };
    let company = company.to_ascii_lowercase();
    resume.employment_history.iter().any(|item| {
        item.company
            .as_ref()
            .is_some_and(|info| info.name.to_ascii_lowercase().contains(&company))
    })
}

fn matches_locations(resume: &Resume, locations: &[resumariner_domain::LocationRequirement]) -> bool {
    if locations.is_empty() {
        return true;
    }
    let Some(current) = resume
        .personal_info
        .demographics
        .as_ref()
        .and_then(|demographics| demographics.current_location.as_ref())
    else {
        return false;
    };
    locations.iter().any(|requirement| {
        let country_matches = current
            .country
            .as_deref()
            .is_some_and(|country| country.eq_ignore_ascii_case(&requirement.country));
        if !country_matches {
            return false;
        }
        if requirement.cities.is_empty() {
            return true;
        }
        current.city.as_deref().is_some_and(|city| {
            requirement
                .cities
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(city))
        })
    })
}

fn matches_years_experience(resume: &Resume, minimum: Option<f64>) -> bool {
    minimum.is_none_or(|minimum| resume.years_of_experience() >= minimum)
}

fn matches_education(resume: &Resume, requirements: &[resumariner_domain::EducationRequirement]) -> bool {
    if requirements.is_empty() {
        return true;
    }
    requirements.iter().any(|requirement| {
        resume.education.iter().any(|item| {
            let level_matches = item
                .qualification
                .as_deref()
                .is_some_and(|qualification| qualification.to_ascii_lowercase().contains(&requirement.level.to_ascii_lowercase()));
            if !level_matches {
                return false;
            }
            requirement.statuses.is_empty() || requirement.statuses.contains(&item.status)
        })
    })
}

fn matches_languages(resume: &Resume, requirements: &[resumariner_domain::LanguageRequirement]) -> bool {
    requirements.iter().all(|requirement| {
        resume.language_proficiency.iter().any(|proficiency| {
            proficiency.language.name.eq_ignore_ascii_case(&requirement.language)
                && proficiency
                    .cefr_level()
                    .is_ok_and(|level| level >= requirement.min_cefr)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use resumariner_domain::{Contact, PersonalInfo, Skill};
    use resumariner_shared::RequestContext;

    fn sample_resume(email: &str) -> Resume {
        Resume {
            uid: None,
            personal_info: PersonalInfo {
                name: "Ada Lovelace".to_owned(),
                resume_lang: "en".to_owned(),
                contact: Contact {
                    email: email.to_owned(),
                    phone: None,
                    links: None,
                },
                demographics: None,
            },
            professional_profile: None,
            skills: vec![Skill { name: "Rust".to_owned() }],
            employment_history: Vec::new(),
            projects: Vec::new(),
            education: Vec::new(),
            courses: Vec::new(),
            certifications: Vec::new(),
            language_proficiency: Vec::new(),
            awards: Vec::new(),
            scientific_contributions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn upsert_and_get_resume_round_trips() -> Result<()> {
        let store = InMemoryGraphStore::new();
        let ctx = RequestContext::new_request();
        let uid = store.upsert_resume(&ctx, sample_resume("ada@example.com")).await?;

        let fetched = store.get_resume(&ctx, uid).await?;
        assert_eq!(fetched.map(|resume| resume.personal_info.name), Some("Ada Lovelace".to_owned()));
        Ok(())
    }

    #[tokio::test]
    async fn upsert_with_same_email_reuses_uid() -> Result<()> {
        let store = InMemoryGraphStore::new();
        let ctx = RequestContext::new_request();
        let first = store.upsert_resume(&ctx, sample_resume("ada@example.com")).await?;
        let second = store.upsert_resume(&ctx, sample_resume("ada@example.com")).await?;
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn search_structured_filters_by_skill() -> Result<()> {
        let store = InMemoryGraphStore::new();
        let ctx = RequestContext::new_request();
        let uid = store.upsert_resume(&ctx, sample_resume("ada@example.com")).await?;

        let matching = SearchFilters {
            skills: vec!["rust".to_owned()],
            ..Default::default()
        };
        let found = store.search_structured(&ctx, matching, 10).await?;
        assert_eq!(found, vec![uid]);

        let non_matching = SearchFilters {
            skills: vec!["cobol".to_owned()],
            ..Default::default()
        };
        let none_found = store.search_structured(&ctx, non_matching, 10).await?;
        assert!(none_found.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn delete_resume_cascade_removes_resume() -> Result<()> {
        let store = InMemoryGraphStore::new();
        let ctx = RequestContext::new_request();
        let uid = store.upsert_resume(&ctx, sample_resume("ada@example.com")).await?;

        let deleted = store.delete_resume_cascade(&ctx, uid).await?;
        assert!(deleted);
        assert!(store.get_resume(&ctx, uid).await?.is_none());
        Ok(())
    }
}
