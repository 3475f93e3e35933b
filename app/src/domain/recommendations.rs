//! Job recommendations for job-seekers.
//!
//! Candidates come from the profile's skills, or from the newest postings
//! when the profile lists none. Recent search terms narrow the candidates
//! and jobs the user has already opened are dropped.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::domain::ports::{JobRepository, JobRepositoryError, KeyValueStore};
use crate::domain::{Analytics, Error, Job, JobId, SessionStore, UserProfile};

/// Store key holding the ids of jobs the user has opened.
pub const VIEWED_JOBS_KEY: &str = "viewedJobs";
/// Most skills sent in one skill query.
pub const MAX_QUERY_SKILLS: usize = 10;
/// Most candidate jobs fetched.
pub const RECOMMENDATION_LIMIT: usize = 20;
/// How many of the newest search terms narrow the candidates.
pub const RECENT_TERMS: usize = 3;

/// Builds recommendations from the job repository and local history.
pub struct RecommendationsService<R> {
    repository: Arc<R>,
    store: Arc<dyn KeyValueStore>,
    session: SessionStore,
    analytics: Option<Analytics>,
    recommendations: Vec<Job>,
}

impl<R> RecommendationsService<R> {
    /// Create a service with no recommendations yet.
    pub fn new(repository: Arc<R>, store: Arc<dyn KeyValueStore>, session: SessionStore) -> Self {
        Self {
            repository,
            store,
            session,
            analytics: None,
            recommendations: Vec::new(),
        }
    }

    /// Report opened recommendations to `analytics`.
    #[must_use]
    pub fn with_analytics(mut self, analytics: Analytics) -> Self {
        self.analytics = Some(analytics);
        self
    }

    /// Last computed recommendations.
    pub fn recommendations(&self) -> &[Job] {
        &self.recommendations
    }

    /// Ids of jobs the user has opened.
    pub fn viewed_jobs(&self) -> Result<Vec<JobId>, Error> {
        let raw = self
            .store
            .get(VIEWED_JOBS_KEY)
            .map_err(|err| Error::internal(format!("failed to read viewed jobs: {err}")))?;
        Ok(raw
            .and_then(|raw| {
                serde_json::from_str(&raw)
                    .inspect_err(|err| warn!(error = %err, "ignoring unreadable viewed jobs"))
                    .ok()
            })
            .unwrap_or_default())
    }

    /// Remember that the user opened `job_id`.
    pub fn mark_viewed(&self, job_id: &JobId) -> Result<(), Error> {
        let opened = self.recommendations.iter().find(|job| &job.id == job_id);
        if let Some((analytics, job)) = self.analytics.as_ref().zip(opened) {
            analytics.track_job_view(job);
        }
        let mut viewed = self.viewed_jobs()?;
        if viewed.contains(job_id) {
            return Ok(());
        }
        viewed.push(job_id.clone());
        let encoded = serde_json::to_string(&viewed)
            .map_err(|err| Error::internal(format!("failed to encode viewed jobs: {err}")))?;
        self.store
            .set(VIEWED_JOBS_KEY, &encoded)
            .map_err(|err| Error::internal(format!("failed to save viewed jobs: {err}")))
    }
}

impl<R: JobRepository> RecommendationsService<R> {
    /// Recompute recommendations for `profile`.
    ///
    /// `search_terms` is most-recent-first; only the first
    /// [`RECENT_TERMS`] are used.
    pub async fn fetch_recommendations(
        &mut self,
        profile: &UserProfile,
        search_terms: &[String],
    ) -> Result<&[Job], Error> {
        self.session.require_user_id()?;

        let candidates = if profile.skills.is_empty() {
            self.repository.list_recent(RECOMMENDATION_LIMIT).await
        } else {
            let skills = profile
                .skills
                .get(..MAX_QUERY_SKILLS)
                .unwrap_or(&profile.skills);
            self.repository
                .list_by_skills(skills, RECOMMENDATION_LIMIT)
                .await
        }
        .map_err(|err| {
            error!(error = %err, "failed to fetch recommendation candidates");
            map_repository_error(err)
        })?;

        let terms: Vec<String> = search_terms
            .iter()
            .take(RECENT_TERMS)
            .map(|term| term.to_lowercase())
            .collect();
        let viewed = self.viewed_jobs()?;
        let fetched = candidates.len();

        self.recommendations = candidates
            .into_iter()
            .filter(|job| terms.is_empty() || matches_any_term(job, &terms))
            .filter(|job| !viewed.contains(&job.id))
            .collect();
        debug!(
            fetched,
            kept = self.recommendations.len(),
            "computed recommendations"
        );
        Ok(&self.recommendations)
    }
}

fn matches_any_term(job: &Job, terms: &[String]) -> bool {
    let text = format!(
        "{} {} {} {}",
        job.title, job.description, job.skill, job.category
    )
    .to_lowercase();
    terms.iter().any(|term| text.contains(term.as_str()))
}

fn map_repository_error(error: JobRepositoryError) -> Error {
    match error {
        JobRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("job repository unavailable: {message}"))
        }
        JobRepositoryError::NotFound { job_id } => {
            Error::not_found(format!("job {job_id} not found"))
        }
        JobRepositoryError::Query { message } => {
            Error::internal(format!("job repository error: {message}"))
        }
    }
}
