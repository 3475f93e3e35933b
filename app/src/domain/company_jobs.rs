//! Job listings owned by the signed-in company.
//!
//! The service keeps the company's jobs in memory and mirrors every change
//! into the `jobs` cache namespace, so a restart within the cache lifetime
//! shows the same list without a backend round trip.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, error, warn};

use crate::domain::cache::{CacheNamespace, TtlCache};
use crate::domain::ports::{JobRepository, JobRepositoryError};
use crate::domain::{Analytics, Error, Job, JobDraft, JobId, NewJob, SessionStore};

/// Cache key for the company's job list.
pub const COMPANY_JOBS_KEY: &str = "company_jobs";
/// How long the cached list stays fresh.
pub const COMPANY_JOBS_TTL: Duration = Duration::from_secs(15 * 60);
/// Most jobs fetched in one listing.
pub const COMPANY_JOBS_LIMIT: usize = 50;

/// Manages the signed-in company's job postings.
pub struct CompanyJobsService<R> {
    repository: Arc<R>,
    session: SessionStore,
    cache: TtlCache,
    clock: Arc<dyn Clock>,
    analytics: Option<Analytics>,
    jobs: Vec<Job>,
    last_updated: Option<DateTime<Utc>>,
}

impl<R> CompanyJobsService<R> {
    /// Create a service with an empty list.
    pub fn new(
        repository: Arc<R>,
        session: SessionStore,
        cache: TtlCache,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            session,
            cache,
            clock,
            analytics: None,
            jobs: Vec::new(),
            last_updated: None,
        }
    }

    /// Report new postings to `analytics`.
    #[must_use]
    pub fn with_analytics(mut self, analytics: Analytics) -> Self {
        self.analytics = Some(analytics);
        self
    }

    /// Jobs currently loaded, newest first.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// When the list was last loaded.
    pub const fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Put `job` at the front of the list.
    pub fn add_job_to_list(&mut self, job: Job) {
        self.jobs.insert(0, job);
        self.write_cache();
    }

    /// Replace the job with the same id, if loaded.
    pub fn update_job_in_list(&mut self, job: Job) {
        if let Some(slot) = self.jobs.iter_mut().find(|existing| existing.id == job.id) {
            *slot = job;
        }
        self.write_cache();
    }

    fn write_cache(&self) {
        if let Err(err) = self.cache.set(
            &CacheNamespace::JOBS,
            COMPANY_JOBS_KEY,
            &self.jobs,
            COMPANY_JOBS_TTL,
        ) {
            warn!(error = %err, "failed to cache company jobs");
        }
    }

    fn cached_jobs(&self) -> Option<Vec<Job>> {
        match self.cache.get::<Vec<Job>>(&CacheNamespace::JOBS, COMPANY_JOBS_KEY) {
            Ok(jobs) => jobs.filter(|jobs| !jobs.is_empty()),
            Err(err) => {
                warn!(error = %err, "failed to read cached company jobs");
                None
            }
        }
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
}

impl<R: JobRepository> CompanyJobsService<R> {
    /// Load the company's jobs, preferring a fresh non-empty cache unless
    /// `force_refresh` is set.
    pub async fn fetch_jobs(&mut self, force_refresh: bool) -> Result<&[Job], Error> {
        let user_id = self.session.require_user_id()?;

        if !force_refresh {
            if let Some(jobs) = self.cached_jobs() {
                debug!(count = jobs.len(), "serving company jobs from cache");
                self.jobs = jobs;
                self.last_updated = Some(self.clock.utc());
                return Ok(&self.jobs);
            }
        }

        let jobs = self
            .repository
            .list_posted_by(&user_id, COMPANY_JOBS_LIMIT)
            .await
            .map_err(|err| {
                error!(error = %err, "failed to load company jobs");
                Self::map_repository_error(err)
            })?;
        self.jobs = jobs;
        if !self.jobs.is_empty() {
            self.write_cache();
        }
        self.last_updated = Some(self.clock.utc());
        Ok(&self.jobs)
    }

    /// Reload from the backend, ignoring the cache.
    pub async fn refresh_jobs(&mut self) -> Result<&[Job], Error> {
        self.fetch_jobs(true).await
    }

    /// Delete a job remotely, then drop it from the list and cache.
    pub async fn delete_job(&mut self, job_id: &JobId) -> Result<(), Error> {
        self.repository.delete(job_id).await.map_err(|err| {
            error!(error = %err, %job_id, "failed to delete job");
            Self::map_repository_error(err)
        })?;
        self.jobs.retain(|job| &job.id != job_id);
        self.write_cache();
        Ok(())
    }

    /// Validate and publish a new job for the signed-in company.
    pub async fn post_job(&mut self, draft: JobDraft) -> Result<Job, Error> {
        draft
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let posted_by = self.session.require_user_id()?;
        let poster_name = self
            .session
            .display_name()
            .map_err(|err| Error::internal(format!("failed to read session: {err}")))?;

        let job = self
            .repository
            .create(&NewJob {
                draft,
                posted_by,
                poster_name,
            })
            .await
            .map_err(Self::map_repository_error)?;
        if let Some(analytics) = &self.analytics {
            analytics.track_job_posting(&job.id, &job.title);
        }
        self.add_job_to_list(job.clone());
        Ok(job)
    }

    /// Validate and apply `draft` to a loaded job the company owns.
    pub async fn edit_job(&mut self, job_id: &JobId, draft: JobDraft) -> Result<Job, Error> {
        draft
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let user_id = self.session.require_user_id()?;
        let mut job = self
            .jobs
            .iter()
            .find(|job| &job.id == job_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("job {job_id} not found")))?;
        if job.posted_by != user_id {
            return Err(Error::forbidden("job belongs to another company"));
        }

        job.apply_draft(&draft);
        job.poster_name = self
            .session
            .display_name()
            .map_err(|err| Error::internal(format!("failed to read session: {err}")))?;
        job.created_at = Some(self.clock.utc());

        self.repository
            .update(&job)
            .await
            .map_err(Self::map_repository_error)?;
        self.update_job_in_list(job.clone());
        Ok(job)
    }
}

#[cfg(test)]
#[path = "company_jobs_tests.rs"]
mod tests;
