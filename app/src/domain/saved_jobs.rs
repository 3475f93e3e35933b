//! Jobs the signed-in job-seeker has saved.
//!
//! Saved-job records only hold a job id, so loading the list resolves each
//! one against the job repository. Jobs deleted since they were saved are
//! left out rather than failing the whole list.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, error, info};

use crate::domain::ports::{
    FavoritesRepository, FavoritesRepositoryError, JobRepository, JobRepositoryError,
};
use crate::domain::{Error, Job, JobId, SessionStore};

/// Saved jobs for the signed-in job-seeker.
pub struct SavedJobsService<F, J> {
    favorites: Arc<F>,
    jobs: Arc<J>,
    session: SessionStore,
    clock: Arc<dyn Clock>,
    saved: Vec<Job>,
}

impl<F, J> SavedJobsService<F, J> {
    /// Create a service with nothing loaded.
    pub fn new(
        favorites: Arc<F>,
        jobs: Arc<J>,
        session: SessionStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            favorites,
            jobs,
            session,
            clock,
            saved: Vec::new(),
        }
    }

    /// Saved jobs currently loaded.
    pub fn saved_jobs(&self) -> &[Job] {
        &self.saved
    }

    /// Returns `true` when `job_id` is in the loaded list.
    pub fn is_saved(&self, job_id: &JobId) -> bool {
        self.saved.iter().any(|job| &job.id == job_id)
    }

    fn map_favorites_error(error: FavoritesRepositoryError) -> Error {
        match error {
            FavoritesRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("favorites repository unavailable: {message}"))
            }
            FavoritesRepositoryError::Query { message } => {
                Error::internal(format!("favorites repository error: {message}"))
            }
        }
    }

    fn map_job_error(error: JobRepositoryError) -> Error {
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

impl<F: FavoritesRepository, J: JobRepository> SavedJobsService<F, J> {
    /// Load the user's saved-job records and resolve each job.
    pub async fn fetch_saved_jobs(&mut self) -> Result<&[Job], Error> {
        let user_id = self.session.require_user_id()?;
        let favorites = self
            .favorites
            .list_for_user(&user_id)
            .await
            .map_err(|err| {
                error!(error = %err, "failed to load saved jobs");
                Self::map_favorites_error(err)
            })?;

        let mut resolved = Vec::with_capacity(favorites.len());
        for favorite in &favorites {
            match self.jobs.find(&favorite.job_id).await {
                Ok(Some(job)) => resolved.push(job),
                Ok(None) | Err(JobRepositoryError::NotFound { .. }) => {
                    debug!(job_id = %favorite.job_id, "saved job no longer exists");
                }
                Err(err) => {
                    error!(error = %err, job_id = %favorite.job_id, "failed to resolve saved job");
                    return Err(Self::map_job_error(err));
                }
            }
        }
        self.saved = resolved;
        Ok(&self.saved)
    }

    /// Save `job` for the session user.
    pub async fn save_job(&mut self, job: Job) -> Result<(), Error> {
        let user_id = self.session.require_user_id()?;
        let existing = self
            .favorites
            .find(&user_id, &job.id)
            .await
            .map_err(Self::map_favorites_error)?;
        if existing.is_some() {
            return Err(Error::conflict(format!("job {} is already saved", job.id)));
        }

        let favorite = self
            .favorites
            .create(&user_id, &job.id, self.clock.utc())
            .await
            .map_err(|err| {
                error!(error = %err, job_id = %job.id, "failed to save job");
                Self::map_favorites_error(err)
            })?;
        info!(favorite_id = %favorite.id, job_id = %job.id, "job saved");
        self.saved.insert(0, job);
        Ok(())
    }

    /// Forget a saved job for the session user.
    pub async fn remove_saved_job(&mut self, job_id: &JobId) -> Result<(), Error> {
        let user_id = self.session.require_user_id()?;
        let favorite = self
            .favorites
            .find(&user_id, job_id)
            .await
            .map_err(Self::map_favorites_error)?
            .ok_or_else(|| Error::not_found("saved job not found"))?;

        self.favorites.delete(&favorite.id).await.map_err(|err| {
            error!(error = %err, %job_id, "failed to remove saved job");
            Self::map_favorites_error(err)
        })?;
        self.saved.retain(|job| &job.id != job_id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "saved_jobs_tests.rs"]
mod tests;
