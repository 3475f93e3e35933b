//! Job-seeker application tracking.
//!
//! The service owns an in-memory list of the signed-in user's applications
//! and keeps [`ApplicationStats`] in step with every local change, so the
//! counters never need a full recount after the initial fetch.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::{error, info};

use crate::domain::ports::{ApplicationRepository, ApplicationRepositoryError};
use crate::domain::{
    Analytics, ApplicationId, ApplicationStats, ApplicationUpdate, Error, JobApplication, NewApplication,
    SessionStore, UserId,
};

/// Tracks the signed-in job-seeker's applications.
pub struct ApplicationsService<R> {
    repository: Arc<R>,
    session: SessionStore,
    clock: Arc<dyn Clock>,
    analytics: Option<Analytics>,
    applications: Vec<JobApplication>,
    stats: ApplicationStats,
}

impl<R> ApplicationsService<R> {
    /// Create a service with no applications loaded.
    pub fn new(repository: Arc<R>, session: SessionStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            session,
            clock,
            analytics: None,
            applications: Vec::new(),
            stats: ApplicationStats::default(),
        }
    }

    /// Report new applications to `analytics`.
    #[must_use]
    pub fn with_analytics(mut self, analytics: Analytics) -> Self {
        self.analytics = Some(analytics);
        self
    }

    /// Applications currently loaded, most recently applied first.
    pub fn applications(&self) -> &[JobApplication] {
        &self.applications
    }

    /// Counters for the loaded applications.
    pub const fn stats(&self) -> ApplicationStats {
        self.stats
    }

    fn map_repository_error(error: ApplicationRepositoryError) -> Error {
        match error {
            ApplicationRepositoryError::Connection { message } => Error::service_unavailable(
                format!("application repository unavailable: {message}"),
            ),
            ApplicationRepositoryError::Query { message } => {
                Error::internal(format!("application repository error: {message}"))
            }
        }
    }

    /// Index of an application the session user owns.
    fn owned_index(&self, id: &ApplicationId, user_id: &UserId) -> Result<usize, Error> {
        let (index, application) = self
            .applications
            .iter()
            .enumerate()
            .find(|(_, application)| &application.id == id)
            .ok_or_else(|| Error::not_found(format!("application {id} not found")))?;
        if &application.user_id != user_id {
            return Err(Error::forbidden("application belongs to another user")
                .with_details(json!({ "applicationId": id.as_str() })));
        }
        Ok(index)
    }
}

impl<R: ApplicationRepository> ApplicationsService<R> {
    /// Load the user's applications and recompute the counters.
    pub async fn fetch_applications(&mut self) -> Result<&[JobApplication], Error> {
        let user_id = self.session.require_user_id()?;
        let mut applications = self
            .repository
            .list_for_user(&user_id)
            .await
            .map_err(|err| {
                error!(error = %err, "failed to load applications");
                Self::map_repository_error(err)
            })?;
        applications.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));

        self.stats = ApplicationStats::from_applications(&applications);
        self.applications = applications;
        Ok(&self.applications)
    }

    /// Record a new application for the session user.
    pub async fn add_application(
        &mut self,
        application: NewApplication,
    ) -> Result<JobApplication, Error> {
        let user_id = self.session.require_user_id()?;
        let now = self.clock.utc();
        let id = self
            .repository
            .create(&user_id, &application, now)
            .await
            .map_err(|err| {
                error!(error = %err, job_id = %application.job_id, "failed to add application");
                Self::map_repository_error(err)
            })?;

        let created = application.into_application(id, user_id, now);
        info!(application_id = %created.id, "application added");
        if let Some(analytics) = &self.analytics {
            analytics.track_job_application(&created.job_id, &created.job_title, &created.company);
        }
        self.stats.record(created.status);
        self.applications.insert(0, created.clone());
        Ok(created)
    }

    /// Merge `update` into an application the session user owns.
    pub async fn update_application(
        &mut self,
        id: &ApplicationId,
        update: ApplicationUpdate,
    ) -> Result<JobApplication, Error> {
        let user_id = self.session.require_user_id()?;
        let index = self.owned_index(id, &user_id)?;
        let now = self.clock.utc();
        self.repository
            .update(id, &update, now)
            .await
            .map_err(|err| {
                error!(error = %err, application_id = %id, "failed to update application");
                Self::map_repository_error(err)
            })?;

        let Some(application) = self.applications.get_mut(index) else {
            return Err(Error::not_found(format!("application {id} not found")));
        };
        let previous = application.status;
        application.apply_update(&update, now);
        self.stats.transition(previous, application.status);
        Ok(application.clone())
    }

    /// Delete an application the session user owns.
    pub async fn delete_application(&mut self, id: &ApplicationId) -> Result<(), Error> {
        let user_id = self.session.require_user_id()?;
        let index = self.owned_index(id, &user_id)?;
        self.repository.delete(id).await.map_err(|err| {
            error!(error = %err, application_id = %id, "failed to delete application");
            Self::map_repository_error(err)
        })?;

        let removed = self.applications.remove(index);
        self.stats.forget(removed.status);
        Ok(())
    }
}

#[cfg(test)]
#[path = "applications_service_tests.rs"]
mod tests;
