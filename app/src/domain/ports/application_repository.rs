//! Port abstraction for job application persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::define_port_error;
use crate::domain::{ApplicationId, ApplicationUpdate, JobApplication, NewApplication, UserId};

define_port_error! {
    /// Errors raised when reading or writing applications.
    pub enum ApplicationRepositoryError {
        /// Backend could not be reached.
        Connection { message: String } => "application repository connection failed: {message}",
        /// The backend rejected or failed the operation.
        Query { message: String } => "application repository query failed: {message}",
    }
}

/// Application storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Applications owned by `user_id`, most recently applied first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<JobApplication>, ApplicationRepositoryError>;

    /// Store a new application for `user_id` and return its id.
    async fn create(
        &self,
        user_id: &UserId,
        application: &NewApplication,
        applied_at: DateTime<Utc>,
    ) -> Result<ApplicationId, ApplicationRepositoryError>;

    /// Merge `update` into the stored application.
    async fn update(
        &self,
        application_id: &ApplicationId,
        update: &ApplicationUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<(), ApplicationRepositoryError>;

    /// Delete an application.
    async fn delete(&self, application_id: &ApplicationId)
    -> Result<(), ApplicationRepositoryError>;
}
