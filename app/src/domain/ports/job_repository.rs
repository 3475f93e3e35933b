//! Port abstraction for job posting persistence.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{Job, JobId, NewJob, UserId};

define_port_error! {
    /// Errors raised when reading or writing job postings.
    pub enum JobRepositoryError {
        /// Backend could not be reached.
        Connection { message: String } => "job repository connection failed: {message}",
        /// The job does not exist.
        NotFound { job_id: String } => "job {job_id} not found",
        /// The backend rejected or failed the operation.
        Query { message: String } => "job repository query failed: {message}",
    }
}

/// Job posting storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Jobs posted by `company_id`, newest first, at most `limit`.
    async fn list_posted_by(
        &self,
        company_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Job>, JobRepositoryError>;

    /// Most recent jobs across all companies.
    async fn list_recent(&self, limit: usize) -> Result<Vec<Job>, JobRepositoryError>;

    /// Jobs whose skill is one of `skills`.
    async fn list_by_skills(
        &self,
        skills: &[String],
        limit: usize,
    ) -> Result<Vec<Job>, JobRepositoryError>;

    /// One job by id; `None` once it has been deleted.
    async fn find(&self, job_id: &JobId) -> Result<Option<Job>, JobRepositoryError>;

    /// Create a job and return it as stored.
    async fn create(&self, job: &NewJob) -> Result<Job, JobRepositoryError>;

    /// Replace the stored job with `job`.
    async fn update(&self, job: &Job) -> Result<(), JobRepositoryError>;

    /// Delete a job.
    async fn delete(&self, job_id: &JobId) -> Result<(), JobRepositoryError>;
}
