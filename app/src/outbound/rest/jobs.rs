//! `/jobs` endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{invalidate_reads, is_unreachable};
use crate::domain::ports::{JobRepository, JobRepositoryError};
use crate::domain::{ApiClient, ApiError, Job, JobId, NewJob, RequestOptions, UserId};

/// Job repository backed by the REST API.
pub struct RestJobRepository {
    client: Arc<ApiClient>,
}

impl RestJobRepository {
    /// Wrap a shared client.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    async fn list(&self, params: Value, options: RequestOptions) -> Result<Vec<Job>, JobRepositoryError> {
        self.client
            .get("/jobs", Some(params), options)
            .await
            .map_err(|error| map_error(&error, None))
    }
}

fn map_error(error: &ApiError, job_id: Option<&JobId>) -> JobRepositoryError {
    match (error.status(), job_id) {
        (Some(404), Some(job_id)) => JobRepositoryError::not_found(job_id.as_str()),
        _ if is_unreachable(error) => JobRepositoryError::connection(error.to_string()),
        _ => JobRepositoryError::query(error.to_string()),
    }
}

fn job_path(job_id: &JobId) -> String {
    format!("/jobs/{job_id}")
}

#[async_trait]
impl JobRepository for RestJobRepository {
    async fn list_posted_by(
        &self,
        company_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Job>, JobRepositoryError> {
        // The company jobs service keeps its own cache of this listing.
        self.list(
            json!({
                "postedBy": company_id.as_str(),
                "orderBy": "createdAt",
                "order": "desc",
                "limit": limit,
            }),
            RequestOptions::default().without_cache(),
        )
        .await
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Job>, JobRepositoryError> {
        self.list(
            json!({ "orderBy": "createdAt", "order": "desc", "limit": limit }),
            RequestOptions::default(),
        )
        .await
    }

    async fn list_by_skills(
        &self,
        skills: &[String],
        limit: usize,
    ) -> Result<Vec<Job>, JobRepositoryError> {
        self.list(
            json!({ "skill": skills, "limit": limit }),
            RequestOptions::default(),
        )
        .await
    }

    async fn find(&self, job_id: &JobId) -> Result<Option<Job>, JobRepositoryError> {
        match self
            .client
            .get::<Job>(&job_path(job_id), None, RequestOptions::default())
            .await
        {
            Ok(job) => Ok(Some(job)),
            Err(error) if error.status() == Some(404) => Ok(None),
            Err(error) => Err(map_error(&error, Some(job_id))),
        }
    }

    async fn create(&self, job: &NewJob) -> Result<Job, JobRepositoryError> {
        let body = serde_json::to_value(job)
            .map_err(|error| JobRepositoryError::query(format!("failed to encode job: {error}")))?;
        let created = self
            .client
            .post("/jobs", Some(body), RequestOptions::default())
            .await
            .map_err(|error| map_error(&error, None))?;
        invalidate_reads(&self.client);
        Ok(created)
    }

    async fn update(&self, job: &Job) -> Result<(), JobRepositoryError> {
        let body = serde_json::to_value(job)
            .map_err(|error| JobRepositoryError::query(format!("failed to encode job: {error}")))?;
        self.client
            .put::<Value>(&job_path(&job.id), Some(body), RequestOptions::default())
            .await
            .map_err(|error| map_error(&error, Some(&job.id)))?;
        invalidate_reads(&self.client);
        Ok(())
    }

    async fn delete(&self, job_id: &JobId) -> Result<(), JobRepositoryError> {
        self.client
            .delete::<Value>(&job_path(job_id), RequestOptions::default())
            .await
            .map_err(|error| map_error(&error, Some(job_id)))?;
        invalidate_reads(&self.client);
        Ok(())
    }
}
