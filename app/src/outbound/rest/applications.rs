//! `/applications` endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{invalidate_reads, is_unreachable};
use crate::domain::ports::{ApplicationRepository, ApplicationRepositoryError};
use crate::domain::{
    ApiClient, ApiError, ApplicationId, ApplicationUpdate, JobApplication, NewApplication,
    RequestOptions, UserId,
};

/// Application repository backed by the REST API.
pub struct RestApplicationRepository {
    client: Arc<ApiClient>,
}

impl RestApplicationRepository {
    /// Wrap a shared client.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[derive(Deserialize)]
struct CreatedId {
    id: ApplicationId,
}

fn map_error(error: &ApiError) -> ApplicationRepositoryError {
    if is_unreachable(error) {
        ApplicationRepositoryError::connection(error.to_string())
    } else {
        ApplicationRepositoryError::query(error.to_string())
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, ApplicationRepositoryError> {
    serde_json::to_value(value).map_err(|error| {
        ApplicationRepositoryError::query(format!("failed to encode application: {error}"))
    })
}

/// Add `extra` members to a JSON object body.
fn merge(mut body: Value, extra: Value) -> Value {
    if let (Value::Object(target), Value::Object(source)) = (&mut body, extra) {
        target.extend(source);
    }
    body
}

#[async_trait]
impl ApplicationRepository for RestApplicationRepository {
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<JobApplication>, ApplicationRepositoryError> {
        self.client
            .get(
                "/applications",
                Some(json!({ "userId": user_id.as_str() })),
                RequestOptions::default().without_cache(),
            )
            .await
            .map_err(|error| map_error(&error))
    }

    async fn create(
        &self,
        user_id: &UserId,
        application: &NewApplication,
        applied_at: DateTime<Utc>,
    ) -> Result<ApplicationId, ApplicationRepositoryError> {
        let body = merge(
            encode(application)?,
            json!({
                "userId": user_id.as_str(),
                "status": application.status.unwrap_or_default(),
                "appliedDate": applied_at,
                "lastUpdated": applied_at,
            }),
        );
        let CreatedId { id } = self
            .client
            .post("/applications", Some(body), RequestOptions::default())
            .await
            .map_err(|error| map_error(&error))?;
        invalidate_reads(&self.client);
        Ok(id)
    }

    async fn update(
        &self,
        application_id: &ApplicationId,
        update: &ApplicationUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<(), ApplicationRepositoryError> {
        let body = merge(encode(update)?, json!({ "lastUpdated": updated_at }));
        self.client
            .patch::<Value>(
                &format!("/applications/{application_id}"),
                Some(body),
                RequestOptions::default(),
            )
            .await
            .map_err(|error| map_error(&error))?;
        invalidate_reads(&self.client);
        Ok(())
    }

    async fn delete(
        &self,
        application_id: &ApplicationId,
    ) -> Result<(), ApplicationRepositoryError> {
        self.client
            .delete::<Value>(
                &format!("/applications/{application_id}"),
                RequestOptions::default(),
            )
            .await
            .map_err(|error| map_error(&error))?;
        invalidate_reads(&self.client);
        Ok(())
    }
}
