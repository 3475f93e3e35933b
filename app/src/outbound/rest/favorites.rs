//! `/favorites` endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{invalidate_reads, is_unreachable};
use crate::domain::ports::{FavoritesRepository, FavoritesRepositoryError};
use crate::domain::{ApiClient, ApiError, Favorite, FavoriteId, JobId, RequestOptions, UserId};

/// Saved-job repository backed by the REST API.
pub struct RestFavoritesRepository {
    client: Arc<ApiClient>,
}

impl RestFavoritesRepository {
    /// Wrap a shared client.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    async fn query(&self, params: Value) -> Result<Vec<Favorite>, FavoritesRepositoryError> {
        self.client
            .get(
                "/favorites",
                Some(params),
                RequestOptions::default().without_cache(),
            )
            .await
            .map_err(|error| map_error(&error))
    }
}

#[derive(Deserialize)]
struct CreatedId {
    id: FavoriteId,
}

fn map_error(error: &ApiError) -> FavoritesRepositoryError {
    if is_unreachable(error) {
        FavoritesRepositoryError::connection(error.to_string())
    } else {
        FavoritesRepositoryError::query(error.to_string())
    }
}

#[async_trait]
impl FavoritesRepository for RestFavoritesRepository {
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Favorite>, FavoritesRepositoryError> {
        self.query(json!({ "userId": user_id.as_str() })).await
    }

    async fn find(
        &self,
        user_id: &UserId,
        job_id: &JobId,
    ) -> Result<Option<Favorite>, FavoritesRepositoryError> {
        let matches = self
            .query(json!({ "userId": user_id.as_str(), "jobId": job_id.as_str() }))
            .await?;
        Ok(matches.into_iter().next())
    }

    async fn create(
        &self,
        user_id: &UserId,
        job_id: &JobId,
        saved_at: DateTime<Utc>,
    ) -> Result<Favorite, FavoritesRepositoryError> {
        let CreatedId { id } = self
            .client
            .post(
                "/favorites",
                Some(json!({
                    "userId": user_id.as_str(),
                    "jobId": job_id.as_str(),
                    "savedAt": saved_at,
                })),
                RequestOptions::default(),
            )
            .await
            .map_err(|error| map_error(&error))?;
        invalidate_reads(&self.client);
        Ok(Favorite {
            id,
            user_id: user_id.clone(),
            job_id: job_id.clone(),
            saved_at: Some(saved_at),
        })
    }

    async fn delete(&self, favorite_id: &FavoriteId) -> Result<(), FavoritesRepositoryError> {
        self.client
            .delete::<Value>(
                &format!("/favorites/{favorite_id}"),
                RequestOptions::default(),
            )
            .await
            .map_err(|error| map_error(&error))?;
        invalidate_reads(&self.client);
        Ok(())
    }
}
