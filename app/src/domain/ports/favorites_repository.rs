//! Port abstraction for saved-job records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::define_port_error;
use crate::domain::{Favorite, FavoriteId, JobId, UserId};

define_port_error! {
    /// Errors raised when reading or writing saved-job records.
    pub enum FavoritesRepositoryError {
        /// Backend could not be reached.
        Connection { message: String } => "favorites repository connection failed: {message}",
        /// The backend rejected or failed the operation.
        Query { message: String } => "favorites repository query failed: {message}",
    }
}

/// Saved-job storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FavoritesRepository: Send + Sync {
    /// Every record owned by `user_id`.
    async fn list_for_user(&self, user_id: &UserId)
    -> Result<Vec<Favorite>, FavoritesRepositoryError>;

    /// The record linking `user_id` to `job_id`, if any.
    async fn find(
        &self,
        user_id: &UserId,
        job_id: &JobId,
    ) -> Result<Option<Favorite>, FavoritesRepositoryError>;

    /// Store a new record and return it.
    async fn create(
        &self,
        user_id: &UserId,
        job_id: &JobId,
        saved_at: DateTime<Utc>,
    ) -> Result<Favorite, FavoritesRepositoryError>;

    /// Delete a record.
    async fn delete(&self, favorite_id: &FavoriteId) -> Result<(), FavoritesRepositoryError>;
}
