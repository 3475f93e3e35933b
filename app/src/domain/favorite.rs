//! Jobs a job-seeker has saved for later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FavoriteId, JobId, UserId};

/// One saved-job record linking a user to a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    /// Backend-issued identifier of the record.
    pub id: FavoriteId,
    /// Owning job-seeker.
    pub user_id: UserId,
    /// Saved job.
    pub job_id: JobId,
    /// When the job was saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}
