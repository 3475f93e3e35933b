//! `/companies` endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{invalidate_reads, is_unreachable};
use crate::domain::ports::{CompanyRepository, CompanyRepositoryError};
use crate::domain::{
    ApiClient, ApiError, CompanyProfileUpdate, CompanySignup, CompanyUser, RequestOptions, UserId,
};

/// Company account repository backed by the REST API.
pub struct RestCompanyRepository {
    client: Arc<ApiClient>,
}

impl RestCompanyRepository {
    /// Wrap a shared client.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Account lookups happen before a session exists, so they carry no
    /// bearer token and are never served from the cache.
    fn lookup_options() -> RequestOptions {
        RequestOptions::default().without_auth().without_cache()
    }
}

fn map_error(error: &ApiError) -> CompanyRepositoryError {
    if is_unreachable(error) {
        CompanyRepositoryError::connection(error.to_string())
    } else {
        CompanyRepositoryError::query(error.to_string())
    }
}

#[async_trait]
impl CompanyRepository for RestCompanyRepository {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CompanyUser>, CompanyRepositoryError> {
        let matches: Vec<CompanyUser> = self
            .client
            .get(
                "/companies",
                Some(json!({ "email": email, "limit": 1 })),
                Self::lookup_options(),
            )
            .await
            .map_err(|error| map_error(&error))?;
        Ok(matches.into_iter().next())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<CompanyUser>, CompanyRepositoryError> {
        match self
            .client
            .get::<CompanyUser>(&format!("/companies/{id}"), None, Self::lookup_options())
            .await
        {
            Ok(company) => Ok(Some(company)),
            Err(error) if error.status() == Some(404) => Ok(None),
            Err(error) => Err(map_error(&error)),
        }
    }

    async fn create(&self, signup: &CompanySignup) -> Result<CompanyUser, CompanyRepositoryError> {
        let body = serde_json::to_value(signup).map_err(|error| {
            CompanyRepositoryError::query(format!("failed to encode signup: {error}"))
        })?;
        let company = self
            .client
            .post("/companies", Some(body), RequestOptions::default().without_auth())
            .await
            .map_err(|error| map_error(&error))?;
        invalidate_reads(&self.client);
        Ok(company)
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &CompanyProfileUpdate,
    ) -> Result<(), CompanyRepositoryError> {
        let body = serde_json::to_value(update).map_err(|error| {
            CompanyRepositoryError::query(format!("failed to encode profile: {error}"))
        })?;
        self.client
            .put::<Value>(&format!("/companies/{id}"), Some(body), RequestOptions::default())
            .await
            .map_err(|error| map_error(&error))?;
        invalidate_reads(&self.client);
        Ok(())
    }
}
