//! Company account lifecycle: signup, login, profile edits, logout.
//!
//! Company accounts predate the managed identity provider and still keep
//! their password alongside the profile record. Logging in compares that
//! stored value directly.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::cache::{CacheNamespace, TtlCache};
use crate::domain::ports::{CompanyRepository, CompanyRepositoryError};
use crate::domain::{
    CompanyLogin, CompanyProfileUpdate, CompanySignup, CompanyUser, CompanyValidationError,
    Error, SessionKey, SessionStore,
};

/// Manages company accounts and the company session.
pub struct CompanyAccountsService<R> {
    repository: Arc<R>,
    session: SessionStore,
    cache: TtlCache,
}

impl<R> CompanyAccountsService<R> {
    /// Create the service.
    pub fn new(repository: Arc<R>, session: SessionStore, cache: TtlCache) -> Self {
        Self {
            repository,
            session,
            cache,
        }
    }

    /// Forget the session and drop cached job and API data.
    pub fn log_out(&self) -> Result<(), Error> {
        self.session
            .clear()
            .map_err(|err| Error::internal(format!("failed to clear session: {err}")))?;
        for namespace in [CacheNamespace::JOBS, CacheNamespace::API] {
            self.cache
                .clear_namespace(&namespace)
                .map_err(|err| Error::internal(format!("failed to clear {namespace} cache: {err}")))?;
        }
        info!("company logged out");
        Ok(())
    }

    fn map_validation_error(error: CompanyValidationError) -> Error {
        Error::invalid_request(error.to_string())
    }

    fn map_repository_error(error: CompanyRepositoryError) -> Error {
        match error {
            CompanyRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("company repository unavailable: {message}"))
            }
            CompanyRepositoryError::Query { message } => {
                Error::internal(format!("company repository error: {message}"))
            }
        }
    }
}

impl<R: CompanyRepository> CompanyAccountsService<R> {
    /// Register a company. The email must not already be in use.
    pub async fn sign_up(&self, form: &CompanySignup) -> Result<CompanyUser, Error> {
        form.validate().map_err(Self::map_validation_error)?;
        if self.find_by_email(&form.email).await?.is_some() {
            return Err(Error::conflict("email is already registered"));
        }
        let company = self
            .repository
            .create(form)
            .await
            .map_err(|err| {
                error!(error = %err, "company signup failed");
                Self::map_repository_error(err)
            })?;
        info!(company_id = %company.id, "company registered");
        Ok(company)
    }

    /// Check credentials and record the company session.
    pub async fn log_in(&self, form: &CompanyLogin) -> Result<CompanyUser, Error> {
        form.validate().map_err(Self::map_validation_error)?;
        let company = self
            .find_by_email(&form.email)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))?;
        if company.password.expose() != form.password.expose() {
            return Err(Error::unauthorized("incorrect password"));
        }

        self.session
            .sign_in_company(&company)
            .map_err(|err| Error::internal(format!("failed to write session: {err}")))?;
        info!(company_id = %company.id, "company logged in");
        Ok(company)
    }

    /// Load the signed-in company's account.
    pub async fn fetch_profile(&self) -> Result<CompanyUser, Error> {
        let email = self
            .session
            .get(SessionKey::Email)
            .map_err(|err| Error::internal(format!("failed to read session: {err}")))?
            .ok_or_else(|| Error::unauthorized("email not found"))?;
        self.find_by_email(&email)
            .await?
            .ok_or_else(|| Error::not_found("company profile not found"))
    }

    /// Save profile changes and refresh the session's name and email.
    pub async fn edit_profile(&self, update: &CompanyProfileUpdate) -> Result<(), Error> {
        update.validate().map_err(Self::map_validation_error)?;
        let company_id = self.session.require_user_id()?;
        self.repository
            .update_profile(&company_id, update)
            .await
            .map_err(|err| {
                error!(error = %err, %company_id, "company profile update failed");
                Self::map_repository_error(err)
            })?;

        let write = |key, value: &str| {
            self.session
                .set(key, value)
                .map_err(|err| Error::internal(format!("failed to write session: {err}")))
        };
        write(SessionKey::Name, &update.name)?;
        write(SessionKey::Email, &update.email)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CompanyUser>, Error> {
        self.repository
            .find_by_email(email)
            .await
            .map_err(Self::map_repository_error)
    }
}

#[cfg(test)]
#[path = "company_accounts_tests.rs"]
mod tests;
