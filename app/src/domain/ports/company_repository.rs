//! Port abstraction for company account persistence.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{CompanyProfileUpdate, CompanySignup, CompanyUser, UserId};

define_port_error! {
    /// Errors raised when reading or writing company accounts.
    pub enum CompanyRepositoryError {
        /// Backend could not be reached.
        Connection { message: String } => "company repository connection failed: {message}",
        /// The backend rejected or failed the operation.
        Query { message: String } => "company repository query failed: {message}",
    }
}

/// Company account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Account registered with `email`, if any.
    async fn find_by_email(&self, email: &str)
    -> Result<Option<CompanyUser>, CompanyRepositoryError>;

    /// Account with `id`, if any.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<CompanyUser>, CompanyRepositoryError>;

    /// Register a new account.
    async fn create(&self, signup: &CompanySignup) -> Result<CompanyUser, CompanyRepositoryError>;

    /// Overwrite the editable profile fields.
    async fn update_profile(
        &self,
        id: &UserId,
        update: &CompanyProfileUpdate,
    ) -> Result<(), CompanyRepositoryError>;
}
