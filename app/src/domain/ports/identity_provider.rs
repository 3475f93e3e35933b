//! Port for the managed email-and-password identity service.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{AuthTokens, UserId, UserType};

define_port_error! {
    /// Errors raised by the identity service.
    pub enum IdentityProviderError {
        /// Email and password do not match an account.
        InvalidCredentials => "invalid email or password",
        /// The email is already registered.
        EmailInUse { email: String } => "email {email} is already registered",
        /// The service rejected the request for another reason.
        Rejected { message: String } => "identity request rejected: {message}",
        /// The service could not be reached.
        Unavailable { message: String } => "identity service unavailable: {message}",
    }
}

/// Result of a successful sign-in or sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Account id.
    pub user_id: UserId,
    /// Display name, when the service knows one.
    pub name: Option<String>,
    /// Sign-in email.
    pub email: String,
    /// Account role; job-seeker when the profile does not say.
    pub user_type: UserType,
    /// API tokens for the new session.
    pub tokens: AuthTokens,
}

/// Managed identity service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange credentials for a session.
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, IdentityProviderError>;

    /// Register an account and start a session.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        user_type: UserType,
    ) -> Result<AuthenticatedUser, IdentityProviderError>;

    /// Send a password reset email.
    async fn reset_password(&self, email: &str) -> Result<(), IdentityProviderError>;
}
