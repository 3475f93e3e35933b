//! Email and password accounts backed by the managed identity provider.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::ports::{AuthenticatedUser, IdentityProvider, IdentityProviderError};
use crate::domain::{Error, SessionStore, UserType};

/// Signs users in and out through an [`IdentityProvider`].
pub struct AuthService<P> {
    provider: Arc<P>,
    session: SessionStore,
}

impl<P> AuthService<P> {
    /// Create the service.
    pub fn new(provider: Arc<P>, session: SessionStore) -> Self {
        Self { provider, session }
    }

    /// Forget tokens and identity.
    pub fn sign_out(&self) -> Result<(), Error> {
        self.session
            .clear()
            .map_err(|err| Error::internal(format!("failed to clear session: {err}")))
    }

    fn record_session(&self, user: &AuthenticatedUser) -> Result<(), Error> {
        let name = user.name.as_deref().unwrap_or_default();
        self.session
            .store_tokens(&user.tokens)
            .and_then(|()| {
                self.session
                    .sign_in(&user.user_id, name, &user.email, user.user_type)
            })
            .map_err(|err| Error::internal(format!("failed to write session: {err}")))
    }

    fn map_provider_error(error: IdentityProviderError) -> Error {
        match error {
            IdentityProviderError::InvalidCredentials => {
                Error::unauthorized("invalid email or password")
            }
            IdentityProviderError::EmailInUse { email } => {
                Error::conflict(format!("email {email} is already registered"))
            }
            IdentityProviderError::Rejected { message } => Error::invalid_request(message),
            IdentityProviderError::Unavailable { message } => {
                Error::service_unavailable(format!("identity service unavailable: {message}"))
            }
        }
    }
}

fn require_credentials(email: &str, password: &str) -> Result<(), Error> {
    if email.trim().is_empty() {
        return Err(Error::invalid_request("email is required"));
    }
    if password.is_empty() {
        return Err(Error::invalid_request("password is required"));
    }
    Ok(())
}

impl<P: IdentityProvider> AuthService<P> {
    /// Sign in and persist the returned tokens and identity.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthenticatedUser, Error> {
        require_credentials(email, password)?;
        let user = self
            .provider
            .sign_in(email.trim(), password)
            .await
            .map_err(|err| {
                error!(error = %err, "sign-in failed");
                Self::map_provider_error(err)
            })?;
        self.record_session(&user)?;
        info!(user_id = %user.user_id, "signed in");
        Ok(user)
    }

    /// Create an account of `user_type` and sign it in.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        user_type: UserType,
    ) -> Result<AuthenticatedUser, Error> {
        require_credentials(email, password)?;
        let user = self
            .provider
            .sign_up(email.trim(), password, user_type)
            .await
            .map_err(|err| {
                error!(error = %err, "sign-up failed");
                Self::map_provider_error(err)
            })?;
        self.record_session(&user)?;
        info!(user_id = %user.user_id, user_type = user_type.as_str(), "signed up");
        Ok(user)
    }

    /// Ask the provider to email a password reset link.
    pub async fn reset_password(&self, email: &str) -> Result<(), Error> {
        if email.trim().is_empty() {
            return Err(Error::invalid_request("email is required"));
        }
        self.provider
            .reset_password(email.trim())
            .await
            .map_err(Self::map_provider_error)
    }
}
