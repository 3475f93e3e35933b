//! Signed-in state kept in the local key-value store.

use std::sync::Arc;

use zeroize::Zeroize;

use super::ports::{KeyValueStore, KeyValueStoreError};
use super::{CompanyUser, Error, UserId, UserType};

/// Keys the session writes into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// Bearer token for API requests.
    AuthToken,
    /// Token exchanged for a fresh bearer token.
    RefreshToken,
    /// Signed-in account id.
    UserId,
    /// Signed-in display name.
    Name,
    /// Signed-in email.
    Email,
    /// [`UserType`] of the signed-in account.
    UserType,
    /// Device registration token for push notifications.
    PushToken,
}

impl SessionKey {
    /// Every key, in a stable order.
    pub const ALL: [Self; 7] = [
        Self::AuthToken,
        Self::RefreshToken,
        Self::UserId,
        Self::Name,
        Self::Email,
        Self::UserType,
        Self::PushToken,
    ];

    /// Storage key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthToken => "authToken",
            Self::RefreshToken => "refreshToken",
            Self::UserId => "userId",
            Self::Name => "name",
            Self::Email => "email",
            Self::UserType => "userType",
            Self::PushToken => "pushToken",
        }
    }
}

/// Access and refresh token pair, wiped from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthTokens {
    access_token: String,
    refresh_token: String,
}

impl AuthTokens {
    /// Pair a bearer token with its refresh token.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Bearer token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Refresh token.
    #[must_use]
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }
}

impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens").finish_non_exhaustive()
    }
}

impl Drop for AuthTokens {
    fn drop(&mut self) {
        self.access_token.zeroize();
        self.refresh_token.zeroize();
    }
}

/// Typed view over the session keys in a [`KeyValueStore`].
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Wrap `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read one session value.
    pub fn get(&self, key: SessionKey) -> Result<Option<String>, KeyValueStoreError> {
        self.store.get(key.as_str())
    }

    /// Write one session value.
    pub fn set(&self, key: SessionKey, value: &str) -> Result<(), KeyValueStoreError> {
        self.store.set(key.as_str(), value)
    }

    /// Delete one session value.
    pub fn remove(&self, key: SessionKey) -> Result<(), KeyValueStoreError> {
        self.store.remove(key.as_str())
    }

    /// Current bearer token.
    pub fn access_token(&self) -> Result<Option<String>, KeyValueStoreError> {
        self.get(SessionKey::AuthToken)
    }

    /// Persist a token pair.
    pub fn store_tokens(&self, tokens: &AuthTokens) -> Result<(), KeyValueStoreError> {
        self.set(SessionKey::AuthToken, tokens.access_token())?;
        self.set(SessionKey::RefreshToken, tokens.refresh_token())
    }

    /// Forget both tokens.
    pub fn clear_tokens(&self) -> Result<(), KeyValueStoreError> {
        self.remove(SessionKey::AuthToken)?;
        self.remove(SessionKey::RefreshToken)
    }

    /// Signed-in account id, if any. A malformed stored id reads as absent.
    pub fn user_id(&self) -> Result<Option<UserId>, KeyValueStoreError> {
        Ok(self
            .get(SessionKey::UserId)?
            .and_then(|raw| UserId::new(raw).ok()))
    }

    /// Signed-in account id, or an unauthorised error when signed out.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()
            .map_err(|err| Error::internal(format!("failed to read session: {err}")))?
            .ok_or_else(|| Error::unauthorized("user id not found"))
    }

    /// Signed-in display name, empty when unset.
    pub fn display_name(&self) -> Result<String, KeyValueStoreError> {
        Ok(self.get(SessionKey::Name)?.unwrap_or_default())
    }

    /// Signed-in account role.
    pub fn user_type(&self) -> Result<Option<UserType>, KeyValueStoreError> {
        Ok(self
            .get(SessionKey::UserType)?
            .as_deref()
            .and_then(UserType::parse))
    }

    /// Record a signed-in account.
    pub fn sign_in(
        &self,
        user_id: &UserId,
        name: &str,
        email: &str,
        user_type: UserType,
    ) -> Result<(), KeyValueStoreError> {
        self.set(SessionKey::UserId, user_id.as_str())?;
        self.set(SessionKey::Name, name)?;
        self.set(SessionKey::Email, email)?;
        self.set(SessionKey::UserType, user_type.as_str())
    }

    /// Record a signed-in company.
    pub fn sign_in_company(&self, company: &CompanyUser) -> Result<(), KeyValueStoreError> {
        self.sign_in(&company.id, &company.name, &company.email, UserType::Company)
    }

    /// Remove every session key.
    pub fn clear(&self) -> Result<(), KeyValueStoreError> {
        for key in SessionKey::ALL {
            self.remove(key)?;
        }
        Ok(())
    }
}
