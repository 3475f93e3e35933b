//! Port for the push notification provider.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by the push provider.
    pub enum PushMessagingError {
        /// The user declined notification permission.
        PermissionDenied => "notification permission denied",
        /// The provider failed.
        Provider { message: String } => "push provider failed: {message}",
    }
}

/// Device registration with the push provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushMessaging: Send + Sync {
    /// Ask for permission and return this device's registration token.
    async fn registration_token(&self) -> Result<String, PushMessagingError>;
}

/// Provider that hands out a fixed token, for local runs without push.
#[derive(Debug, Clone, Default)]
pub struct FixturePushMessaging {
    /// Token returned by [`PushMessaging::registration_token`].
    pub token: String,
}

#[async_trait]
impl PushMessaging for FixturePushMessaging {
    async fn registration_token(&self) -> Result<String, PushMessagingError> {
        if self.token.is_empty() {
            return Err(PushMessagingError::permission_denied());
        }
        Ok(self.token.clone())
    }
}
