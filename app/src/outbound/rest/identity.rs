//! `/auth` endpoints for email and password accounts.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::is_unreachable;
use crate::domain::ports::{AuthenticatedUser, IdentityProvider, IdentityProviderError};
use crate::domain::{ApiClient, ApiError, AuthTokens, RequestOptions, UserId, UserType};

/// Identity provider backed by the REST API's auth endpoints.
pub struct RestIdentityProvider {
    client: Arc<ApiClient>,
}

impl RestIdentityProvider {
    /// Wrap a shared client.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    async fn authenticate(
        &self,
        path: &str,
        body: Value,
        email: &str,
    ) -> Result<AuthenticatedUser, IdentityProviderError> {
        let response: AuthResponse = self
            .client
            .post(path, Some(body), auth_options())
            .await
            .map_err(|error| map_error(&error, email))?;
        response.into_user()
    }
}

/// Auth calls never carry a bearer token and are not retried on 4xx.
fn auth_options() -> RequestOptions {
    RequestOptions::default().without_auth().without_cache()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    user_id: String,
    #[serde(default)]
    name: Option<String>,
    email: String,
    user_type: String,
    access_token: String,
    refresh_token: String,
}

impl AuthResponse {
    fn into_user(self) -> Result<AuthenticatedUser, IdentityProviderError> {
        let user_id = UserId::new(self.user_id)
            .map_err(|error| IdentityProviderError::rejected(format!("invalid user id: {error}")))?;
        let user_type = UserType::parse(&self.user_type).ok_or_else(|| {
            IdentityProviderError::rejected(format!("unknown user type {}", self.user_type))
        })?;
        Ok(AuthenticatedUser {
            user_id,
            name: self.name,
            email: self.email,
            user_type,
            tokens: AuthTokens::new(self.access_token, self.refresh_token),
        })
    }
}

fn map_error(error: &ApiError, email: &str) -> IdentityProviderError {
    match error.status() {
        Some(400 | 401 | 404) if error.code() != Some("weak_password") => {
            IdentityProviderError::invalid_credentials()
        }
        Some(409) => IdentityProviderError::email_in_use(email),
        Some(status) if (400..500).contains(&status) => {
            IdentityProviderError::rejected(error.message())
        }
        _ if is_unreachable(error) => IdentityProviderError::unavailable(error.to_string()),
        _ => IdentityProviderError::unavailable(error.message()),
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, IdentityProviderError> {
        self.authenticate(
            "/auth/login",
            json!({ "email": email, "password": password }),
            email,
        )
        .await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        user_type: UserType,
    ) -> Result<AuthenticatedUser, IdentityProviderError> {
        self.authenticate(
            "/auth/signup",
            json!({ "email": email, "password": password, "userType": user_type.as_str() }),
            email,
        )
        .await
    }

    async fn reset_password(&self, email: &str) -> Result<(), IdentityProviderError> {
        self.client
            .post::<Value>(
                "/auth/reset-password",
                Some(json!({ "email": email })),
                auth_options(),
            )
            .await
            .map_err(|error| map_error(&error, email))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::ApiTransportError;
    use crate::outbound::storage::MemoryKeyValueStore;
    use crate::test_support::{ScriptedTransport, instant_api_client};

    fn provider(transport: &Arc<ScriptedTransport>) -> RestIdentityProvider {
        let store = Arc::new(MemoryKeyValueStore::default());
        RestIdentityProvider::new(Arc::new(instant_api_client(transport.clone(), store)))
    }

    #[rstest]
    #[tokio::test]
    async fn login_decodes_identity_and_tokens() {
        let transport = Arc::new(ScriptedTransport::new(vec![ScriptedTransport::reply(
            200,
            json!({
                "userId": "seeker-1",
                "email": "sam@example.com",
                "userType": "jobseeker",
                "accessToken": "a",
                "refreshToken": "r"
            }),
        )]));

        let user = provider(&transport)
            .sign_in("sam@example.com", "hunter22")
            .await
            .expect("sign in");

        assert_eq!(user.user_id.as_str(), "seeker-1");
        assert_eq!(user.user_type, UserType::Jobseeker);
        assert_eq!(user.tokens.refresh_token(), "r");
        assert_eq!(transport.requests()[0].bearer_token, None);
        assert_eq!(transport.requests()[0].path, "/auth/login");
    }

    #[rstest]
    #[case(401, json!({"message": "bad credentials"}), IdentityProviderError::invalid_credentials())]
    #[case(409, json!({"message": "taken"}), IdentityProviderError::email_in_use("sam@example.com"))]
    #[case(400, json!({"message": "too short", "code": "weak_password"}), IdentityProviderError::rejected("too short"))]
    #[case(422, json!({"message": "bad email"}), IdentityProviderError::rejected("bad email"))]
    #[tokio::test]
    async fn client_errors_map_to_identity_errors(
        #[case] status: u16,
        #[case] body: Value,
        #[case] expected: IdentityProviderError,
    ) {
        let transport = Arc::new(ScriptedTransport::new(vec![ScriptedTransport::reply(
            status, body,
        )]));

        let err = provider(&transport)
            .sign_up("sam@example.com", "pw", UserType::Company)
            .await
            .expect_err("rejected");

        assert_eq!(err, expected);
        assert_eq!(transport.calls(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn outages_are_unavailable() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(ApiTransportError::timeout("slow")),
            Err(ApiTransportError::timeout("slow")),
            Err(ApiTransportError::timeout("slow")),
            Err(ApiTransportError::timeout("slow")),
        ]));

        let err = provider(&transport)
            .reset_password("sam@example.com")
            .await
            .expect_err("down");
        assert!(matches!(err, IdentityProviderError::Unavailable { .. }));
        assert_eq!(transport.calls(), 4);
    }
}
