use serde_json::json;
use trainer_hub_domain::entities::{AuthSession, LoginRequest, RefreshRequest, SignUpRequest, User};

use crate::client::ApiClient;
use crate::error::ApiResult;

/// Sign-in and account endpoints under `/auth`
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Sign in and keep the access token for later calls
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<AuthSession> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let session: AuthSession = self.client.post("/auth/login", &request).await?;
        self.client.set_auth_token(session.token.clone());
        Ok(session)
    }

    /// Revoke the session; the local token is dropped even when the call fails
    pub async fn logout(&self) -> ApiResult<()> {
        let result = self.client.post("/auth/logout", &json!({})).await;
        self.client.clear_auth_token();
        result
    }

    pub async fn register(&self, request: &SignUpRequest) -> ApiResult<User> {
        self.client.post("/auth/register", request).await
    }

    pub async fn me(&self) -> ApiResult<User> {
        self.client.get("/auth/me").await
    }

    pub async fn refresh(&self, refresh_token: &str) -> ApiResult<AuthSession> {
        let request = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let session: AuthSession = self.client.post("/auth/refresh", &request).await?;
        self.client.set_auth_token(session.token.clone());
        Ok(session)
    }
}
