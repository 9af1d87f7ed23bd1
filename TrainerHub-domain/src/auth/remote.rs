//! Identity provider backed by a GoTrue-compatible HTTP service

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::auth::identity::{normalize_email, IdentityError, IdentityProvider};
use crate::auth::UserInfo;
use crate::entities::{AuthSession, Role, SignUpRequest, User};

/// Connection settings for the remote identity service
#[derive(Debug, Clone)]
pub struct RemoteIdentityConfig {
    /// Base URL, e.g. `https://project.example.co`
    pub url: String,
    /// Project key sent in the `apikey` header
    pub api_key: String,
    pub timeout: Duration,
}

pub struct RemoteIdentityProvider {
    client: Client,
    config: RemoteIdentityConfig,
}

#[derive(Debug, Deserialize)]
struct RemoteUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    user_metadata: Value,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl RemoteUser {
    fn metadata_str(&self, key: &str) -> Option<String> {
        self.user_metadata
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn role(&self) -> Role {
        self.metadata_str("role")
            .and_then(|r| r.parse().ok())
            .unwrap_or_default()
    }

    fn into_user(self) -> User {
        let role = self.role();
        let email = self.email.clone().unwrap_or_default();
        let name = self
            .metadata_str("name")
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
        let phone_number = self.metadata_str("phone_number").or(self.phone.clone());

        User {
            id: self.id,
            email,
            name,
            role,
            phone_number: phone_number.filter(|p| !p.is_empty()),
            profile_image: None,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RemoteSession {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: i64,
    user: RemoteUser,
}

impl RemoteSession {
    fn into_session(self) -> AuthSession {
        AuthSession {
            user: self.user.into_user(),
            token: self.access_token,
            refresh_token: self.refresh_token,
            expires_in: self.expires_in,
        }
    }
}

/// Sign-up answers with either a bare user or a session containing one
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(RemoteSession),
    User(RemoteUser),
}

impl RemoteIdentityProvider {
    pub fn new(config: RemoteIdentityConfig) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IdentityError::Upstream(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.url.trim_end_matches('/'), path)
    }

    fn with_key(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.config.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, IdentityError> {
        self.with_key(request).send().await.map_err(|e| {
            warn!("Identity service unreachable: {}", e);
            IdentityError::Upstream(e.to_string())
        })
    }

    /// Read the message out of an error body
    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        ["msg", "error_description", "message", "error"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string())
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, IdentityError> {
        response
            .json::<T>()
            .await
            .map_err(|e| IdentityError::Upstream(format!("Unexpected identity response: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentityProvider {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<User, IdentityError> {
        let email = normalize_email(&request.email);
        let body = json!({
            "email": email,
            "password": request.password,
            "data": {
                "name": request.name,
                "role": request.role,
                "phone_number": request.phone_number,
            }
        });

        let response = self.send(self.client.post(self.endpoint("signup")).json(&body)).await?;
        let status = response.status();

        if status.is_success() {
            let user = match Self::parse::<SignUpResponse>(response).await? {
                SignUpResponse::Session(session) => session.user.into_user(),
                SignUpResponse::User(user) => user.into_user(),
            };
            debug!("Remote sign-up created {}", user.id);
            return Ok(user);
        }

        let message = Self::error_message(response).await;
        if status == StatusCode::UNPROCESSABLE_ENTITY && message.to_lowercase().contains("already") {
            Err(IdentityError::EmailTaken(email))
        } else if status.is_client_error() {
            Err(IdentityError::Rejected(message))
        } else {
            Err(IdentityError::Upstream(message))
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError> {
        let body = json!({ "email": normalize_email(email), "password": password });
        let request = self
            .client
            .post(self.endpoint("token"))
            .query(&[("grant_type", "password")])
            .json(&body);

        let response = self.send(request).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(Self::parse::<RemoteSession>(response).await?.into_session());
        }

        let message = Self::error_message(response).await;
        if status.is_client_error() {
            debug!("Remote sign-in rejected: {}", message);
            Err(IdentityError::InvalidCredentials)
        } else {
            Err(IdentityError::Upstream(message))
        }
    }

    async fn get_user(&self, token: &str) -> Result<UserInfo, IdentityError> {
        let response = self
            .send(self.client.get(self.endpoint("user")).bearer_auth(token))
            .await?;
        let status = response.status();

        if status.is_success() {
            let user = Self::parse::<RemoteUser>(response).await?.into_user();
            return Ok(UserInfo {
                user_id: user.id,
                email: user.email,
                name: Some(user.name),
                role: user.role,
                auth_source: self.name().to_string(),
            });
        }

        let message = Self::error_message(response).await;
        if status.is_client_error() {
            Err(IdentityError::InvalidToken(message))
        } else {
            Err(IdentityError::Upstream(message))
        }
    }

    async fn sign_out(&self, token: &str) -> Result<(), IdentityError> {
        let response = self
            .send(self.client.post(self.endpoint("logout")).bearer_auth(token))
            .await?;
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        let message = Self::error_message(response).await;
        if status.is_client_error() {
            Err(IdentityError::InvalidToken(message))
        } else {
            Err(IdentityError::Upstream(message))
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, IdentityError> {
        let request = self
            .client
            .post(self.endpoint("token"))
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }));

        let response = self.send(request).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(Self::parse::<RemoteSession>(response).await?.into_session());
        }

        let message = Self::error_message(response).await;
        if status.is_client_error() {
            Err(IdentityError::InvalidToken(message))
        } else {
            Err(IdentityError::Upstream(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> RemoteIdentityProvider {
        RemoteIdentityProvider::new(RemoteIdentityConfig {
            url: server.uri(),
            api_key: "anon-key".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn remote_user() -> Value {
        json!({
            "id": "9b1c",
            "email": "kim@example.com",
            "user_metadata": { "name": "Kim", "role": "trainer" },
            "created_at": "2024-02-01T09:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_sign_in_uses_password_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", "anon-key"))
            .and(body_partial_json(json!({ "email": "kim@example.com" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at",
                "refresh_token": "rt",
                "expires_in": 3600,
                "token_type": "bearer",
                "user": remote_user()
            })))
            .mount(&server)
            .await;

        let session = provider(&server).sign_in("Kim@example.com", "pw").await.unwrap();
        assert_eq!(session.token, "at");
        assert_eq!(session.refresh_token, "rt");
        assert_eq!(session.user.role, Role::Trainer);
        assert_eq!(session.user.name, "Kim");
    }

    #[tokio::test]
    async fn test_sign_in_rejection_is_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let result = provider(&server).sign_in("kim@example.com", "bad").await;
        assert!(matches!(result, Err(IdentityError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_get_user_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer good-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(remote_user()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "msg": "invalid JWT" })))
            .mount(&server)
            .await;

        let provider = provider(&server);
        let info = provider.get_user("good-token").await.unwrap();
        assert_eq!(info.user_id, "9b1c");
        assert_eq!(info.role, Role::Trainer);
        assert_eq!(info.auth_source, "remote");

        match provider.get_user("bad-token").await {
            Err(IdentityError::InvalidToken(msg)) => assert_eq!(msg, "invalid JWT"),
            other => panic!("expected invalid token, got {:?}", other.map(|i| i.user_id)),
        }
    }

    #[tokio::test]
    async fn test_sign_up_existing_email_is_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "msg": "User already registered"
            })))
            .mount(&server)
            .await;

        let request = SignUpRequest {
            email: "kim@example.com".to_string(),
            password: "Passw0rdOk".to_string(),
            name: "Kim".to_string(),
            role: Role::Trainee,
            phone_number: None,
        };
        let result = provider(&server).sign_up(&request).await;
        assert!(matches!(result, Err(IdentityError::EmailTaken(_))));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_upstream_error() {
        let provider = RemoteIdentityProvider::new(RemoteIdentityConfig {
            url: "http://127.0.0.1:9".to_string(),
            api_key: "k".to_string(),
            timeout: Duration::from_millis(500),
        })
        .unwrap();

        assert!(matches!(provider.get_user("t").await, Err(IdentityError::Upstream(_))));
    }
}
