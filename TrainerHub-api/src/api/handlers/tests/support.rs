//! Router harness shared by the handler tests

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use trainer_hub_data::repository::{InMemoryKvStore, SharedKvStore};
use trainer_hub_domain::auth::{LocalIdentityProvider, TokenConfig, TokenManager};
use trainer_hub_domain::health::HealthServiceTrait;
use trainer_hub_domain::repositories::Repositories;

use crate::api::routes::create_app;
use crate::api::state::AppState;
use crate::config::AppConfig;

pub const PASSWORD: &str = "Passw0rdOk";

/// Application over a fresh in-memory store
pub struct TestApp {
    pub router: Router,
    pub repos: Repositories,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_health(health: Arc<dyn HealthServiceTrait>) -> Self {
        Self::build(Some(health))
    }

    fn build(health: Option<Arc<dyn HealthServiceTrait>>) -> Self {
        let store: SharedKvStore = Arc::new(InMemoryKvStore::new());
        let tokens = TokenManager::new(TokenConfig::new("test-secret-for-handlers"));
        let identity = Arc::new(LocalIdentityProvider::new(store.clone(), tokens).with_bcrypt_cost(4));

        let mut state = AppState::new(store.clone(), identity);
        if let Some(health) = health {
            state = state.with_health(health);
        }

        Self {
            router: create_app(state, &AppConfig::default()),
            repos: Repositories::new(store),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::POST, uri, token, Some(body))).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::PUT, uri, token, None)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::PATCH, uri, token, Some(body))).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, token, None)).await
    }

    /// Register an account and return its id
    pub async fn register(&self, email: &str, role: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/auth/register",
                None,
                json!({ "email": email, "password": PASSWORD, "name": email, "role": role }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Log in and return the access token
    pub async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/auth/login",
                None,
                json!({ "username": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Register and log in, returning `(user_id, token)`
    pub async fn sign_in(&self, email: &str, role: &str) -> (String, String) {
        let id = self.register(email, role).await;
        let token = self.login(email).await;
        (id, token)
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
