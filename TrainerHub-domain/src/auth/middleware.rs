//! Request authentication middleware

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::identity::SharedIdentityProvider;
use crate::auth::logging::{log_auth_event, AuthEvent, AuthEventType};
use crate::auth::{AccessToken, AUTH_COOKIE};
use crate::errors::ServiceError;

/// Token from the `auth_token` cookie, falling back to `Authorization: Bearer`
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    cookie_token(headers).or_else(|| bearer_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn token_event(user_id: Option<&str>, success: bool, details: impl Into<String>, path: &str, started: Instant) -> AuthEvent {
    AuthEvent::new(AuthEventType::TokenValidation, user_id, success)
        .with_details(details)
        .at_path(path)
        .with_elapsed(started.elapsed().as_millis() as u64)
        .via("identity")
}

/// Reject requests without a valid access token
///
/// On success the request carries `UserInfo` and `AccessToken` extensions.
pub async fn auth_middleware(
    State(identity): State<SharedIdentityProvider>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();
    let path = req.uri().path().to_string();

    let Some(token) = extract_token(req.headers()) else {
        debug!("No credentials on request to {}", path);
        log_auth_event(token_event(None, false, "Missing access token", &path, started));
        return ServiceError::Unauthorized("Authentication required".to_string()).into_response();
    };

    match identity.get_user(&token).await {
        Ok(user) => {
            log_auth_event(token_event(Some(&user.user_id), true, "Token accepted", &path, started));
            req.extensions_mut().insert(user);
            req.extensions_mut().insert(AccessToken(token));
            next.run(req).await
        }
        Err(e) => {
            warn!("Rejected token on {}: {}", path, e);
            log_auth_event(token_event(None, false, e.to_string(), &path, started));
            ServiceError::Unauthorized("Invalid or expired token".to_string()).into_response()
        }
    }
}

/// Attach the caller when a valid token is present, never reject
pub async fn optional_auth(
    State(identity): State<SharedIdentityProvider>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(req.headers()) {
        match identity.get_user(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
                req.extensions_mut().insert(AccessToken(token));
            }
            Err(e) => debug!("Ignoring invalid optional token: {}", e),
        }
    }
    next.run(req).await
}

/// Bearer check for the function endpoints, which answer with `{ "error": ... }`
pub async fn function_auth(
    State(identity): State<SharedIdentityProvider>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(req.headers()) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized - No token provided" })),
        )
            .into_response();
    };

    match identity.get_user(&token).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            req.extensions_mut().insert(AccessToken(token));
            next.run(req).await
        }
        Err(e) => {
            warn!("Authorization error on {}: {}", req.uri().path(), e);
            (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response()
        }
    }
}
