use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use tracing::{info, instrument};
use trainer_hub_domain::auth::{AccessToken, UserInfo, AUTH_COOKIE};
use trainer_hub_domain::entities::{AuthSession, LoginRequest, RefreshRequest, SignUpRequest, User};
use trainer_hub_domain::errors::{ErrorEnvelope, ServiceError};

use crate::api::extract::JsonBody;
use crate::api::handlers::HandlerResult;
use crate::api::state::AppState;
use crate::entities::common::ApiResponse;

/// `Set-Cookie` value carrying the access token
fn session_cookie(token: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        AUTH_COOKIE, token, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn expired_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// Create an account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid email or weak password", body = ErrorEnvelope),
        (status = 409, description = "Email already registered", body = ErrorEnvelope),
    ),
    tag = "auth"
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SignUpRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state.auth.register(request).await?;
    info!("Registered user {}", user.id);
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(user).with_message("Registration successful"),
    ))
}

/// Sign in with email and password
///
/// The access token is returned in the body and also set as an HttpOnly `auth_token` cookie.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthSession),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelope),
        (status = 422, description = "Missing username or password", body = ErrorEnvelope),
    ),
    tag = "auth"
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Response, ServiceError> {
    let session = state.auth.login(request).await?;
    let cookie = session_cookie(&session.token, session.expires_in, state.secure_cookies);

    Ok((
        [(header::SET_COOKIE, cookie)],
        ApiResponse::ok(session).with_message("Login successful"),
    )
        .into_response())
}

/// Exchange a refresh token for a new session
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New session issued", body = AuthSession),
        (status = 401, description = "Refresh token rejected", body = ErrorEnvelope),
    ),
    tag = "auth"
)]
#[instrument(skip(state, request))]
pub async fn refresh(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RefreshRequest>,
) -> Result<Response, ServiceError> {
    let session = state.auth.refresh(request).await?;
    let cookie = session_cookie(&session.token, session.expires_in, state.secure_cookies);

    Ok(([(header::SET_COOKIE, cookie)], ApiResponse::ok(session)).into_response())
}

/// Revoke the presented token and clear the session cookie
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Signed out"),
        (status = 401, description = "Not authenticated", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "auth"
)]
#[instrument(skip(state, user, token), fields(user_id = %user.user_id))]
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Extension(AccessToken(token)): Extension<AccessToken>,
) -> Result<Response, ServiceError> {
    state.auth.logout(&user, &token).await?;

    Ok((
        [(header::SET_COOKIE, expired_cookie(state.secure_cookies))],
        ApiResponse::message("Logout successful"),
    )
        .into_response())
}

/// Profile of the signed-in user
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "auth"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn me(State(state): State<AppState>, Extension(user): Extension<UserInfo>) -> HandlerResult<User> {
    Ok(ApiResponse::ok(state.auth.me(&user).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc", 900, false);
        assert_eq!(cookie, "auth_token=abc; HttpOnly; Path=/; SameSite=Lax; Max-Age=900");
        assert!(session_cookie("abc", 900, true).ends_with("; Secure"));
        assert!(expired_cookie(false).contains("Max-Age=0"));
    }
}
