use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

use super::support::{request, TestApp, PASSWORD};

#[tokio::test]
async fn test_register_returns_created_profile() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/v1/auth/register",
            None,
            json!({ "email": "coach@example.com", "password": PASSWORD, "name": "Coach", "role": "trainer" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Registration successful");
    assert_eq!(body["data"]["email"], "coach@example.com");
    assert_eq!(body["data"]["role"], "trainer");
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/v1/auth/register",
            None,
            json!({ "email": "weak@example.com", "password": "short", "name": "Weak" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_register_twice_conflicts() {
    let app = TestApp::new();
    app.register("twice@example.com", "trainee").await;

    let (status, body) = app
        .post(
            "/api/v1/auth/register",
            None,
            json!({ "email": "twice@example.com", "password": PASSWORD, "name": "Again" }),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_malformed_body_is_invalid_input() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let app = TestApp::new();
    app.register("cookie@example.com", "trainee").await;

    let response = tower::ServiceExt::oneshot(
        app.router.clone(),
        request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "cookie@example.com", "password": PASSWORD })),
        ),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("auth_token="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = TestApp::new();
    app.register("wrong@example.com", "trainee").await;

    let (status, body) = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "username": "wrong@example.com", "password": "Nope12345" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_me_accepts_bearer_and_cookie() {
    let app = TestApp::new();
    let (id, token) = app.sign_in("me@example.com", "trainee").await;

    let (status, body) = app.get("/api/v1/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.as_str());

    let request = Request::builder()
        .uri("/api/v1/auth/me")
        .header(header::COOKIE, format!("auth_token={}", token))
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "me@example.com");
}

#[tokio::test]
async fn test_me_without_token_is_unauthorized() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/v1/auth/me", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_logout_revokes_the_token() {
    let app = TestApp::new();
    let (_, token) = app.sign_in("bye@example.com", "trainee").await;

    let (status, body) = app.post("/api/v1/auth/logout", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successful");

    let (status, _) = app.get("/api/v1/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_issues_a_new_session() {
    let app = TestApp::new();
    app.register("again@example.com", "trainee").await;
    let (_, login) = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "username": "again@example.com", "password": PASSWORD }),
        )
        .await;
    let refresh_token = login["data"]["refreshToken"].as_str().unwrap();

    let (status, body) = app
        .post("/api/v1/auth/refresh", None, json!({ "refreshToken": refresh_token }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());

    // Refresh tokens are single use
    let (status, _) = app
        .post("/api/v1/auth/refresh", None, json!({ "refreshToken": refresh_token }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();

    let (status, _) = app.get("/api/v1/nothing-here", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
