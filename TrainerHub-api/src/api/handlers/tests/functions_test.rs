use axum::http::StatusCode;
use serde_json::json;

use super::support::{TestApp, PASSWORD};

#[tokio::test]
async fn test_function_health_is_public() {
    let app = TestApp::new();

    let (status, body) = app.get("/functions/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_signup_returns_user() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/functions/signup",
            None,
            json!({ "email": "fn@example.com", "password": PASSWORD, "name": "Fn" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "fn@example.com");
}

#[tokio::test]
async fn test_signup_rejection_uses_error_body() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/functions/signup",
            None,
            json!({ "email": "fn@example.com", "password": "weak", "name": "Fn" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(body.get("success").is_none());
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app.get("/functions/schedule/u1", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized - No token provided");
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app.get("/functions/workouts/u1", Some("not-a-token")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_day_schedule_is_replaced_for_same_date() {
    let app = TestApp::new();
    let (id, token) = app.sign_in("days@example.com", "trainee").await;

    for time in ["08:00", "17:00"] {
        let (status, body) = app
            .post(
                "/functions/schedule",
                Some(&token),
                json!({ "userId": id, "date": "2024-06-01", "time": time, "exercises": ["squat"] }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));
    }
    app.post(
        "/functions/schedule",
        Some(&token),
        json!({ "userId": id, "date": "2024-05-30", "exercises": [] }),
    )
    .await;

    let (status, body) = app.get(&format!("/functions/schedule/{}", id), Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    let schedules = body["schedules"].as_array().unwrap();
    assert_eq!(schedules.len(), 2);
    assert_eq!(schedules[0]["date"], "2024-05-30");
    assert_eq!(schedules[1]["time"], "17:00");
}

#[tokio::test]
async fn test_workouts_round_trip() {
    let app = TestApp::new();
    let (id, token) = app.sign_in("lifts@example.com", "trainee").await;

    let (status, _) = app
        .post(
            "/functions/workouts",
            Some(&token),
            json!({ "userId": id, "date": "2024-06-02", "exercises": [{ "name": "deadlift", "sets": 3 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get(&format!("/functions/workouts/{}", id), Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["workouts"][0]["exercises"][0]["name"], "deadlift");
}

#[tokio::test]
async fn test_session_card_without_user_is_bad_request() {
    let app = TestApp::new();
    let (_, token) = app.sign_in("cards@example.com", "trainee").await;

    let (status, body) = app
        .post(
            "/functions/session-cards",
            Some(&token),
            json!({ "userId": "", "date": "2024-06-03" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("userId"));
}

#[tokio::test]
async fn test_trainee_cannot_read_another_users_records() {
    let app = TestApp::new();
    let (_, token) = app.sign_in("nosy@example.com", "trainee").await;
    let other = app.register("private@example.com", "trainee").await;

    let (status, body) = app.get(&format!("/functions/session-cards/{}", other), Some(&token)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");
}

#[tokio::test]
async fn test_trainer_can_read_trainee_records() {
    let app = TestApp::new();
    let (trainee, trainee_token) = app.sign_in("athlete@example.com", "trainee").await;
    let (_, trainer_token) = app.sign_in("reader@example.com", "trainer").await;

    app.post(
        "/functions/session-cards",
        Some(&trainee_token),
        json!({ "userId": trainee, "date": "2024-06-04", "summary": "Felt strong" }),
    )
    .await;

    let (status, body) = app
        .get(&format!("/functions/session-cards/{}", trainee), Some(&trainer_token))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cards"][0]["summary"], "Felt strong");
}

#[tokio::test]
async fn test_malformed_body_uses_error_body() {
    let app = TestApp::new();
    let (_, token) = app.sign_in("broken@example.com", "trainee").await;

    let (status, body) = app.post("/functions/workouts", Some(&token), json!("just a string")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}
