use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use super::support::TestApp;

/// Trainer with one trainee on the roster: `(trainer_token, trainee_id, trainee_token)`
async fn trainer_with_client(app: &TestApp) -> (String, String, String) {
    let (_, trainer_token) = app.sign_in("coach@example.com", "trainer").await;
    let (trainee_id, trainee_token) = app.sign_in("client@example.com", "trainee").await;

    let (status, body) = app
        .post(
            "/api/v1/trainer/clients",
            Some(&trainer_token),
            json!({ "email": "client@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "adding client failed: {}", body);

    (trainer_token, trainee_id, trainee_token)
}

#[tokio::test]
async fn test_trainee_cannot_use_trainer_routes() {
    let app = TestApp::new();
    let (_, token) = app.sign_in("nope@example.com", "trainee").await;

    let (status, body) = app.get("/api/v1/trainer/clients", Some(&token)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_add_client_and_list_roster() {
    let app = TestApp::new();
    let (token, trainee_id, _) = trainer_with_client(&app).await;

    let (status, body) = app.get("/api/v1/trainer/clients", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let clients = body["data"].as_array().unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0]["profile"]["id"], trainee_id.as_str());

    let (status, body) = app
        .post(
            "/api/v1/trainer/clients",
            Some(&token),
            json!({ "email": "client@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_add_unknown_client_is_not_found() {
    let app = TestApp::new();
    let (_, token) = app.sign_in("lonely@example.com", "trainer").await;

    let (status, _) = app
        .post(
            "/api/v1/trainer/clients",
            Some(&token),
            json!({ "email": "ghost@example.com" }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_schedule_lifecycle() {
    let app = TestApp::new();
    let (token, trainee_id, trainee_token) = trainer_with_client(&app).await;
    let date = Utc::now().date_naive() + Duration::days(2);

    let (status, body) = app
        .post(
            "/api/v1/trainer/schedules",
            Some(&token),
            json!({
                "traineeId": trainee_id,
                "date": date,
                "time": "07:30",
                "duration": 45,
                "title": "Upper body"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    let schedule_id = body["data"]["id"].as_str().unwrap().to_string();

    // The trainee sees the booking
    let (status, body) = app
        .get(&format!("/api/v1/trainee/schedules/{}", schedule_id), Some(&trainee_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Upper body");

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/v1/trainer/schedules/{}", schedule_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "reason": "Gym closed" }).to_string()))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");
    assert_eq!(body["data"]["cancellationReason"], "Gym closed");

    // The trainee was told about both events
    let (_, body) = app.get("/api/v1/trainee/notifications", Some(&trainee_token)).await;
    assert!(body["data"]["notifications"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn test_cancel_without_body_is_accepted() {
    let app = TestApp::new();
    let (token, trainee_id, _) = trainer_with_client(&app).await;

    let (_, body) = app
        .post(
            "/api/v1/trainer/schedules",
            Some(&token),
            json!({
                "traineeId": trainee_id,
                "date": Utc::now().date_naive() + Duration::days(1),
                "time": "18:00",
                "duration": 60,
                "title": "Conditioning"
            }),
        )
        .await;
    let uri = format!("/api/v1/trainer/schedules/{}", body["data"]["id"].as_str().unwrap());

    let (status, body) = app.delete(&uri, Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");
}

#[tokio::test]
async fn test_schedule_for_stranger_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.sign_in("coach2@example.com", "trainer").await;
    let stranger = app.register("stranger@example.com", "trainee").await;

    let (status, _) = app
        .post(
            "/api/v1/trainer/schedules",
            Some(&token),
            json!({
                "traineeId": stranger,
                "date": Utc::now().date_naive(),
                "time": "10:00",
                "duration": 60,
                "title": "Intro"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_schedule_reports_field_details() {
    let app = TestApp::new();
    let (token, trainee_id, _) = trainer_with_client(&app).await;

    let (status, body) = app
        .post(
            "/api/v1/trainer/schedules",
            Some(&token),
            json!({
                "traineeId": trainee_id,
                "date": Utc::now().date_naive(),
                "time": "25:00",
                "duration": 5,
                "title": "Too short"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["duration"].is_array());
    assert!(body["error"]["details"]["time"].is_array());
}

#[tokio::test]
async fn test_program_assignment_reaches_trainee() {
    let app = TestApp::new();
    let (token, trainee_id, trainee_token) = trainer_with_client(&app).await;

    let (status, body) = app
        .post(
            "/api/v1/trainer/programs",
            Some(&token),
            json!({ "name": "Strength Base", "totalWeeks": 8, "sessionsPerWeek": 3 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create program failed: {}", body);
    let program_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(
            &format!("/api/v1/trainer/programs/{}/assign", program_id),
            Some(&token),
            json!({ "traineeId": trainee_id, "startDate": Utc::now().date_naive() }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "assign failed: {}", body);

    let (status, body) = app.get("/api/v1/trainee/programs/current", Some(&trainee_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["program"]["name"], "Strength Base");
    assert_eq!(body["data"]["currentWeek"], 1);
}

#[tokio::test]
async fn test_record_metric_for_client() {
    let app = TestApp::new();
    let (token, trainee_id, trainee_token) = trainer_with_client(&app).await;

    let (status, body) = app
        .post(
            &format!("/api/v1/trainer/clients/{}/metrics", trainee_id),
            Some(&token),
            json!({ "date": Utc::now().date_naive(), "type": "weight", "value": 81.5, "unit": "kg" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "record metric failed: {}", body);

    let (status, body) = app.get("/api/v1/trainee/metrics?type=weight", Some(&trainee_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["value"], 81.5);
}

#[tokio::test]
async fn test_exercise_library_feeds_categories() {
    let app = TestApp::new();
    let (_, token) = app.sign_in("library@example.com", "trainer").await;

    for (name, category) in [("Squat", "Legs"), ("Bench", "Chest"), ("Lunge", "Legs")] {
        let (status, _) = app
            .post(
                "/api/v1/trainer/exercises",
                Some(&token),
                json!({ "name": name, "category": category }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.get("/api/v1/common/exercises/categories", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["categories"], json!(["Chest", "Legs"]));
}

#[tokio::test]
async fn test_dashboard_stats_count_clients() {
    let app = TestApp::new();
    let (token, _, _) = trainer_with_client(&app).await;

    let (status, body) = app.get("/api/v1/trainer/dashboard/stats", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalClients"], 1);
}
