use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use trainer_hub_client::{
    retry_request, ApiClient, AuthApi, ClientConfig, ErrorCode, FunctionsApi, TraineeApi, TrainerApi,
};
use trainer_hub_domain::entities::{MetricFilter, MetricType};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "email": "sam@example.com",
        "name": "Sam",
        "role": "trainee",
        "createdAt": "2024-03-01T08:00:00Z"
    })
}

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(ClientConfig::new(format!("{}/api/v1", server.uri()))).unwrap()
}

#[tokio::test]
async fn test_login_stores_token_for_later_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({ "username": "sam@example.com", "password": "Passw0rdOk" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "user": user_json("u1"), "token": "access-1", "refreshToken": "refresh-1", "expiresIn": 3600 }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": user_json("u1") })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let auth = AuthApi::new(client.clone());

    let session = auth.login("sam@example.com", "Passw0rdOk").await.unwrap();
    assert_eq!(session.refresh_token, "refresh-1");
    assert_eq!(client.auth_token().as_deref(), Some("access-1"));

    let me = auth.me().await.unwrap();
    assert_eq!(me.id, "u1");
}

#[tokio::test]
async fn test_logout_clears_token_even_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.set_auth_token("stale");

    let result = AuthApi::new(client.clone()).logout().await;
    assert!(result.is_err());
    assert!(client.auth_token().is_none());
}

#[tokio::test]
async fn test_unauthorized_clears_token_and_runs_hook() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/trainee/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "error": { "code": "UNAUTHORIZED", "message": "Invalid or expired token" }
        })))
        .mount(&server)
        .await;

    let signed_out = Arc::new(AtomicBool::new(false));
    let flag = signed_out.clone();
    let client = client_for(&server).on_unauthorized(move || flag.store(true, Ordering::SeqCst));
    client.set_auth_token("expired");

    let error = TraineeApi::new(client.clone()).profile().await.unwrap_err();

    assert!(error.is_unauthorized());
    assert_eq!(error.message, "Invalid or expired token");
    assert!(client.auth_token().is_none());
    assert!(signed_out.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_error_envelope_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/trainer/schedules"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "success": false,
            "error": {
                "code": "VALIDATION_ERROR",
                "message": "Validation failed",
                "details": { "duration": ["Duration must be between 15 and 240 minutes"] }
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .post::<serde_json::Value, _>("/trainer/schedules", &json!({ "duration": 5 }))
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::Validation);
    assert_eq!(error.status_code, 422);
    assert!(error.details.unwrap().get("duration").is_some());
}

#[tokio::test]
async fn test_metric_filter_is_sent_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/trainee/metrics"))
        .and(query_param("type", "weight"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{
                "id": "m1",
                "traineeId": "u1",
                "date": "2024-03-02",
                "type": "weight",
                "value": 81.5,
                "unit": "kg",
                "createdAt": "2024-03-02T07:00:00Z"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filter = MetricFilter {
        metric_type: Some(MetricType::Weight),
    };
    let metrics = TraineeApi::new(client_for(&server)).metrics(&filter).await.unwrap();

    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].value, 81.5);
}

#[tokio::test]
async fn test_delete_without_data_returns_unit() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/trainer/programs/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "message": "Program deleted" })))
        .expect(1)
        .mount(&server)
        .await;

    TrainerApi::new(client_for(&server)).delete_program("p1").await.unwrap();
}

#[tokio::test]
async fn test_exercise_categories_unwraps_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/common/exercises/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "categories": ["Chest", "Legs"] }
        })))
        .mount(&server)
        .await;

    let categories = TrainerApi::new(client_for(&server)).exercise_categories().await.unwrap();
    assert_eq!(categories, vec!["Chest", "Legs"]);
}

#[tokio::test]
async fn test_network_failure_has_status_zero() {
    let client = ApiClient::new(ClientConfig {
        base_url: "http://127.0.0.1:1/api/v1".to_string(),
        timeout: Duration::from_secs(2),
    })
    .unwrap();

    let error = client.get::<serde_json::Value>("/auth/me").await.unwrap_err();

    assert!(error.is_network());
    assert_eq!(error.status_code, 0);
}

#[tokio::test]
async fn test_retry_recovers_from_unavailable_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/trainee/stats"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/trainee/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "streak": 3 }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let stats: serde_json::Value = retry_request(|| client.get("/trainee/stats"), 3, Duration::from_millis(5))
        .await
        .unwrap();

    assert_eq!(stats["streak"], 3);
}

#[tokio::test]
async fn test_retry_gives_up_on_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/trainee/sessions/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "error": { "code": "NOT_FOUND", "message": "Session not found" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = retry_request(
        || {
            let api = TraineeApi::new(client.clone());
            async move { api.session("missing").await }
        },
        3,
        Duration::from_millis(5),
    )
    .await
    .unwrap_err();

    assert!(error.is_not_found());
    assert_eq!(error.message, "Session not found");
}

#[tokio::test]
async fn test_functions_use_plain_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/functions/workouts/u1"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workouts": [{
                "userId": "u1",
                "date": "2024-03-02",
                "exercises": [{ "name": "Squat", "sets": 5 }],
                "createdAt": "2024-03-02T07:00:00Z"
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/functions/session-cards/u2"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "error": "Forbidden" })))
        .mount(&server)
        .await;

    let rest = client_for(&server);
    rest.set_auth_token("access-1");
    let functions = FunctionsApi::new(rest.with_base_url(format!("{}/functions", server.uri())));

    let workouts = functions.workouts("u1").await.unwrap();
    assert_eq!(workouts.len(), 1);

    let error = functions.session_cards("u2").await.unwrap_err();
    assert!(error.is_forbidden());
    assert_eq!(error.message, "Forbidden");
}
