//! Serverless function surface
//!
//! Flat JSON bodies and `{ "error": ... }` failures instead of the REST envelope. Every
//! route except `signup` and `health` sits behind the bearer check in `function_auth`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use tracing::{error, instrument, warn};
use trainer_hub_domain::auth::UserInfo;
use trainer_hub_domain::entities::{NewDaySchedule, NewSessionSummary, NewWorkout, SignUpRequest};
use trainer_hub_domain::errors::ServiceError;

use crate::api::extract::FunctionBody;
use crate::api::state::AppState;
use crate::entities::functions::{
    FunctionErrorBody, FunctionStatus, FunctionSuccess, SchedulesResponse, SessionCardsResponse, SignUpResponse,
    WorkoutsResponse,
};

/// Failure of a function endpoint
#[derive(Debug)]
pub struct FunctionError {
    status: StatusCode,
    message: String,
}

impl FunctionError {
    /// Map a service failure; internal errors are replaced by `fallback`
    fn from_service(error: ServiceError, fallback: &str) -> Self {
        let (status, message) = match error {
            ServiceError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ServiceError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ServiceError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ServiceError::InvalidInput(message) | ServiceError::Conflict(message) => {
                (StatusCode::BAD_REQUEST, message)
            }
            ServiceError::Validation { details, .. } => (StatusCode::BAD_REQUEST, first_detail(&details)),
            ServiceError::Internal(detail) => {
                error!("{}: {}", fallback, detail);
                (StatusCode::INTERNAL_SERVER_ERROR, fallback.to_string())
            }
        };
        Self { status, message }
    }
}

/// First field message of a validation failure, e.g. `userId: User is required`
fn first_detail(details: &serde_json::Value) -> String {
    details
        .as_object()
        .and_then(|fields| {
            fields.iter().find_map(|(field, messages)| {
                messages
                    .as_array()
                    .and_then(|m| m.first())
                    .and_then(|m| m.as_str())
                    .map(|m| format!("{}: {}", field, m))
            })
        })
        .unwrap_or_else(|| "Invalid request".to_string())
}

impl IntoResponse for FunctionError {
    fn into_response(self) -> Response {
        (self.status, Json(FunctionErrorBody { error: self.message })).into_response()
    }
}

type FunctionResult<T> = Result<Json<T>, FunctionError>;

fn done() -> Json<FunctionSuccess> {
    Json(FunctionSuccess { success: true })
}

#[utoipa::path(
    get,
    path = "/functions/health",
    responses(
        (status = 200, description = "Function surface is up", body = FunctionStatus),
    ),
    tag = "functions"
)]
pub async fn health() -> Json<FunctionStatus> {
    Json(FunctionStatus {
        status: "ok".to_string(),
    })
}

/// Create an account and store its profile
#[utoipa::path(
    post,
    path = "/functions/signup",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "Account created", body = SignUpResponse),
        (status = 400, description = "Rejected by the identity provider", body = FunctionErrorBody),
        (status = 500, description = "Failed to create user", body = FunctionErrorBody),
    ),
    tag = "functions"
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn sign_up(
    State(state): State<AppState>,
    FunctionBody(request): FunctionBody<SignUpRequest>,
) -> FunctionResult<SignUpResponse> {
    match state.records.sign_up(request).await {
        Ok(user) => Ok(Json(SignUpResponse { user })),
        Err(e) => {
            warn!("Signup error: {}", e);
            Err(FunctionError::from_service(e, "Failed to create user"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/functions/schedule/{user_id}",
    params(
        ("user_id" = String, Path, description = "Owner of the schedules")
    ),
    responses(
        (status = 200, description = "Day schedules in date order", body = SchedulesResponse),
        (status = 401, description = "Missing or invalid token", body = FunctionErrorBody),
        (status = 403, description = "Records of another user", body = FunctionErrorBody),
        (status = 500, description = "Failed to fetch schedule", body = FunctionErrorBody),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "functions"
)]
#[instrument(skip(state, caller), fields(caller = %caller.user_id))]
pub async fn list_schedules(
    State(state): State<AppState>,
    Extension(caller): Extension<UserInfo>,
    Path(user_id): Path<String>,
) -> FunctionResult<SchedulesResponse> {
    let schedules = state
        .records
        .list_schedules(&caller, &user_id)
        .await
        .map_err(|e| FunctionError::from_service(e, "Failed to fetch schedule"))?;
    Ok(Json(SchedulesResponse { schedules }))
}

/// Write the schedule of one day, replacing an earlier one for the same date
#[utoipa::path(
    post,
    path = "/functions/schedule",
    request_body = NewDaySchedule,
    responses(
        (status = 200, description = "Schedule stored", body = FunctionSuccess),
        (status = 400, description = "Invalid request", body = FunctionErrorBody),
        (status = 401, description = "Missing or invalid token", body = FunctionErrorBody),
        (status = 500, description = "Failed to create schedule", body = FunctionErrorBody),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "functions"
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.user_id))]
pub async fn create_schedule(
    State(state): State<AppState>,
    Extension(caller): Extension<UserInfo>,
    FunctionBody(request): FunctionBody<NewDaySchedule>,
) -> FunctionResult<FunctionSuccess> {
    state
        .records
        .create_schedule(&caller, request)
        .await
        .map_err(|e| FunctionError::from_service(e, "Failed to create schedule"))?;
    Ok(done())
}

#[utoipa::path(
    get,
    path = "/functions/workouts/{user_id}",
    params(
        ("user_id" = String, Path, description = "Owner of the workouts")
    ),
    responses(
        (status = 200, description = "Workout logs, oldest first", body = WorkoutsResponse),
        (status = 401, description = "Missing or invalid token", body = FunctionErrorBody),
        (status = 500, description = "Failed to fetch workouts", body = FunctionErrorBody),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "functions"
)]
#[instrument(skip(state, caller), fields(caller = %caller.user_id))]
pub async fn list_workouts(
    State(state): State<AppState>,
    Extension(caller): Extension<UserInfo>,
    Path(user_id): Path<String>,
) -> FunctionResult<WorkoutsResponse> {
    let workouts = state
        .records
        .list_workouts(&caller, &user_id)
        .await
        .map_err(|e| FunctionError::from_service(e, "Failed to fetch workouts"))?;
    Ok(Json(WorkoutsResponse { workouts }))
}

#[utoipa::path(
    post,
    path = "/functions/workouts",
    request_body = NewWorkout,
    responses(
        (status = 200, description = "Workout stored", body = FunctionSuccess),
        (status = 400, description = "Invalid request", body = FunctionErrorBody),
        (status = 401, description = "Missing or invalid token", body = FunctionErrorBody),
        (status = 500, description = "Failed to create workout", body = FunctionErrorBody),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "functions"
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.user_id))]
pub async fn create_workout(
    State(state): State<AppState>,
    Extension(caller): Extension<UserInfo>,
    FunctionBody(request): FunctionBody<NewWorkout>,
) -> FunctionResult<FunctionSuccess> {
    state
        .records
        .create_workout(&caller, request)
        .await
        .map_err(|e| FunctionError::from_service(e, "Failed to create workout"))?;
    Ok(done())
}

#[utoipa::path(
    get,
    path = "/functions/session-cards/{user_id}",
    params(
        ("user_id" = String, Path, description = "Owner of the session cards")
    ),
    responses(
        (status = 200, description = "Session summaries in date order", body = SessionCardsResponse),
        (status = 401, description = "Missing or invalid token", body = FunctionErrorBody),
        (status = 500, description = "Failed to fetch session cards", body = FunctionErrorBody),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "functions"
)]
#[instrument(skip(state, caller), fields(caller = %caller.user_id))]
pub async fn list_session_cards(
    State(state): State<AppState>,
    Extension(caller): Extension<UserInfo>,
    Path(user_id): Path<String>,
) -> FunctionResult<SessionCardsResponse> {
    let cards = state
        .records
        .list_session_cards(&caller, &user_id)
        .await
        .map_err(|e| FunctionError::from_service(e, "Failed to fetch session cards"))?;
    Ok(Json(SessionCardsResponse { cards }))
}

#[utoipa::path(
    post,
    path = "/functions/session-cards",
    request_body = NewSessionSummary,
    responses(
        (status = 200, description = "Session card stored", body = FunctionSuccess),
        (status = 400, description = "Invalid request", body = FunctionErrorBody),
        (status = 401, description = "Missing or invalid token", body = FunctionErrorBody),
        (status = 500, description = "Failed to create session card", body = FunctionErrorBody),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "functions"
)]
#[instrument(skip(state, caller, request), fields(caller = %caller.user_id))]
pub async fn create_session_card(
    State(state): State<AppState>,
    Extension(caller): Extension<UserInfo>,
    FunctionBody(request): FunctionBody<NewSessionSummary>,
) -> FunctionResult<FunctionSuccess> {
    state
        .records
        .create_session_card(&caller, request)
        .await
        .map_err(|e| FunctionError::from_service(e, "Failed to create session card"))?;
    Ok(done())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_internal_errors_use_the_fallback_message() {
        let error = FunctionError::from_service(
            ServiceError::Internal("disk on fire".to_string()),
            "Failed to fetch schedule",
        );
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message, "Failed to fetch schedule");
    }

    #[test]
    fn test_validation_errors_name_the_field() {
        let error = FunctionError::from_service(
            ServiceError::Validation {
                message: "Validation failed".to_string(),
                details: json!({ "userId": ["User is required"] }),
            },
            "Failed to create workout",
        );
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.message, "userId: User is required");
    }

    #[test]
    fn test_conflicts_are_bad_requests() {
        let error = FunctionError::from_service(
            ServiceError::Conflict("An account with email a@b.c already exists".to_string()),
            "Failed to create user",
        );
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
    }
}
