//! Trainer endpoints: dashboard, roster, scheduling, session cards, programs and exercises

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, instrument};
use trainer_hub_domain::auth::UserInfo;
use trainer_hub_domain::entities::{
    AddClientRequest, AssignProgramRequest, CancelScheduleRequest, ClientSummary, CreateProgramRequest,
    CreateScheduleRequest, CreateSessionCardRequest, DashboardStats, ExerciseRequest, LibraryExercise, Metric,
    MetricFilter, Program, ProgramAssignment, RecordMetricRequest, Schedule, ScheduleFilter, SessionCard,
    SessionFilter, UpdateClientRequest, UpdateProgramRequest, UpdateScheduleRequest, UpdateSessionCardRequest,
};
use trainer_hub_domain::errors::{ErrorEnvelope, ServiceError};

use crate::api::extract::JsonBody;
use crate::api::handlers::{today, HandlerResult};
use crate::api::state::AppState;
use crate::entities::common::ApiResponse;

type Created<T> = Result<(StatusCode, ApiResponse<T>), ServiceError>;

fn created<T>(data: T, message: &str) -> (StatusCode, ApiResponse<T>) {
    (StatusCode::CREATED, ApiResponse::ok(data).with_message(message))
}

#[utoipa::path(
    get,
    path = "/api/v1/trainer/dashboard/stats",
    responses(
        (status = 200, description = "Dashboard figures", body = DashboardStats),
        (status = 403, description = "Caller is not a trainer", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user), fields(trainer_id = %user.user_id))]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> HandlerResult<DashboardStats> {
    Ok(ApiResponse::ok(
        state.trainer.dashboard_stats(&user.user_id, today()).await?,
    ))
}

// Clients

#[utoipa::path(
    get,
    path = "/api/v1/trainer/clients",
    responses(
        (status = 200, description = "Clients of the trainer", body = [ClientSummary]),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user), fields(trainer_id = %user.user_id))]
pub async fn list_clients(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> HandlerResult<Vec<ClientSummary>> {
    Ok(ApiResponse::ok(state.trainer.list_clients(&user.user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/trainer/clients/{id}",
    params(
        ("id" = String, Path, description = "Trainee ID")
    ),
    responses(
        (status = 200, description = "Client found", body = ClientSummary),
        (status = 404, description = "Not a client of this trainer", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user), fields(trainer_id = %user.user_id))]
pub async fn client_detail(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> HandlerResult<ClientSummary> {
    Ok(ApiResponse::ok(state.trainer.client_detail(&user.user_id, &id).await?))
}

/// Link a trainee to the trainer by email
#[utoipa::path(
    post,
    path = "/api/v1/trainer/clients",
    request_body = AddClientRequest,
    responses(
        (status = 201, description = "Client added", body = ClientSummary),
        (status = 404, description = "No trainee with that email", body = ErrorEnvelope),
        (status = 409, description = "Already a client", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user, request), fields(trainer_id = %user.user_id))]
pub async fn add_client(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    JsonBody(request): JsonBody<AddClientRequest>,
) -> Created<ClientSummary> {
    let client = state.trainer.add_client(&user.user_id, request).await?;
    info!("Trainer {} added client {}", user.user_id, client.profile.id);
    Ok(created(client, "Client added"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/trainer/clients/{id}",
    params(
        ("id" = String, Path, description = "Trainee ID")
    ),
    request_body = UpdateClientRequest,
    responses(
        (status = 200, description = "Client updated", body = ClientSummary),
        (status = 404, description = "Not a client of this trainer", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user, request), fields(trainer_id = %user.user_id))]
pub async fn update_client(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateClientRequest>,
) -> HandlerResult<ClientSummary> {
    Ok(ApiResponse::ok(
        state.trainer.update_client(&user.user_id, &id, request).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/trainer/clients/{id}",
    params(
        ("id" = String, Path, description = "Trainee ID")
    ),
    responses(
        (status = 200, description = "Client removed"),
        (status = 404, description = "Not a client of this trainer", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user), fields(trainer_id = %user.user_id))]
pub async fn remove_client(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> HandlerResult<()> {
    state.trainer.remove_client(&user.user_id, &id).await?;
    Ok(ApiResponse::message("Client removed"))
}

#[utoipa::path(
    get,
    path = "/api/v1/trainer/clients/{id}/metrics",
    params(
        ("id" = String, Path, description = "Trainee ID"),
        MetricFilter
    ),
    responses(
        (status = 200, description = "Metrics of the client", body = [Metric]),
        (status = 404, description = "Not a client of this trainer", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user), fields(trainer_id = %user.user_id))]
pub async fn client_metrics(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    Query(filter): Query<MetricFilter>,
) -> HandlerResult<Vec<Metric>> {
    Ok(ApiResponse::ok(
        state.trainer.client_metrics(&user.user_id, &id, filter).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/trainer/clients/{id}/metrics",
    params(
        ("id" = String, Path, description = "Trainee ID")
    ),
    request_body = RecordMetricRequest,
    responses(
        (status = 201, description = "Metric recorded", body = Metric),
        (status = 404, description = "Not a client of this trainer", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user, request), fields(trainer_id = %user.user_id))]
pub async fn record_client_metric(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<RecordMetricRequest>,
) -> Created<Metric> {
    let metric = state.trainer.record_client_metric(&user.user_id, &id, request).await?;
    Ok(created(metric, "Metric recorded"))
}

#[utoipa::path(
    get,
    path = "/api/v1/trainer/clients/{id}/sessions",
    params(
        ("id" = String, Path, description = "Trainee ID")
    ),
    responses(
        (status = 200, description = "Session cards of the client", body = [SessionCard]),
        (status = 404, description = "Not a client of this trainer", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user), fields(trainer_id = %user.user_id))]
pub async fn client_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> HandlerResult<Vec<SessionCard>> {
    Ok(ApiResponse::ok(state.trainer.client_sessions(&user.user_id, &id).await?))
}

// Schedules

#[utoipa::path(
    get,
    path = "/api/v1/trainer/schedules",
    params(ScheduleFilter),
    responses(
        (status = 200, description = "Schedules sorted by date and time", body = [Schedule]),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user), fields(trainer_id = %user.user_id))]
pub async fn list_schedules(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Query(filter): Query<ScheduleFilter>,
) -> HandlerResult<Vec<Schedule>> {
    Ok(ApiResponse::ok(state.trainer.list_schedules(&user.user_id, filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/trainer/schedules/{id}",
    params(
        ("id" = String, Path, description = "Schedule ID")
    ),
    responses(
        (status = 200, description = "Schedule found", body = Schedule),
        (status = 404, description = "Schedule not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user), fields(trainer_id = %user.user_id))]
pub async fn schedule_detail(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> HandlerResult<Schedule> {
    Ok(ApiResponse::ok(state.trainer.schedule_detail(&user.user_id, &id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/trainer/schedules",
    request_body = CreateScheduleRequest,
    responses(
        (status = 201, description = "Schedule created", body = Schedule),
        (status = 404, description = "Trainee is not a client", body = ErrorEnvelope),
        (status = 422, description = "Invalid time or duration", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user, request), fields(trainer_id = %user.user_id))]
pub async fn create_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    JsonBody(request): JsonBody<CreateScheduleRequest>,
) -> Created<Schedule> {
    let schedule = state.trainer.create_schedule(&user.user_id, request).await?;
    Ok(created(schedule, "Schedule created"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/trainer/schedules/{id}",
    params(
        ("id" = String, Path, description = "Schedule ID")
    ),
    request_body = UpdateScheduleRequest,
    responses(
        (status = 200, description = "Schedule updated", body = Schedule),
        (status = 400, description = "Status change not allowed", body = ErrorEnvelope),
        (status = 404, description = "Schedule not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user, request), fields(trainer_id = %user.user_id))]
pub async fn update_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateScheduleRequest>,
) -> HandlerResult<Schedule> {
    Ok(ApiResponse::ok(
        state.trainer.update_schedule(&user.user_id, &id, request).await?,
    ))
}

/// Cancel a schedule; the body with a reason is optional
#[utoipa::path(
    delete,
    path = "/api/v1/trainer/schedules/{id}",
    params(
        ("id" = String, Path, description = "Schedule ID")
    ),
    request_body(content = CancelScheduleRequest, description = "Optional cancellation reason"),
    responses(
        (status = 200, description = "Schedule cancelled", body = Schedule),
        (status = 404, description = "Schedule not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user, body), fields(trainer_id = %user.user_id))]
pub async fn cancel_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    body: Option<Json<CancelScheduleRequest>>,
) -> HandlerResult<Schedule> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let schedule = state.trainer.cancel_schedule(&user.user_id, &id, request).await?;
    Ok(ApiResponse::ok(schedule).with_message("Schedule cancelled"))
}

// Session cards

#[utoipa::path(
    get,
    path = "/api/v1/trainer/sessions",
    params(SessionFilter),
    responses(
        (status = 200, description = "Session cards written by the trainer", body = [SessionCard]),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user), fields(trainer_id = %user.user_id))]
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Query(filter): Query<SessionFilter>,
) -> HandlerResult<Vec<SessionCard>> {
    Ok(ApiResponse::ok(state.trainer.list_sessions(&user.user_id, filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/trainer/sessions/{id}",
    params(
        ("id" = String, Path, description = "Session card ID")
    ),
    responses(
        (status = 200, description = "Session card", body = SessionCard),
        (status = 404, description = "Session card not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user), fields(trainer_id = %user.user_id))]
pub async fn session_detail(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> HandlerResult<SessionCard> {
    Ok(ApiResponse::ok(state.trainer.session_detail(&user.user_id, &id).await?))
}

/// Write a session card; a linked schedule is marked completed
#[utoipa::path(
    post,
    path = "/api/v1/trainer/sessions",
    request_body = CreateSessionCardRequest,
    responses(
        (status = 201, description = "Session card created", body = SessionCard),
        (status = 400, description = "Linked schedule cannot be completed", body = ErrorEnvelope),
        (status = 404, description = "Client or schedule not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user, request), fields(trainer_id = %user.user_id))]
pub async fn create_session(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    JsonBody(request): JsonBody<CreateSessionCardRequest>,
) -> Created<SessionCard> {
    let card = state.trainer.create_session(&user.user_id, request).await?;
    Ok(created(card, "Session card created"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/trainer/sessions/{id}",
    params(
        ("id" = String, Path, description = "Session card ID")
    ),
    request_body = UpdateSessionCardRequest,
    responses(
        (status = 200, description = "Session card updated", body = SessionCard),
        (status = 404, description = "Session card not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user, request), fields(trainer_id = %user.user_id))]
pub async fn update_session(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateSessionCardRequest>,
) -> HandlerResult<SessionCard> {
    Ok(ApiResponse::ok(
        state.trainer.update_session(&user.user_id, &id, request).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/trainer/sessions/{id}",
    params(
        ("id" = String, Path, description = "Session card ID")
    ),
    responses(
        (status = 200, description = "Session card deleted"),
        (status = 404, description = "Session card not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user), fields(trainer_id = %user.user_id))]
pub async fn delete_session(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> HandlerResult<()> {
    state.trainer.delete_session(&user.user_id, &id).await?;
    Ok(ApiResponse::message("Session card deleted"))
}

// Programs

#[utoipa::path(
    get,
    path = "/api/v1/trainer/programs",
    responses(
        (status = 200, description = "Programs authored by the trainer", body = [Program]),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user), fields(trainer_id = %user.user_id))]
pub async fn list_programs(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> HandlerResult<Vec<Program>> {
    Ok(ApiResponse::ok(state.trainer.list_programs(&user.user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/trainer/programs/{id}",
    params(
        ("id" = String, Path, description = "Program ID")
    ),
    responses(
        (status = 200, description = "Program found", body = Program),
        (status = 404, description = "Program not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user), fields(trainer_id = %user.user_id))]
pub async fn program_detail(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> HandlerResult<Program> {
    Ok(ApiResponse::ok(state.trainer.program_detail(&user.user_id, &id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/trainer/programs",
    request_body = CreateProgramRequest,
    responses(
        (status = 201, description = "Program created", body = Program),
        (status = 422, description = "Invalid program", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user, request), fields(trainer_id = %user.user_id))]
pub async fn create_program(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    JsonBody(request): JsonBody<CreateProgramRequest>,
) -> Created<Program> {
    let program = state.trainer.create_program(&user.user_id, request).await?;
    Ok(created(program, "Program created"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/trainer/programs/{id}",
    params(
        ("id" = String, Path, description = "Program ID")
    ),
    request_body = UpdateProgramRequest,
    responses(
        (status = 200, description = "Program updated", body = Program),
        (status = 404, description = "Program not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user, request), fields(trainer_id = %user.user_id))]
pub async fn update_program(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateProgramRequest>,
) -> HandlerResult<Program> {
    Ok(ApiResponse::ok(
        state.trainer.update_program(&user.user_id, &id, request).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/trainer/programs/{id}",
    params(
        ("id" = String, Path, description = "Program ID")
    ),
    responses(
        (status = 200, description = "Program deleted"),
        (status = 404, description = "Program not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user), fields(trainer_id = %user.user_id))]
pub async fn delete_program(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> HandlerResult<()> {
    state.trainer.delete_program(&user.user_id, &id).await?;
    Ok(ApiResponse::message("Program deleted"))
}

/// Start a program for one of the trainer's clients
#[utoipa::path(
    post,
    path = "/api/v1/trainer/programs/{id}/assign",
    params(
        ("id" = String, Path, description = "Program ID")
    ),
    request_body = AssignProgramRequest,
    responses(
        (status = 201, description = "Program assigned", body = ProgramAssignment),
        (status = 404, description = "Program or client not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user, request), fields(trainer_id = %user.user_id))]
pub async fn assign_program(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<AssignProgramRequest>,
) -> Created<ProgramAssignment> {
    let assignment = state.trainer.assign_program(&user.user_id, &id, request).await?;
    Ok(created(assignment, "Program assigned"))
}

// Exercise library

#[utoipa::path(
    get,
    path = "/api/v1/trainer/exercises",
    responses(
        (status = 200, description = "Exercise library of the trainer", body = [LibraryExercise]),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user), fields(trainer_id = %user.user_id))]
pub async fn list_exercises(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> HandlerResult<Vec<LibraryExercise>> {
    Ok(ApiResponse::ok(state.trainer.list_exercises(&user.user_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/trainer/exercises",
    request_body = ExerciseRequest,
    responses(
        (status = 201, description = "Exercise created", body = LibraryExercise),
        (status = 422, description = "Invalid exercise", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user, request), fields(trainer_id = %user.user_id))]
pub async fn create_exercise(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    JsonBody(request): JsonBody<ExerciseRequest>,
) -> Created<LibraryExercise> {
    let exercise = state.trainer.create_exercise(&user.user_id, request).await?;
    Ok(created(exercise, "Exercise created"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/trainer/exercises/{id}",
    params(
        ("id" = String, Path, description = "Exercise ID")
    ),
    request_body = ExerciseRequest,
    responses(
        (status = 200, description = "Exercise updated", body = LibraryExercise),
        (status = 404, description = "Exercise not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user, request), fields(trainer_id = %user.user_id))]
pub async fn update_exercise(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<ExerciseRequest>,
) -> HandlerResult<LibraryExercise> {
    Ok(ApiResponse::ok(
        state.trainer.update_exercise(&user.user_id, &id, request).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/trainer/exercises/{id}",
    params(
        ("id" = String, Path, description = "Exercise ID")
    ),
    responses(
        (status = 200, description = "Exercise deleted"),
        (status = 404, description = "Exercise not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainer"
)]
#[instrument(skip(state, user), fields(trainer_id = %user.user_id))]
pub async fn delete_exercise(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> HandlerResult<()> {
    state.trainer.delete_exercise(&user.user_id, &id).await?;
    Ok(ApiResponse::message("Exercise deleted"))
}
