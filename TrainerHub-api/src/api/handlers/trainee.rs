//! Trainee endpoints: read-only views of the caller's training plus notification flags
//!
//! Every handler is scoped to the authenticated user; ids owned by someone else answer 404.

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use tracing::instrument;
use trainer_hub_domain::auth::UserInfo;
use trainer_hub_domain::entities::{
    AssignedProgram, CurrentProgram, MarkAllReadResult, Metric, MetricFilter, Notification, NotificationFilter,
    NotificationPage, Schedule, ScheduleFilter, SearchQuery, SessionCard, SessionFilter, TraineeStats,
    UpcomingQuery, UpcomingSchedules, User,
};
use trainer_hub_domain::errors::ErrorEnvelope;

use crate::api::handlers::{today, HandlerResult};
use crate::api::state::AppState;
use crate::entities::common::ApiResponse;

/// Upcoming sessions and a day-by-day calendar strip
#[utoipa::path(
    get,
    path = "/api/v1/trainee/schedules/upcoming",
    params(UpcomingQuery),
    responses(
        (status = 200, description = "Upcoming sessions", body = UpcomingSchedules),
        (status = 401, description = "Not authenticated", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainee"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn upcoming_schedules(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Query(query): Query<UpcomingQuery>,
) -> HandlerResult<UpcomingSchedules> {
    let upcoming = state
        .trainee
        .upcoming_schedules(&user.user_id, today(), query.days)
        .await?;
    Ok(ApiResponse::ok(upcoming))
}

#[utoipa::path(
    get,
    path = "/api/v1/trainee/schedules",
    params(ScheduleFilter),
    responses(
        (status = 200, description = "Schedules sorted by date", body = [Schedule]),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainee"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_schedules(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Query(filter): Query<ScheduleFilter>,
) -> HandlerResult<Vec<Schedule>> {
    Ok(ApiResponse::ok(state.trainee.schedules(&user.user_id, filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/trainee/schedules/{id}",
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
    tag = "trainee"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn schedule_detail(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> HandlerResult<Schedule> {
    Ok(ApiResponse::ok(state.trainee.schedule_detail(&user.user_id, &id).await?))
}

/// Active program with progress and the next session
#[utoipa::path(
    get,
    path = "/api/v1/trainee/programs/current",
    responses(
        (status = 200, description = "Current program", body = CurrentProgram),
        (status = 404, description = "No active program", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainee"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn current_program(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> HandlerResult<CurrentProgram> {
    Ok(ApiResponse::ok(
        state.trainee.current_program(&user.user_id, today()).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/trainee/programs",
    responses(
        (status = 200, description = "Every program assigned to the caller", body = [AssignedProgram]),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainee"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_programs(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> HandlerResult<Vec<AssignedProgram>> {
    Ok(ApiResponse::ok(state.trainee.programs(&user.user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/trainee/programs/{id}",
    params(
        ("id" = String, Path, description = "Assignment ID")
    ),
    responses(
        (status = 200, description = "Assigned program", body = AssignedProgram),
        (status = 404, description = "Assignment not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainee"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn program_detail(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> HandlerResult<AssignedProgram> {
    Ok(ApiResponse::ok(state.trainee.program_detail(&user.user_id, &id).await?))
}

/// Training totals, streaks and recent achievements
#[utoipa::path(
    get,
    path = "/api/v1/trainee/stats",
    responses(
        (status = 200, description = "Statistics", body = TraineeStats),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainee"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn stats(State(state): State<AppState>, Extension(user): Extension<UserInfo>) -> HandlerResult<TraineeStats> {
    Ok(ApiResponse::ok(state.trainee.stats(&user.user_id, today()).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/trainee/notifications",
    params(NotificationFilter),
    responses(
        (status = 200, description = "Page of notifications, newest first", body = NotificationPage),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainee"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn notifications(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Query(filter): Query<NotificationFilter>,
) -> HandlerResult<NotificationPage> {
    Ok(ApiResponse::ok(state.trainee.notifications(&user.user_id, filter).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/trainee/notifications/{id}/read",
    params(
        ("id" = String, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked as read", body = Notification),
        (status = 404, description = "Notification not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainee"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> HandlerResult<Notification> {
    let notification = state.trainee.mark_notification_read(&user.user_id, &id).await?;
    Ok(ApiResponse::ok(notification).with_message("Notification marked as read"))
}

#[utoipa::path(
    put,
    path = "/api/v1/trainee/notifications/read-all",
    responses(
        (status = 200, description = "Number of notifications changed", body = MarkAllReadResult),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainee"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> HandlerResult<MarkAllReadResult> {
    Ok(ApiResponse::ok(
        state.trainee.mark_all_notifications_read(&user.user_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/trainee/sessions",
    params(SessionFilter),
    responses(
        (status = 200, description = "Session cards, newest first", body = [SessionCard]),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainee"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Query(filter): Query<SessionFilter>,
) -> HandlerResult<Vec<SessionCard>> {
    Ok(ApiResponse::ok(state.trainee.sessions(&user.user_id, filter).await?))
}

/// Case-insensitive search over titles, feedback and exercise names
#[utoipa::path(
    get,
    path = "/api/v1/trainee/sessions/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching session cards", body = [SessionCard]),
        (status = 400, description = "Empty query", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainee"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn search_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Query(query): Query<SearchQuery>,
) -> HandlerResult<Vec<SessionCard>> {
    Ok(ApiResponse::ok(
        state.trainee.search_sessions(&user.user_id, &query.q).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/trainee/sessions/{id}",
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
    tag = "trainee"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn session_detail(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<String>,
) -> HandlerResult<SessionCard> {
    Ok(ApiResponse::ok(state.trainee.session_detail(&user.user_id, &id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/trainee/metrics",
    params(MetricFilter),
    responses(
        (status = 200, description = "Body metrics sorted by date", body = [Metric]),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainee"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn metrics(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Query(filter): Query<MetricFilter>,
) -> HandlerResult<Vec<Metric>> {
    Ok(ApiResponse::ok(state.trainee.metrics(&user.user_id, filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/trainee/me",
    responses(
        (status = 200, description = "Profile of the caller", body = User),
        (status = 404, description = "Profile not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "trainee"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn profile(State(state): State<AppState>, Extension(user): Extension<UserInfo>) -> HandlerResult<User> {
    Ok(ApiResponse::ok(state.trainee.profile(&user.user_id).await?))
}
