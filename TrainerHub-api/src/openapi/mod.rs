use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use trainer_hub_domain::entities as domain;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

/// Registers the `bearer` scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Auth endpoints
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::refresh,
        crate::api::handlers::auth::logout,
        crate::api::handlers::auth::me,

        // Trainee endpoints
        crate::api::handlers::trainee::upcoming_schedules,
        crate::api::handlers::trainee::list_schedules,
        crate::api::handlers::trainee::schedule_detail,
        crate::api::handlers::trainee::current_program,
        crate::api::handlers::trainee::list_programs,
        crate::api::handlers::trainee::program_detail,
        crate::api::handlers::trainee::stats,
        crate::api::handlers::trainee::notifications,
        crate::api::handlers::trainee::mark_notification_read,
        crate::api::handlers::trainee::mark_all_notifications_read,
        crate::api::handlers::trainee::list_sessions,
        crate::api::handlers::trainee::search_sessions,
        crate::api::handlers::trainee::session_detail,
        crate::api::handlers::trainee::metrics,
        crate::api::handlers::trainee::profile,

        // Trainer endpoints
        crate::api::handlers::trainer::dashboard_stats,
        crate::api::handlers::trainer::list_clients,
        crate::api::handlers::trainer::client_detail,
        crate::api::handlers::trainer::add_client,
        crate::api::handlers::trainer::update_client,
        crate::api::handlers::trainer::remove_client,
        crate::api::handlers::trainer::client_metrics,
        crate::api::handlers::trainer::record_client_metric,
        crate::api::handlers::trainer::client_sessions,
        crate::api::handlers::trainer::list_schedules,
        crate::api::handlers::trainer::schedule_detail,
        crate::api::handlers::trainer::create_schedule,
        crate::api::handlers::trainer::update_schedule,
        crate::api::handlers::trainer::cancel_schedule,
        crate::api::handlers::trainer::list_sessions,
        crate::api::handlers::trainer::session_detail,
        crate::api::handlers::trainer::create_session,
        crate::api::handlers::trainer::update_session,
        crate::api::handlers::trainer::delete_session,
        crate::api::handlers::trainer::list_programs,
        crate::api::handlers::trainer::program_detail,
        crate::api::handlers::trainer::create_program,
        crate::api::handlers::trainer::update_program,
        crate::api::handlers::trainer::delete_program,
        crate::api::handlers::trainer::assign_program,
        crate::api::handlers::trainer::list_exercises,
        crate::api::handlers::trainer::create_exercise,
        crate::api::handlers::trainer::update_exercise,
        crate::api::handlers::trainer::delete_exercise,

        // Shared lookups
        crate::api::handlers::common::exercise_categories,

        // Function surface
        crate::api::handlers::functions::health,
        crate::api::handlers::functions::sign_up,
        crate::api::handlers::functions::list_schedules,
        crate::api::handlers::functions::create_schedule,
        crate::api::handlers::functions::list_workouts,
        crate::api::handlers::functions::create_workout,
        crate::api::handlers::functions::list_session_cards,
        crate::api::handlers::functions::create_session_card,
    ),
    components(
        schemas(
            // Users and sessions
            domain::Role,
            domain::User,
            domain::SignUpRequest,
            domain::LoginRequest,
            domain::RefreshRequest,
            domain::AuthSession,
            trainer_hub_domain::auth::UserInfo,

            // Schedules
            domain::ScheduleStatus,
            domain::Schedule,
            domain::CreateScheduleRequest,
            domain::UpdateScheduleRequest,
            domain::CancelScheduleRequest,
            domain::CalendarDay,
            domain::UpcomingSchedules,

            // Programs
            domain::ProgramStatus,
            domain::ProgramExercise,
            domain::WeeklySession,
            domain::Program,
            domain::AssignmentStatus,
            domain::ProgramAssignment,
            domain::CreateProgramRequest,
            domain::UpdateProgramRequest,
            domain::AssignProgramRequest,
            domain::AssignedProgram,
            domain::CurrentProgram,
            domain::ProgramSummary,

            // Session cards
            domain::ExerciseSet,
            domain::SessionExercise,
            domain::SessionTotals,
            domain::SessionCard,
            domain::CreateSessionCardRequest,
            domain::UpdateSessionCardRequest,

            // Metrics, notifications and statistics
            domain::MetricType,
            domain::Metric,
            domain::RecordMetricRequest,
            domain::NotificationType,
            domain::NotificationPriority,
            domain::Notification,
            domain::Pagination,
            domain::NotificationPage,
            domain::MarkAllReadResult,
            domain::TraineeStats,
            domain::DashboardStats,

            // Roster and exercise library
            domain::ClientStatus,
            domain::ClientLink,
            domain::AddClientRequest,
            domain::UpdateClientRequest,
            domain::ClientSummary,
            domain::LibraryExercise,
            domain::ExerciseRequest,

            // Function records
            domain::DaySchedule,
            domain::WorkoutLog,
            domain::SessionSummary,
            domain::NewDaySchedule,
            domain::NewWorkout,
            domain::NewSessionSummary,

            // Envelopes
            trainer_hub_domain::errors::ErrorEnvelope,
            trainer_hub_domain::errors::ErrorBody,
            crate::entities::common::CategoryList,
            crate::entities::functions::SchedulesResponse,
            crate::entities::functions::WorkoutsResponse,
            crate::entities::functions::SessionCardsResponse,
            crate::entities::functions::SignUpResponse,
            crate::entities::functions::FunctionSuccess,
            crate::entities::functions::FunctionStatus,
            crate::entities::functions::FunctionErrorBody,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealthStatus,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Registration, login and session management"),
        (name = "trainee", description = "The trainee's schedules, programs, sessions and notifications"),
        (name = "trainer", description = "Client roster, scheduling, programs and the exercise library"),
        (name = "common", description = "Lookups shared by both roles"),
        (name = "functions", description = "Serverless function endpoints")
    ),
    info(
        title = "TrainerHub API",
        version = "0.1.0",
        description = "API connecting personal trainers with their trainees",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
