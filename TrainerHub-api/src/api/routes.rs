use axum::{
    middleware,
    routing::{get, post, put},
    Extension, Router,
};
use tower_http::trace::TraceLayer;
use tracing::debug;
use trainer_hub_domain::auth::{
    auth_middleware, configure_auth, function_auth, optional_auth, trainee_only, trainer_only,
};

use crate::api::handlers::{auth, common, functions, health, trainee, trainer};
use crate::api::state::AppState;
use crate::config::AppConfig;
use crate::openapi::configure_swagger_routes;

fn auth_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route_layer(middleware::from_fn_with_state(state.identity.clone(), auth_middleware));

    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .merge(protected)
}

fn trainee_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/schedules/upcoming", get(trainee::upcoming_schedules))
        .route("/schedules", get(trainee::list_schedules))
        .route("/schedules/:id", get(trainee::schedule_detail))
        .route("/programs/current", get(trainee::current_program))
        .route("/programs", get(trainee::list_programs))
        .route("/programs/:id", get(trainee::program_detail))
        .route("/stats", get(trainee::stats))
        .route("/notifications", get(trainee::notifications))
        .route("/notifications/read-all", put(trainee::mark_all_notifications_read))
        .route("/notifications/:id/read", put(trainee::mark_notification_read))
        .route("/sessions", get(trainee::list_sessions))
        .route("/sessions/search", get(trainee::search_sessions))
        .route("/sessions/:id", get(trainee::session_detail))
        .route("/metrics", get(trainee::metrics))
        .route("/me", get(trainee::profile))
        .route_layer(middleware::from_fn(trainee_only))
        .route_layer(middleware::from_fn_with_state(state.identity.clone(), auth_middleware))
}

fn trainer_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard/stats", get(trainer::dashboard_stats))
        .route("/clients", get(trainer::list_clients).post(trainer::add_client))
        .route(
            "/clients/:id",
            get(trainer::client_detail)
                .patch(trainer::update_client)
                .delete(trainer::remove_client),
        )
        .route(
            "/clients/:id/metrics",
            get(trainer::client_metrics).post(trainer::record_client_metric),
        )
        .route("/clients/:id/sessions", get(trainer::client_sessions))
        .route("/schedules", get(trainer::list_schedules).post(trainer::create_schedule))
        .route(
            "/schedules/:id",
            get(trainer::schedule_detail)
                .patch(trainer::update_schedule)
                .delete(trainer::cancel_schedule),
        )
        .route("/sessions", get(trainer::list_sessions).post(trainer::create_session))
        .route(
            "/sessions/:id",
            get(trainer::session_detail)
                .patch(trainer::update_session)
                .delete(trainer::delete_session),
        )
        .route("/programs", get(trainer::list_programs).post(trainer::create_program))
        .route(
            "/programs/:id",
            get(trainer::program_detail)
                .patch(trainer::update_program)
                .delete(trainer::delete_program),
        )
        .route("/programs/:id/assign", post(trainer::assign_program))
        .route("/exercises", get(trainer::list_exercises).post(trainer::create_exercise))
        .route(
            "/exercises/:id",
            axum::routing::patch(trainer::update_exercise).delete(trainer::delete_exercise),
        )
        .route_layer(middleware::from_fn(trainer_only))
        .route_layer(middleware::from_fn_with_state(state.identity.clone(), auth_middleware))
}

fn common_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/exercises/categories", get(common::exercise_categories))
        .route_layer(middleware::from_fn_with_state(state.identity.clone(), optional_auth))
}

/// Serverless surface; only `signup` and `health` skip the bearer check
fn function_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/schedule", post(functions::create_schedule))
        .route("/schedule/:user_id", get(functions::list_schedules))
        .route("/workouts", post(functions::create_workout))
        .route("/workouts/:user_id", get(functions::list_workouts))
        .route("/session-cards", post(functions::create_session_card))
        .route("/session-cards/:user_id", get(functions::list_session_cards))
        .route_layer(middleware::from_fn_with_state(state.identity.clone(), function_auth))
        .route("/signup", post(functions::sign_up))
        .route("/health", get(functions::health))
}

/// Create the application router
pub fn create_app(state: AppState, config: &AppConfig) -> Router {
    debug!("Creating application router");

    let api_routes = Router::new()
        .nest("/auth", auth_routes(&state))
        .nest("/trainee", trainee_routes(&state))
        .nest("/trainer", trainer_routes(&state))
        .nest("/common", common_routes(&state));

    debug!("API routes configured");

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_routes)
        .nest(&config.functions_prefix, function_routes(&state))
        .layer(Extension(state.health.clone()))
        .with_state(state);

    debug!("Function routes mounted at {}", config.functions_prefix);

    // Configure the Swagger UI using the helper function
    let app = add_swagger_ui(app);

    // Apply CORS and security headers
    let app = configure_auth(app, &config.cors_allowed_origins);

    health::initialize_server_start_time();

    app.layer(TraceLayer::new_for_http())
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    app.merge(configure_swagger_routes())
}
