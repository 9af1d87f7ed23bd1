use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::auth::logging::{log_access_denied, log_auth_event, AuthEvent, AuthEventType};
use crate::auth::UserInfo;
use crate::entities::Role;
use crate::errors::ServiceError;

/// Role-based access control
///
/// Must run after `auth_middleware`. Users holding none of `required_roles` get a 403
/// envelope; a request without `UserInfo` gets a 401.
pub async fn require_roles<S, I>(
    _state: State<S>,
    req: Request<Body>,
    next: Next,
    required_roles: I,
) -> Response
where
    I: IntoIterator<Item = Role>,
{
    let required_roles: Vec<Role> = required_roles.into_iter().collect();
    let request_path = req.uri().path().to_string();

    let Some(user) = req.extensions().get::<UserInfo>() else {
        warn!("No user info found in request extensions for path: {}", request_path);

        let event = AuthEvent::new(AuthEventType::AccessDenied, None, false)
            .with_details("Authentication context missing")
            .at_path(request_path)
            .via("role");
        log_auth_event(event);

        return ServiceError::Unauthorized("Authentication required".to_string()).into_response();
    };

    if required_roles.contains(&user.role) {
        debug!("User {} ({}) authorized for {}", user.user_id, user.role, request_path);
        return next.run(req).await;
    }

    let names: Vec<String> = required_roles.iter().map(|r| r.to_string()).collect();
    warn!("User {} lacks required roles {:?} for resource: {}", user.user_id, names, request_path);
    log_access_denied(&user.user_id, user.role, &request_path, &required_roles);

    ServiceError::Forbidden(format!(
        "This resource requires one of the roles: {}",
        names.join(", ")
    ))
    .into_response()
}

/// Trainees and trainers may read trainee resources
pub async fn trainee_only(req: Request<Body>, next: Next) -> Response {
    require_roles(State(()), req, next, [Role::Trainee, Role::Trainer]).await
}

pub async fn trainer_only(req: Request<Body>, next: Next) -> Response {
    require_roles(State(()), req, next, [Role::Trainer]).await
}

/// Middleware requiring any of `roles`, for use with `from_fn_with_state`
///
/// ```ignore
/// let admin_routes = Router::new()
///     .route("/reports", get(reports))
///     .layer(middleware::from_fn_with_state(state.clone(), require_any_role(&[Role::Admin])));
/// ```
pub fn require_any_role<S: Clone + Send + Sync + 'static>(
    roles: &[Role],
) -> impl Fn(State<S>, Request<Body>, Next) -> BoxFuture<'static, Response> + Clone + Send + 'static {
    let roles = roles.to_vec();
    move |state, req, next| {
        let roles = roles.clone();
        Box::pin(async move { require_roles(state, req, next, roles).await })
    }
}
