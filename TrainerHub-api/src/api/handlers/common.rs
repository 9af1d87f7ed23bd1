use axum::{extract::State, Extension};
use tracing::{debug, instrument};
use trainer_hub_domain::auth::UserInfo;
use trainer_hub_domain::errors::ErrorEnvelope;

use crate::api::handlers::HandlerResult;
use crate::api::state::AppState;
use crate::entities::common::{ApiResponse, CategoryList};

/// Distinct exercise categories across every library
///
/// Open to anonymous callers; a valid token is accepted but not required.
#[utoipa::path(
    get,
    path = "/api/v1/common/exercises/categories",
    responses(
        (status = 200, description = "Sorted category names", body = CategoryList),
        (status = 500, description = "Internal server error", body = ErrorEnvelope),
    ),
    tag = "common"
)]
#[instrument(skip(state, user))]
pub async fn exercise_categories(
    State(state): State<AppState>,
    user: Option<Extension<UserInfo>>,
) -> HandlerResult<CategoryList> {
    if let Some(Extension(user)) = &user {
        debug!("Categories requested by {}", user.user_id);
    }
    let categories = state.trainer.exercise_categories().await?;
    Ok(ApiResponse::ok(CategoryList { categories }))
}
