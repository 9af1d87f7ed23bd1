pub mod auth;
pub mod common;
pub mod functions;
pub mod health;
pub mod trainee;
pub mod trainer;

// Tests module
#[cfg(test)]
mod tests;

use chrono::{NaiveDate, Utc};
use trainer_hub_domain::errors::ServiceError;

use crate::entities::common::ApiResponse;

/// Result of a REST handler
pub type HandlerResult<T> = Result<ApiResponse<T>, ServiceError>;

/// Calendar date the request is evaluated against
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// Re-export handlers for easier imports
pub use health::health_check;
