//! Error type shared by every domain service
//!
//! Each variant maps to one wire code and HTTP status. Responses use the envelope
//! `{ "success": false, "error": { "code", "message", "details" } }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::error;
use trainer_hub_data::repository::RepositoryError;
use validator::ValidationErrors;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::auth::identity::IdentityError;
use crate::auth::token::SecurityError;

/// Closed set of failures a service call can produce
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    /// Request body failed field validation
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(resource: &str) -> Self {
        ServiceError::NotFound(format!("{} not found", resource))
    }

    /// Machine-readable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Unauthorized(_) => "UNAUTHORIZED",
            ServiceError::Forbidden(_) => "FORBIDDEN",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::InvalidInput(_) => "INVALID_INPUT",
            ServiceError::Validation { .. } => "VALIDATION_ERROR",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error envelope for this failure; internal details are not exposed
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let (message, details) = match self {
            ServiceError::Internal(_) => ("An unexpected error occurred".to_string(), None),
            ServiceError::Validation { message, details } => (message.clone(), Some(details.clone())),
            other => (other.to_string(), None),
        };

        ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: self.code().to_string(),
                message,
                details,
            },
        }
    }
}

/// Body of a failed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ErrorBody {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        if let ServiceError::Internal(detail) = &self {
            error!("Internal error: {}", detail);
        }
        (self.status(), Json(self.to_envelope())).into_response()
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(error: RepositoryError) -> Self {
        ServiceError::Internal(format!("Repository error: {}", error))
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        let details: serde_json::Map<String, Value> = errors
            .field_errors()
            .into_iter()
            .map(|(field, field_errors)| {
                let messages: Vec<Value> = field_errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => Value::String(message.to_string()),
                        None => Value::String(e.code.to_string()),
                    })
                    .collect();
                (field.to_string(), Value::Array(messages))
            })
            .collect();

        ServiceError::Validation {
            message: "Validation failed".to_string(),
            details: Value::Object(details),
        }
    }
}

impl From<SecurityError> for ServiceError {
    fn from(error: SecurityError) -> Self {
        match error {
            SecurityError::ConfigError(msg) => ServiceError::Internal(msg),
            other => ServiceError::Unauthorized(other.to_string()),
        }
    }
}

impl From<IdentityError> for ServiceError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::InvalidCredentials => {
                ServiceError::Unauthorized("Invalid email or password".to_string())
            }
            IdentityError::InvalidToken(msg) => ServiceError::Unauthorized(msg),
            IdentityError::EmailTaken(email) => {
                ServiceError::Conflict(format!("An account with email {} already exists", email))
            }
            IdentityError::Rejected(msg) => ServiceError::InvalidInput(msg),
            IdentityError::UserNotFound => ServiceError::not_found("User"),
            IdentityError::Security(e) => e.into(),
            IdentityError::Storage(e) => e.into(),
            IdentityError::Upstream(msg) => ServiceError::Internal(msg),
        }
    }
}

/// Result alias for service calls
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Input {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    #[test]
    fn test_codes_and_statuses() {
        let cases = [
            (ServiceError::Unauthorized("x".into()), "UNAUTHORIZED", 401),
            (ServiceError::Forbidden("x".into()), "FORBIDDEN", 403),
            (ServiceError::NotFound("x".into()), "NOT_FOUND", 404),
            (ServiceError::InvalidInput("x".into()), "INVALID_INPUT", 400),
            (ServiceError::Conflict("x".into()), "CONFLICT", 409),
            (ServiceError::Internal("x".into()), "INTERNAL_ERROR", 500),
        ];
        for (error, code, status) in cases {
            assert_eq!(error.code(), code);
            assert_eq!(error.status().as_u16(), status);
        }
    }

    #[test]
    fn test_validation_errors_carry_field_details() {
        let errors = Input { name: String::new() }.validate().unwrap_err();
        let error = ServiceError::from(errors);
        assert_eq!(error.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let envelope = error.to_envelope();
        assert!(!envelope.success);
        assert_eq!(envelope.error.code, "VALIDATION_ERROR");
        assert_eq!(
            envelope.error.details,
            Some(serde_json::json!({ "name": ["Name is required"] }))
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let envelope = ServiceError::Internal("disk on fire".into()).to_envelope();
        assert_eq!(envelope.error.message, "An unexpected error occurred");
    }
}
