use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Error categories surfaced to callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    InvalidInput,
    Validation,
    Conflict,
    InternalError,
    NetworkError,
    /// A code sent by the server that this client does not know
    Other(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::Validation => "VALIDATION_ERROR",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "UNAUTHORIZED" => ErrorCode::Unauthorized,
            "FORBIDDEN" => ErrorCode::Forbidden,
            "NOT_FOUND" => ErrorCode::NotFound,
            "INVALID_INPUT" => ErrorCode::InvalidInput,
            "VALIDATION_ERROR" => ErrorCode::Validation,
            "CONFLICT" => ErrorCode::Conflict,
            "INTERNAL_ERROR" => ErrorCode::InternalError,
            "NETWORK_ERROR" => ErrorCode::NetworkError,
            other => ErrorCode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failed API call, normalized from transport errors and error responses
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct ApiException {
    pub code: ErrorCode,
    pub message: String,
    /// HTTP status, or 0 when no response arrived
    pub status_code: u16,
    pub details: Option<Value>,
}

impl ApiException {
    pub fn new(code: ErrorCode, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            code,
            message: message.into(),
            status_code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// The request never produced a response
    pub fn network(error: &reqwest::Error) -> Self {
        tracing::debug!("Transport failure: {}", error);
        Self::new(
            ErrorCode::NetworkError,
            "Unable to reach the server. Check your internet connection",
            0,
        )
    }

    /// A successful response whose body did not have the expected shape
    pub fn decode(error: serde_json::Error, status_code: u16) -> Self {
        Self::new(
            ErrorCode::InternalError,
            format!("Unexpected response from server: {}", error),
            status_code,
        )
    }

    /// Normalize an error response
    ///
    /// The server's `{ "error": { code, message, details } }` envelope wins; a bare
    /// `{ "error": "..." }` keeps its message; anything else is mapped by status.
    pub fn from_response(status_code: u16, body: &[u8]) -> Self {
        let data: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

        match data.get("error") {
            Some(Value::Object(error)) => {
                let code = error
                    .get("code")
                    .and_then(Value::as_str)
                    .map(ErrorCode::from_code)
                    .unwrap_or(ErrorCode::InternalError);
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("An error occurred")
                    .to_string();
                let exception = Self::new(code, message, status_code);
                match error.get("details") {
                    Some(details) if !details.is_null() => exception.with_details(details.clone()),
                    _ => exception,
                }
            }
            Some(Value::String(message)) => Self::new(Self::code_for_status(status_code), message.clone(), status_code),
            _ => Self::from_status(status_code, &data),
        }
    }

    fn from_status(status_code: u16, data: &Value) -> Self {
        match status_code {
            401 => Self::new(ErrorCode::Unauthorized, "Please sign in", 401),
            403 => Self::new(ErrorCode::Forbidden, "You do not have access to this resource", 403),
            404 => Self::new(ErrorCode::NotFound, "The requested resource was not found", 404),
            422 => Self::new(ErrorCode::InvalidInput, "The submitted data is invalid", 422).with_details(data.clone()),
            500 => Self::new(ErrorCode::InternalError, "The server encountered an error", 500),
            _ => Self::new(
                ErrorCode::InternalError,
                data.get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("An unknown error occurred"),
                status_code,
            ),
        }
    }

    fn code_for_status(status_code: u16) -> ErrorCode {
        match status_code {
            401 => ErrorCode::Unauthorized,
            403 => ErrorCode::Forbidden,
            404 => ErrorCode::NotFound,
            400 | 422 => ErrorCode::InvalidInput,
            _ => ErrorCode::InternalError,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.code == ErrorCode::Unauthorized || self.status_code == 401
    }

    pub fn is_forbidden(&self) -> bool {
        self.code == ErrorCode::Forbidden || self.status_code == 403
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound || self.status_code == 404
    }

    pub fn is_network(&self) -> bool {
        self.code == ErrorCode::NetworkError
    }

    /// 4xx responses, which retrying cannot fix
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    /// Transport failures and 5xx responses
    pub fn is_retryable(&self) -> bool {
        self.is_network() || self.status_code >= 500
    }
}

pub type ApiResult<T> = Result<T, ApiException>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backend_envelope_code_is_kept() {
        let body = json!({
            "success": false,
            "error": { "code": "VALIDATION_ERROR", "message": "Validation failed", "details": { "title": ["Title is required"] } }
        });
        let error = ApiException::from_response(422, body.to_string().as_bytes());

        assert_eq!(error.code, ErrorCode::Validation);
        assert_eq!(error.message, "Validation failed");
        assert_eq!(error.status_code, 422);
        assert_eq!(error.details, Some(json!({ "title": ["Title is required"] })));
    }

    #[test]
    fn test_status_mapping_without_envelope() {
        assert_eq!(ApiException::from_response(401, b"").code, ErrorCode::Unauthorized);
        assert_eq!(ApiException::from_response(403, b"").code, ErrorCode::Forbidden);
        assert_eq!(ApiException::from_response(404, b"<html>").code, ErrorCode::NotFound);
        assert_eq!(ApiException::from_response(500, b"").code, ErrorCode::InternalError);

        let unprocessable = ApiException::from_response(422, br#"{"field":"bad"}"#);
        assert_eq!(unprocessable.code, ErrorCode::InvalidInput);
        assert_eq!(unprocessable.details, Some(json!({ "field": "bad" })));

        let teapot = ApiException::from_response(418, br#"{"message":"short and stout"}"#);
        assert_eq!(teapot.code, ErrorCode::InternalError);
        assert_eq!(teapot.message, "short and stout");
        assert_eq!(teapot.status_code, 418);
    }

    #[test]
    fn test_bare_error_string_keeps_message() {
        let error = ApiException::from_response(401, br#"{"error":"Unauthorized - No token provided"}"#);

        assert!(error.is_unauthorized());
        assert_eq!(error.message, "Unauthorized - No token provided");
    }

    #[test]
    fn test_predicates() {
        let network = ApiException::new(ErrorCode::NetworkError, "offline", 0);
        assert!(network.is_network());
        assert!(!network.is_client_error());

        let missing = ApiException::new(ErrorCode::Other("GONE".to_string()), "gone", 404);
        assert!(missing.is_not_found());
        assert!(missing.is_client_error());
        assert!(!missing.is_retryable());

        assert!(network.is_retryable());
        assert!(ApiException::new(ErrorCode::InternalError, "boom", 503).is_retryable());
        assert!(!ApiException::new(ErrorCode::InternalError, "bad url", 0).is_retryable());
        assert_eq!(missing.code.as_str(), "GONE");
    }
}
