//! Audit trail for sign-in, token and role-check activity
//!
//! Every record goes to the `auth_audit` tracing target so it can be filtered apart
//! from request logs, e.g. `RUST_LOG=info,auth_audit=debug`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::entities::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEventType {
    Login,
    FailedLogin,
    Logout,
    Registration,
    TokenRefresh,
    /// A token was put on the revocation list
    TokenRevocation,
    /// Bearer or cookie token checked on a protected route
    TokenValidation,
    /// Caller's role is not allowed on the route
    AccessDenied,
}

impl AuthEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthEventType::Login => "LOGIN",
            AuthEventType::FailedLogin => "FAILED_LOGIN",
            AuthEventType::Logout => "LOGOUT",
            AuthEventType::Registration => "REGISTRATION",
            AuthEventType::TokenRefresh => "TOKEN_REFRESH",
            AuthEventType::TokenRevocation => "TOKEN_REVOCATION",
            AuthEventType::TokenValidation => "TOKEN_VALIDATION",
            AuthEventType::AccessDenied => "ACCESS_DENIED",
        }
    }
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    /// User id, or the submitted email for failed logins
    pub subject: Option<String>,
    pub role: Option<Role>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub details: Option<String>,
    /// Request path for middleware events
    pub path: Option<String>,
    pub elapsed_ms: Option<u64>,
    /// Component that produced the event: `password`, `identity`, `role`, or a provider name
    pub source: Option<String>,
}

impl AuthEvent {
    pub fn new(event_type: AuthEventType, subject: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            subject: subject.map(String::from),
            role: None,
            timestamp: Utc::now(),
            success,
            details: None,
            path: None,
            elapsed_ms: None,
            source: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn at_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_elapsed(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = Some(elapsed_ms);
        self
    }

    pub fn via(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Emit an audit record; failures go out at warn level
pub fn log_auth_event(event: AuthEvent) {
    let subject = event.subject.as_deref().unwrap_or("anonymous");
    let role = event.role.map(|r| r.as_str()).unwrap_or("-");
    let path = event.path.as_deref().unwrap_or("-");
    let source = event.source.as_deref().unwrap_or("-");
    let details = event.details.as_deref().unwrap_or("");

    if event.success {
        info!(
            target: "auth_audit",
            event_type = %event.event_type,
            subject,
            role,
            source,
            elapsed_ms = event.elapsed_ms,
            "{} ok for {} at {} {}",
            event.event_type,
            subject,
            path,
            details
        );
    } else {
        warn!(
            target: "auth_audit",
            event_type = %event.event_type,
            subject,
            role,
            source,
            elapsed_ms = event.elapsed_ms,
            "{} rejected for {} at {} {}",
            event.event_type,
            subject,
            path,
            details
        );
    }
}

pub fn log_successful_login(user_id: &str, role: Role) {
    log_auth_event(
        AuthEvent::new(AuthEventType::Login, Some(user_id), true)
            .with_role(role)
            .via("password"),
    );
}

pub fn log_failed_login(email: &str, reason: &str) {
    log_auth_event(
        AuthEvent::new(AuthEventType::FailedLogin, Some(email), false)
            .with_details(reason)
            .via("password"),
    );
}

/// `provider` is the identity backend that created the account
pub fn log_registration(user_id: &str, provider: &str) {
    log_auth_event(AuthEvent::new(AuthEventType::Registration, Some(user_id), true).via(provider));
}

pub fn log_token_refresh(user_id: &str, success: bool, details: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::TokenRefresh, Some(user_id), success);
    if let Some(d) = details {
        event = event.with_details(d);
    }
    log_auth_event(event);
}

pub fn log_logout(user_id: &str) {
    log_auth_event(AuthEvent::new(AuthEventType::Logout, Some(user_id), true));
}

pub fn log_token_revocation(user_id: &str, reason: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::TokenRevocation, Some(user_id), true);
    if let Some(r) = reason {
        event = event.with_details(r);
    }
    log_auth_event(event);
}

/// A signed-in user hit a route reserved for other roles
pub fn log_access_denied(user_id: &str, role: Role, path: &str, allowed: &[Role]) {
    let allowed: Vec<&str> = allowed.iter().map(|r| r.as_str()).collect();
    log_auth_event(
        AuthEvent::new(AuthEventType::AccessDenied, Some(user_id), false)
            .with_role(role)
            .at_path(path)
            .with_details(format!("allowed roles: {}", allowed.join(", ")))
            .via("role"),
    );
}
