//! Authentication and authorization
//!
//! Tokens are checked by an [`identity::IdentityProvider`]; the middleware places the
//! resulting [`UserInfo`] in request extensions for handlers and role checks.

use axum::http::{header, HeaderName, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::Role;

pub mod authorize;
pub mod identity;
pub mod logging;
pub mod middleware;
pub mod password;
#[cfg(feature = "with-remote-identity")]
pub mod remote;
pub mod token;
pub mod token_blacklist;

pub use authorize::{require_roles, trainee_only, trainer_only};
pub use identity::{IdentityError, IdentityProvider, LocalIdentityProvider, SharedIdentityProvider};
pub use middleware::{auth_middleware, extract_token, function_auth, optional_auth};
#[cfg(feature = "with-remote-identity")]
pub use remote::{RemoteIdentityConfig, RemoteIdentityProvider};
pub use token::{SecurityError, TokenConfig, TokenManager, TokenType};

/// Cookie carrying the access token for browser clients
pub const AUTH_COOKIE: &str = "auth_token";

/// Claims of locally issued tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Token id, the unit of revocation
    pub jti: String,
    pub token_type: TokenType,
}

/// Authenticated caller, inserted into request extensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    /// Provider that vouched for the token (`local` or `remote`)
    pub auth_source: String,
}

impl UserInfo {
    pub fn from_claims(claims: &Claims, auth_source: &str) -> Self {
        Self {
            user_id: claims.sub.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
            role: claims.role,
            auth_source: auth_source.to_string(),
        }
    }
}

/// Raw token the request was authenticated with
#[derive(Debug, Clone)]
pub struct AccessToken(pub String);

/// Apply CORS and security headers to the application
///
/// An empty origin list, or one containing `*`, allows any origin.
pub fn configure_auth(app: axum::Router, allowed_origins: &[String]) -> axum::Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    let allow_origin = if origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(std::time::Duration::from_secs(600));

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=63072000; includeSubDomains"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
        ));

    app.layer(cors).layer(security_headers)
}
