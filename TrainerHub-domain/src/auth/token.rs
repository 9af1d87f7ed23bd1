use std::env;
use std::time::{Duration as StdDuration, UNIX_EPOCH};

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::auth::token_blacklist;
use crate::auth::Claims;
use crate::entities::User;

/// Placeholder secret shipped in sample configuration, never valid in production
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// Security errors for authentication and token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// Token used for the wrong purpose
    #[error("Expected a {0} token")]
    WrongTokenType(&'static str),

    /// Configuration error
    #[error("Security configuration error: {0}")]
    ConfigError(String),

    /// Token has been revoked
    #[error("Token has been revoked")]
    TokenRevoked,
}

/// Token types for authentication
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived access token
    Access,
    /// Long-lived refresh token
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// Signing settings for locally issued tokens
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub issuer: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: "trainer-hub-api".to_string(),
            access_token_minutes: 15,
            refresh_token_days: 7,
        }
    }

    /// Read `JWT_SECRET`, `JWT_ISSUER` and the token lifetimes from the environment
    pub fn from_env() -> Result<Self, SecurityError> {
        let secret = env::var("JWT_SECRET").map_err(|e| {
            error!("JWT_SECRET environment variable not found: {}", e);
            SecurityError::ConfigError("JWT_SECRET environment variable not found".to_string())
        })?;

        let mut config = Self::new(secret);

        if let Ok(issuer) = env::var("JWT_ISSUER") {
            config.issuer = issuer;
        }

        config.access_token_minutes = env::var("ACCESS_TOKEN_EXPIRATION_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(config.access_token_minutes);

        config.refresh_token_days = env::var("REFRESH_TOKEN_EXPIRATION_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(config.refresh_token_days);

        Ok(config)
    }

    /// Get the expiration duration for a token type
    pub fn expiration(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => Duration::minutes(self.access_token_minutes),
            TokenType::Refresh => Duration::days(self.refresh_token_days),
        }
    }
}

/// Issues, validates and revokes HS256 tokens
#[derive(Debug, Clone)]
pub struct TokenManager {
    config: TokenConfig,
}

impl TokenManager {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Access token lifetime in seconds
    pub fn access_token_ttl(&self) -> i64 {
        self.config.expiration(TokenType::Access).num_seconds()
    }

    /// Generate a new JWT for the user
    pub fn generate_token(&self, user: &User, token_type: TokenType) -> Result<String, SecurityError> {
        let now = Utc::now();
        let expiration = now + self.config.expiration(token_type);

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: Some(user.name.clone()),
            role: user.role,
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| {
            error!("Failed to encode JWT token: {}", e);
            SecurityError::TokenValidation(e.to_string())
        })?;

        // Never log the token itself
        info!("Generated {:?} token for user {}", token_type, user.id);
        debug!("Token expiration: {}", expiration);

        Ok(token)
    }

    /// Validate a JWT and return the decoded claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, SecurityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[self.config.issuer.as_str()]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidToken => SecurityError::InvalidToken,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                SecurityError::TokenValidation("Invalid signature".to_string())
            }
            _ => SecurityError::TokenValidation(e.to_string()),
        })?;

        if is_token_revoked(&token_data.claims.jti) {
            return Err(SecurityError::TokenRevoked);
        }

        Ok(token_data.claims)
    }

    /// Validate a token and require it to be of the given type
    pub fn validate_token_of_type(&self, token: &str, token_type: TokenType) -> Result<Claims, SecurityError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != token_type {
            return Err(SecurityError::WrongTokenType(token_type.as_str()));
        }
        Ok(claims)
    }

    /// Revoke one token until it would have expired anyway
    pub fn revoke_token(&self, claims: &Claims) {
        info!("Revoking {:?} token for user {}", claims.token_type, claims.sub);
        let expiration = UNIX_EPOCH + StdDuration::from_secs(claims.exp.max(0) as u64);
        token_blacklist::blacklist().revoke_token(&claims.jti, expiration);
    }
}

/// Check if a token has been revoked
fn is_token_revoked(jti: &str) -> bool {
    let is_revoked = token_blacklist::blacklist().is_revoked(jti);
    debug!("Checking if token {} is revoked: {}", jti, is_revoked);
    is_revoked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Role;

    fn manager() -> TokenManager {
        let mut config = TokenConfig::new("test_secret_key_for_testing_only");
        config.issuer = "test-issuer".to_string();
        TokenManager::new(config)
    }

    fn user() -> User {
        User {
            id: "test-user-123".to_string(),
            email: "coach@example.com".to_string(),
            name: "Coach".to_string(),
            role: Role::Trainer,
            phone_number: None,
            profile_image: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_generate_and_validate_token() {
        let manager = manager();
        let token = manager.generate_token(&user(), TokenType::Access).unwrap();
        assert!(!token.is_empty());

        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "test-user-123");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.role, Role::Trainer);
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn test_token_expiration() {
        let manager = manager();
        let claims = Claims {
            sub: "test-user-456".to_string(),
            email: "x@example.com".to_string(),
            name: None,
            role: Role::Trainee,
            iss: "test-issuer".to_string(),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
            jti: "expired".to_string(),
            token_type: TokenType::Access,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test_secret_key_for_testing_only"),
        )
        .unwrap();

        match manager.validate_token(&token) {
            Err(SecurityError::TokenExpired) => {}
            other => panic!("Expected TokenExpired error but got: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_token() {
        match manager().validate_token("invalid.token.format") {
            Err(SecurityError::InvalidToken) | Err(SecurityError::TokenValidation(_)) => {}
            other => panic!("Expected InvalidToken or TokenValidation error, got {:?}", other),
        }
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let other = TokenManager::new(TokenConfig {
            secret: "another-secret".to_string(),
            ..manager().config().clone()
        });
        let token = other.generate_token(&user(), TokenType::Access).unwrap();
        assert!(manager().validate_token(&token).is_err());
    }

    #[test]
    fn test_revoked_token_is_rejected() {
        let manager = manager();
        let token = manager.generate_token(&user(), TokenType::Access).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        manager.revoke_token(&claims);

        assert!(matches!(manager.validate_token(&token), Err(SecurityError::TokenRevoked)));
    }

    #[test]
    fn test_refresh_token_type_is_enforced() {
        let manager = manager();
        let access = manager.generate_token(&user(), TokenType::Access).unwrap();
        let refresh = manager.generate_token(&user(), TokenType::Refresh).unwrap();

        assert!(manager.validate_token_of_type(&refresh, TokenType::Refresh).is_ok());
        assert!(matches!(
            manager.validate_token_of_type(&access, TokenType::Refresh),
            Err(SecurityError::WrongTokenType("refresh"))
        ));
    }

    #[test]
    fn test_token_lifetimes() {
        let config = TokenConfig::new("s");
        assert_eq!(config.expiration(TokenType::Access), Duration::minutes(15));
        assert_eq!(config.expiration(TokenType::Refresh), Duration::days(7));
        assert_eq!(TokenManager::new(config).access_token_ttl(), 900);
    }
}
