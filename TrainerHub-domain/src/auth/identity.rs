//! Identity providers: who a token belongs to and how accounts are created
//!
//! The local provider keeps bcrypt credentials in the key-value store and signs its
//! own tokens. The remote provider delegates to a GoTrue-compatible service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};
use trainer_hub_data::repository::{Collection, Record, RepositoryError, SharedKvStore};

use crate::auth::logging::log_token_revocation;
use crate::auth::token::{SecurityError, TokenManager, TokenType};
use crate::auth::UserInfo;
use crate::entities::{new_id, AuthSession, SignUpRequest, User};

/// Failures reported by an identity provider
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Provider refused the request as malformed
    #[error("{0}")]
    Rejected(String),

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Security(#[from] SecurityError),

    #[error(transparent)]
    Storage(#[from] RepositoryError),

    /// Provider unreachable or answered unexpectedly
    #[error("Identity service error: {0}")]
    Upstream(String),
}

/// Source of truth for accounts and sessions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short name used in logs and `UserInfo::auth_source`
    fn name(&self) -> &'static str;

    /// Create an account and return its profile
    async fn sign_up(&self, request: &SignUpRequest) -> Result<User, IdentityError>;

    /// Exchange credentials for a session
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError>;

    /// Resolve an access token to the user it was issued for
    async fn get_user(&self, token: &str) -> Result<UserInfo, IdentityError>;

    /// Invalidate an access token
    async fn sign_out(&self, token: &str) -> Result<(), IdentityError>;

    /// Exchange a refresh token for a new session
    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, IdentityError>;
}

pub type SharedIdentityProvider = Arc<dyn IdentityProvider>;

/// Password hash stored under `credential:{email}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub email: String,
    pub user_id: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Record for Credential {
    const NAMESPACE: &'static str = "credential";

    fn owner(&self) -> &str {
        &self.email
    }

    fn id(&self) -> &str {
        &self.email
    }

    fn key_for(_owner: &str, email: &str) -> String {
        format!("credential:{}", email)
    }

    fn owner_prefix(_owner: &str) -> String {
        "credential:".to_string()
    }
}

/// Emails are matched case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Accounts kept in the key-value store, tokens signed locally
pub struct LocalIdentityProvider {
    credentials: Collection<Credential>,
    users: Collection<User>,
    tokens: TokenManager,
    bcrypt_cost: u32,
}

impl LocalIdentityProvider {
    pub fn new(store: SharedKvStore, tokens: TokenManager) -> Self {
        Self {
            credentials: Collection::new(store.clone()),
            users: Collection::new(store),
            tokens,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt work factor, mostly to keep tests fast
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    fn issue_session(&self, user: User) -> Result<AuthSession, IdentityError> {
        let token = self.tokens.generate_token(&user, TokenType::Access)?;
        let refresh_token = self.tokens.generate_token(&user, TokenType::Refresh)?;

        Ok(AuthSession {
            user,
            token,
            refresh_token,
            expires_in: self.tokens.access_token_ttl(),
        })
    }

    async fn load_user(&self, user_id: &str) -> Result<User, IdentityError> {
        self.users
            .get("", user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<User, IdentityError> {
        let email = normalize_email(&request.email);

        if self.credentials.get("", &email).await?.is_some() {
            return Err(IdentityError::EmailTaken(email));
        }

        let password = request.password.clone();
        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| IdentityError::Upstream(format!("Hashing task failed: {}", e)))?
            .map_err(|e| {
                error!("Failed to hash password: {}", e);
                IdentityError::Upstream("Failed to hash password".to_string())
            })?;

        let now = Utc::now();
        let user = User {
            id: new_id(),
            email: email.clone(),
            name: request.name.trim().to_string(),
            role: request.role,
            phone_number: request.phone_number.clone(),
            profile_image: None,
            created_at: now,
        };

        self.credentials
            .put(&Credential {
                email,
                user_id: user.id.clone(),
                password_hash,
                created_at: now,
            })
            .await?;
        self.users.put(&user).await?;

        info!("Registered local account {}", user.id);
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError> {
        let email = normalize_email(email);
        let credential = self
            .credentials
            .get("", &email)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        let password = password.to_string();
        let hash = credential.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| IdentityError::Upstream(format!("Hashing task failed: {}", e)))?
            .unwrap_or(false);

        if !matches {
            debug!("Password mismatch for {}", email);
            return Err(IdentityError::InvalidCredentials);
        }

        let user = self.load_user(&credential.user_id).await?;
        self.issue_session(user)
    }

    async fn get_user(&self, token: &str) -> Result<UserInfo, IdentityError> {
        let claims = self
            .tokens
            .validate_token_of_type(token, TokenType::Access)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        Ok(UserInfo::from_claims(&claims, self.name()))
    }

    async fn sign_out(&self, token: &str) -> Result<(), IdentityError> {
        let claims = self
            .tokens
            .validate_token(token)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;
        self.tokens.revoke_token(&claims);
        log_token_revocation(&claims.sub, Some("sign out"));
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, IdentityError> {
        let claims = self
            .tokens
            .validate_token_of_type(refresh_token, TokenType::Refresh)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        let user = self.load_user(&claims.sub).await?;

        // Refresh tokens are single use
        self.tokens.revoke_token(&claims);
        log_token_revocation(&claims.sub, Some("refresh token used"));
        self.issue_session(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::TokenConfig;
    use crate::entities::Role;
    use trainer_hub_data::repository::InMemoryKvStore;

    fn provider() -> LocalIdentityProvider {
        let store: SharedKvStore = Arc::new(InMemoryKvStore::new());
        LocalIdentityProvider::new(store, TokenManager::new(TokenConfig::new("identity-test-secret")))
            .with_bcrypt_cost(4)
    }

    fn sign_up_request(email: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.to_string(),
            password: "Passw0rdOk".to_string(),
            name: "Sam Trainer".to_string(),
            role: Role::Trainer,
            phone_number: None,
        }
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let provider = provider();
        let user = provider.sign_up(&sign_up_request("Sam@Example.com")).await.unwrap();
        assert_eq!(user.email, "sam@example.com");

        let session = provider.sign_in("sam@example.com", "Passw0rdOk").await.unwrap();
        assert_eq!(session.user.id, user.id);
        assert_eq!(session.expires_in, 900);

        let info = provider.get_user(&session.token).await.unwrap();
        assert_eq!(info.user_id, user.id);
        assert_eq!(info.role, Role::Trainer);
        assert_eq!(info.auth_source, "local");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let provider = provider();
        provider.sign_up(&sign_up_request("dup@example.com")).await.unwrap();

        let result = provider.sign_up(&sign_up_request("DUP@example.com")).await;
        assert!(matches!(result, Err(IdentityError::EmailTaken(_))));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email() {
        let provider = provider();
        provider.sign_up(&sign_up_request("a@example.com")).await.unwrap();

        assert!(matches!(
            provider.sign_in("a@example.com", "nope").await,
            Err(IdentityError::InvalidCredentials)
        ));
        assert!(matches!(
            provider.sign_in("b@example.com", "Passw0rdOk").await,
            Err(IdentityError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_sign_out_revokes_token() {
        let provider = provider();
        provider.sign_up(&sign_up_request("out@example.com")).await.unwrap();
        let session = provider.sign_in("out@example.com", "Passw0rdOk").await.unwrap();

        provider.sign_out(&session.token).await.unwrap();

        assert!(matches!(
            provider.get_user(&session.token).await,
            Err(IdentityError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_rotates_refresh_token() {
        let provider = provider();
        provider.sign_up(&sign_up_request("r@example.com")).await.unwrap();
        let session = provider.sign_in("r@example.com", "Passw0rdOk").await.unwrap();

        // An access token cannot be used to refresh
        assert!(provider.refresh(&session.token).await.is_err());

        let renewed = provider.refresh(&session.refresh_token).await.unwrap();
        assert!(provider.get_user(&renewed.token).await.is_ok());
        assert!(provider.refresh(&session.refresh_token).await.is_err());
    }
}
