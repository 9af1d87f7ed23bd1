use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument, warn};
use trainer_hub_data::repository::Collection;
use validator::Validate;

use crate::auth::logging::{log_failed_login, log_logout, log_registration, log_successful_login, log_token_refresh};
use crate::auth::password::validate_password_strength;
use crate::auth::{SharedIdentityProvider, UserInfo};
use crate::entities::{AuthSession, LoginRequest, RefreshRequest, Role, SignUpRequest, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::Repositories;

/// Account operations behind `/auth`
#[async_trait]
pub trait AuthServiceTrait: Send + Sync {
    /// Create an account; the password must pass the strength rule
    async fn register(&self, request: SignUpRequest) -> ServiceResult<User>;

    /// Exchange email and password for a session
    async fn login(&self, request: LoginRequest) -> ServiceResult<AuthSession>;

    /// Invalidate the token the caller presented
    async fn logout(&self, user: &UserInfo, token: &str) -> ServiceResult<()>;

    /// Profile of the authenticated user
    async fn me(&self, user: &UserInfo) -> ServiceResult<User>;

    /// Exchange a refresh token for a new session
    async fn refresh(&self, request: RefreshRequest) -> ServiceResult<AuthSession>;
}

pub struct AuthService {
    identity: SharedIdentityProvider,
    users: Collection<User>,
}

impl AuthService {
    pub fn new(identity: SharedIdentityProvider, repos: &Repositories) -> Self {
        Self {
            identity,
            users: repos.users.clone(),
        }
    }

    /// Make sure a profile exists for accounts created outside this service
    async fn ensure_profile(&self, user: &User) -> ServiceResult<()> {
        if self.users.get("", &user.id).await?.is_none() {
            info!("Creating missing profile for user {}", user.id);
            self.users.put(user).await?;
        }
        Ok(())
    }
}

fn check_sign_up(request: &SignUpRequest) -> ServiceResult<()> {
    let mut problems: Vec<String> = Vec::new();

    if let Err(errors) = request.validate() {
        for field_errors in errors.field_errors().values() {
            for e in field_errors.iter() {
                problems.push(
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                );
            }
        }
    }
    if let Err(password_problems) = validate_password_strength(&request.password) {
        problems.extend(password_problems.into_iter().map(str::to_string));
    }
    if request.role == Role::Admin {
        problems.push("Role must be trainer or trainee".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::InvalidInput(problems.join("; ")))
    }
}

#[async_trait]
impl AuthServiceTrait for AuthService {
    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn register(&self, request: SignUpRequest) -> ServiceResult<User> {
        check_sign_up(&request)?;

        let user = self.identity.sign_up(&request).await?;
        self.ensure_profile(&user).await?;

        log_registration(&user.id, self.identity.name());
        Ok(user)
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    async fn login(&self, request: LoginRequest) -> ServiceResult<AuthSession> {
        request.validate()?;

        match self.identity.sign_in(&request.username, &request.password).await {
            Ok(session) => {
                self.ensure_profile(&session.user).await?;
                log_successful_login(&session.user.id, session.user.role);
                Ok(session)
            }
            Err(e) => {
                log_failed_login(&request.username, &e.to_string());
                Err(e.into())
            }
        }
    }

    async fn logout(&self, user: &UserInfo, token: &str) -> ServiceResult<()> {
        self.identity.sign_out(token).await?;
        log_logout(&user.user_id);
        Ok(())
    }

    async fn me(&self, user: &UserInfo) -> ServiceResult<User> {
        if let Some(profile) = self.users.get("", &user.user_id).await? {
            return Ok(profile);
        }

        warn!("No stored profile for user {}, answering from token claims", user.user_id);
        Ok(User {
            id: user.user_id.clone(),
            email: user.email.clone(),
            name: user.name.clone().unwrap_or_default(),
            role: user.role,
            phone_number: None,
            profile_image: None,
            created_at: Utc::now(),
        })
    }

    async fn refresh(&self, request: RefreshRequest) -> ServiceResult<AuthSession> {
        request.validate()?;

        match self.identity.refresh(&request.refresh_token).await {
            Ok(session) => {
                log_token_refresh(&session.user.id, true, None);
                Ok(session)
            }
            Err(e) => {
                log_token_refresh("unknown", false, Some(&e.to_string()));
                Err(e.into())
            }
        }
    }
}

/// Build the auth service over the configured identity provider
pub fn create_auth_service(identity: SharedIdentityProvider, repos: &Repositories) -> impl AuthServiceTrait {
    AuthService::new(identity, repos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::auth::identity::{IdentityError, MockIdentityProvider};
    use crate::auth::{LocalIdentityProvider, TokenConfig, TokenManager};
    use trainer_hub_data::repository::{InMemoryKvStore, SharedKvStore};

    fn setup() -> (AuthService, Repositories) {
        let store: SharedKvStore = Arc::new(InMemoryKvStore::new());
        let repos = Repositories::new(store.clone());
        let provider = LocalIdentityProvider::new(store, TokenManager::new(TokenConfig::new("auth-service-secret")))
            .with_bcrypt_cost(4);
        (AuthService::new(Arc::new(provider), &repos), repos)
    }

    fn sign_up(email: &str, password: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: "Riley".to_string(),
            role: Role::Trainee,
            phone_number: None,
        }
    }

    fn info_for(user: &User) -> UserInfo {
        UserInfo {
            user_id: user.id.clone(),
            email: user.email.clone(),
            name: Some(user.name.clone()),
            role: user.role,
            auth_source: "local".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_login_and_me() {
        let (service, repos) = setup();

        let user = service.register(sign_up("riley@example.com", "Str0ngPass")).await.unwrap();
        assert!(repos.users.get("", &user.id).await.unwrap().is_some());

        let session = service
            .login(LoginRequest {
                username: "riley@example.com".to_string(),
                password: "Str0ngPass".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(session.user.id, user.id);
        assert!(!session.refresh_token.is_empty());

        let profile = service.me(&info_for(&user)).await.unwrap();
        assert_eq!(profile.email, "riley@example.com");
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password_and_bad_email() {
        let (service, _) = setup();

        let err = service.register(sign_up("riley@example.com", "weak")).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
        assert!(err.to_string().contains("at least 8 characters"));

        let err = service.register(sign_up("not-an-email", "Str0ngPass")).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let (service, _) = setup();
        service.register(sign_up("dup@example.com", "Str0ngPass")).await.unwrap();

        let err = service.register(sign_up("DUP@example.com", "Str0ngPass")).await.unwrap_err();
        assert_eq!(err.code(), "CONFLICT");
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let (service, _) = setup();
        service.register(sign_up("riley@example.com", "Str0ngPass")).await.unwrap();

        let err = service
            .login(LoginRequest {
                username: "riley@example.com".to_string(),
                password: "Wr0ngPass".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn test_refresh_issues_new_session() {
        let (service, _) = setup();
        service.register(sign_up("riley@example.com", "Str0ngPass")).await.unwrap();
        let session = service
            .login(LoginRequest {
                username: "riley@example.com".to_string(),
                password: "Str0ngPass".to_string(),
            })
            .await
            .unwrap();

        let refreshed = service
            .refresh(RefreshRequest {
                refresh_token: session.refresh_token.clone(),
            })
            .await
            .unwrap();
        assert_eq!(refreshed.user.id, session.user.id);

        // The used refresh token is spent
        let err = service
            .refresh(RefreshRequest {
                refresh_token: session.refresh_token,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_remote_sign_up_gets_a_local_profile() {
        let store: SharedKvStore = Arc::new(InMemoryKvStore::new());
        let repos = Repositories::new(store);

        let mut provider = MockIdentityProvider::new();
        provider.expect_name().return_const("remote");
        provider.expect_sign_up().returning(|request| {
            Ok(User {
                id: "remote-1".to_string(),
                email: request.email.clone(),
                name: request.name.clone(),
                role: request.role,
                phone_number: None,
                profile_image: None,
                created_at: Utc::now(),
            })
        });

        let service = AuthService::new(Arc::new(provider), &repos);
        service.register(sign_up("remote@example.com", "Str0ngPass")).await.unwrap();

        let stored = repos.users.get("", "remote-1").await.unwrap().unwrap();
        assert_eq!(stored.email, "remote@example.com");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_internal() {
        let store: SharedKvStore = Arc::new(InMemoryKvStore::new());
        let repos = Repositories::new(store);

        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_in()
            .returning(|_, _| Err(IdentityError::Upstream("connection refused".to_string())));

        let service = AuthService::new(Arc::new(provider), &repos);
        let err = service
            .login(LoginRequest {
                username: "a@example.com".to_string(),
                password: "Str0ngPass".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn test_me_falls_back_to_claims() {
        let (service, _) = setup();
        let info = UserInfo {
            user_id: "ghost".to_string(),
            email: "ghost@example.com".to_string(),
            name: None,
            role: Role::Trainer,
            auth_source: "remote".to_string(),
        };
        let user = service.me(&info).await.unwrap();
        assert_eq!(user.id, "ghost");
        assert_eq!(user.role, Role::Trainer);
    }
}
