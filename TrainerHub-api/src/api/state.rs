use std::sync::Arc;

use trainer_hub_data::repository::SharedKvStore;
use trainer_hub_domain::auth::SharedIdentityProvider;
use trainer_hub_domain::health::{HealthService, HealthServiceTrait};
use trainer_hub_domain::repositories::Repositories;
use trainer_hub_domain::services::{
    AuthService, AuthServiceTrait, RecordsService, RecordsServiceTrait, TraineeService, TraineeServiceTrait,
    TrainerService, TrainerServiceTrait,
};

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthServiceTrait>,
    pub trainee: Arc<dyn TraineeServiceTrait>,
    pub trainer: Arc<dyn TrainerServiceTrait>,
    pub records: Arc<dyn RecordsServiceTrait>,
    pub health: Arc<dyn HealthServiceTrait>,
    pub identity: SharedIdentityProvider,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
}

impl AppState {
    /// Wire the store-backed services around one store and identity provider
    pub fn new(store: SharedKvStore, identity: SharedIdentityProvider) -> Self {
        let repos = Repositories::new(store.clone());

        Self {
            auth: Arc::new(AuthService::new(identity.clone(), &repos)),
            trainee: Arc::new(TraineeService::new(repos.clone())),
            trainer: Arc::new(TrainerService::new(repos.clone())),
            records: Arc::new(RecordsService::new(repos, identity.clone())),
            health: Arc::new(HealthService::new(store)),
            identity,
            secure_cookies: false,
        }
    }

    pub fn with_health(mut self, health: Arc<dyn HealthServiceTrait>) -> Self {
        self.health = health;
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}
