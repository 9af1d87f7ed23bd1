pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tracing::info;
use trainer_hub_data::repository::{create_kv_store, SharedKvStore};
use trainer_hub_domain::auth::{
    IdentityError, LocalIdentityProvider, RemoteIdentityConfig, RemoteIdentityProvider, SharedIdentityProvider,
    TokenManager,
};

use crate::config::{AppConfig, ConfigError, IdentityBackend};
use state::AppState;

/// Timeout for calls to a remote identity service
const IDENTITY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Identity provider unavailable: {0}")]
    Identity(#[from] IdentityError),
}

/// Build the identity provider selected by the configuration
pub fn create_identity_provider(
    config: &AppConfig,
    store: SharedKvStore,
) -> Result<SharedIdentityProvider, StartupError> {
    match config.identity {
        IdentityBackend::Local => {
            info!("Using local identity provider");
            let tokens = TokenManager::new(config.tokens.clone());
            Ok(Arc::new(LocalIdentityProvider::new(store, tokens)))
        }
        IdentityBackend::Remote => {
            let url = config.identity_url.clone().ok_or(ConfigError::Missing("IDENTITY_URL"))?;
            let api_key = config
                .identity_api_key
                .clone()
                .ok_or(ConfigError::Missing("IDENTITY_API_KEY"))?;
            info!("Using remote identity provider at {}", url);
            let provider = RemoteIdentityProvider::new(RemoteIdentityConfig {
                url,
                api_key,
                timeout: IDENTITY_TIMEOUT,
            })?;
            Ok(Arc::new(provider))
        }
    }
}

/// Create the application router
pub fn create_application(config: &AppConfig) -> Result<Router, StartupError> {
    let store = create_kv_store(&config.database);
    let identity = create_identity_provider(config, store.clone())?;
    let state = AppState::new(store, identity).with_secure_cookies(config.is_production());

    Ok(routes::create_app(state, config))
}
