//! Server configuration read from the environment
//!
//! `.env` is loaded by the binary before [`AppConfig::from_env`] runs. Every setting has a
//! development default except the identity service coordinates, which are required when
//! `IDENTITY_PROVIDER=remote`.

use std::env;
use std::str::FromStr;

use thiserror::Error;
use tracing::{info, warn};
use trainer_hub_data::database::{DatabaseConfig, DatabaseError};
use trainer_hub_domain::auth::token::DEFAULT_JWT_SECRET;
use trainer_hub_domain::auth::TokenConfig;

/// Mount point of the serverless function surface
pub const DEFAULT_FUNCTIONS_PREFIX: &str = "/functions";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Insecure configuration: {0}")]
    Insecure(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Deployment environment from `APP_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue {
                name: "APP_ENV",
                value: s.to_string(),
            }),
        }
    }
}

/// Which identity provider validates credentials and tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityBackend {
    /// Accounts and JWTs managed by this service
    Local,
    /// Hosted identity service reached over HTTP
    Remote,
}

impl FromStr for IdentityBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(IdentityBackend::Local),
            "remote" => Ok(IdentityBackend::Remote),
            _ => Err(ConfigError::InvalidValue {
                name: "IDENTITY_PROVIDER",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub tokens: TokenConfig,
    /// Empty means any origin
    pub cors_allowed_origins: Vec<String>,
    pub identity: IdentityBackend,
    pub identity_url: Option<String>,
    pub identity_api_key: Option<String>,
    pub database: DatabaseConfig,
    pub functions_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: Environment::Development,
            tokens: TokenConfig::new(DEFAULT_JWT_SECRET),
            cors_allowed_origins: Vec::new(),
            identity: IdentityBackend::Local,
            identity_url: None,
            identity_api_key: None,
            database: DatabaseConfig::default(),
            functions_prefix: DEFAULT_FUNCTIONS_PREFIX.to_string(),
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        None => Ok(default),
    }
}

impl AppConfig {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let environment = match get("APP_ENV") {
            Some(value) => value.parse()?,
            None => defaults.environment,
        };

        let secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None if environment == Environment::Production => return Err(ConfigError::Missing("JWT_SECRET")),
            None => {
                warn!("JWT_SECRET is not set, using the development secret");
                DEFAULT_JWT_SECRET.to_string()
            }
        };
        let mut tokens = TokenConfig::new(secret);
        if let Some(issuer) = get("JWT_ISSUER") {
            tokens.issuer = issuer;
        }
        tokens.access_token_minutes = parse_or(
            get("ACCESS_TOKEN_EXPIRATION_MINUTES"),
            "ACCESS_TOKEN_EXPIRATION_MINUTES",
            tokens.access_token_minutes,
        )?;
        tokens.refresh_token_days = parse_or(
            get("REFRESH_TOKEN_EXPIRATION_DAYS"),
            "REFRESH_TOKEN_EXPIRATION_DAYS",
            tokens.refresh_token_days,
        )?;

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let database = DatabaseConfig::from_lookup(&lookup)?;

        let mut functions_prefix = get("FUNCTIONS_PREFIX").unwrap_or(defaults.functions_prefix);
        if !functions_prefix.starts_with('/') {
            functions_prefix.insert(0, '/');
        }
        let functions_prefix = functions_prefix.trim_end_matches('/').to_string();

        let config = Self {
            host: get("SERVER_HOST").unwrap_or(defaults.host),
            port: parse_or(get("PORT"), "PORT", defaults.port)?,
            environment,
            tokens,
            cors_allowed_origins,
            identity: parse_or(get("IDENTITY_PROVIDER"), "IDENTITY_PROVIDER", defaults.identity)?,
            identity_url: get("IDENTITY_URL"),
            identity_api_key: get("IDENTITY_API_KEY"),
            database,
            functions_prefix,
        };

        config.validate()?;
        info!(
            "Configuration loaded: env={}, identity={:?}, store={:?}",
            config.environment.as_str(),
            config.identity,
            config.database.db_type
        );
        Ok(config)
    }

    /// Reject combinations that cannot run safely
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_production() && self.tokens.secret == DEFAULT_JWT_SECRET {
            return Err(ConfigError::Insecure(
                "the default JWT secret cannot be used in production".to_string(),
            ));
        }
        if self.functions_prefix.len() < 2 {
            return Err(ConfigError::InvalidValue {
                name: "FUNCTIONS_PREFIX",
                value: self.functions_prefix.clone(),
            });
        }
        if self.identity == IdentityBackend::Remote {
            if self.identity_url.is_none() {
                return Err(ConfigError::Missing("IDENTITY_URL"));
            }
            if self.identity_api_key.is_none() {
                return Err(ConfigError::Missing("IDENTITY_API_KEY"));
            }
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use trainer_hub_data::database::DatabaseType;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.identity, IdentityBackend::Local);
        assert_eq!(config.functions_prefix, "/functions");
        assert!(config.cors_allowed_origins.is_empty());
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_reads_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("JWT_SECRET", "s3cret"),
            ("ACCESS_TOKEN_EXPIRATION_MINUTES", "30"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ("FUNCTIONS_PREFIX", "make-server/"),
            ("DB_TYPE", "memory"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.tokens.secret, "s3cret");
        assert_eq!(config.tokens.access_token_minutes, 30);
        assert_eq!(config.cors_allowed_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(config.functions_prefix, "/make-server");
        assert_eq!(config.database.db_type, DatabaseType::Memory);
    }

    #[test]
    fn test_production_requires_real_secret() {
        assert!(matches!(
            config_from(&[("APP_ENV", "production")]),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
        assert!(matches!(
            config_from(&[("APP_ENV", "production"), ("JWT_SECRET", DEFAULT_JWT_SECRET)]),
            Err(ConfigError::Insecure(_))
        ));
        assert!(config_from(&[("APP_ENV", "production"), ("JWT_SECRET", "long-random-value")]).is_ok());
    }

    #[test]
    fn test_remote_identity_needs_coordinates() {
        assert!(matches!(
            config_from(&[("IDENTITY_PROVIDER", "remote")]),
            Err(ConfigError::Missing("IDENTITY_URL"))
        ));
        let config = config_from(&[
            ("IDENTITY_PROVIDER", "remote"),
            ("IDENTITY_URL", "https://id.example"),
            ("IDENTITY_API_KEY", "key"),
        ])
        .unwrap();
        assert_eq!(config.identity, IdentityBackend::Remote);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        assert!(matches!(
            config_from(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidValue { name: "PORT", .. })
        ));
        assert!(matches!(
            config_from(&[("IDENTITY_PROVIDER", "ldap")]),
            Err(ConfigError::InvalidValue { name: "IDENTITY_PROVIDER", .. })
        ));
    }
}
