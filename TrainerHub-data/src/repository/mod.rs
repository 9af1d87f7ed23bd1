// Repository module structure
pub mod errors;
mod collection;
mod in_memory;
mod storage;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::database::{self, DatabaseConfig, DatabaseType};

// Re-export commonly used types
pub use collection::{Collection, Record};
pub use errors::RepositoryError;
pub use in_memory::InMemoryKvStore;
pub use storage::SqliteKvStore;

/// Shared handle to a key-value store
pub type SharedKvStore = Arc<dyn KvStore>;

/// Generic key-value store holding JSON documents
///
/// Keys are plain strings and scans by prefix return entries ordered by key.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a single value
    async fn get(&self, key: &str) -> Result<Option<Value>, RepositoryError>;

    /// Insert or replace a value
    async fn set(&self, key: &str, value: Value) -> Result<(), RepositoryError>;

    /// Remove a value; missing keys are ignored
    async fn delete(&self, key: &str) -> Result<(), RepositoryError>;

    /// All entries whose key starts with `prefix`
    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<(String, Value)>, RepositoryError>;

    /// Read several values, preserving the order of `keys`
    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Value>>, RepositoryError> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(self.get(key).await?);
        }
        Ok(values)
    }

    /// Insert or replace several values
    async fn mset(&self, entries: Vec<(String, Value)>) -> Result<(), RepositoryError> {
        for (key, value) in entries {
            self.set(&key, value).await?;
        }
        Ok(())
    }

    /// Remove several values
    async fn mdel(&self, keys: &[String]) -> Result<(), RepositoryError> {
        for key in keys {
            self.delete(key).await?;
        }
        Ok(())
    }
}

/// Build the store selected by the configuration
///
/// Falls back to the in-memory store when the SQLite database cannot be opened.
pub fn create_kv_store(config: &DatabaseConfig) -> SharedKvStore {
    match config.db_type {
        DatabaseType::Memory => {
            info!("Using in-memory key-value store");
            Arc::new(InMemoryKvStore::new())
        }
        DatabaseType::Sqlite => {
            let pool = match database::get_db_pool() {
                Ok(pool) => Ok(pool),
                Err(_) => database::initialize_database_pool(config),
            };

            match pool {
                Ok(pool) => {
                    info!("Using SQLite key-value store");
                    Arc::new(SqliteKvStore::new(pool))
                }
                Err(e) => {
                    warn!("SQLite store unavailable ({}), falling back to in-memory store", e);
                    Arc::new(InMemoryKvStore::new())
                }
            }
        }
    }
}

/// Test doubles for code built on top of the store
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;

    /// Store whose every operation fails, for exercising error paths
    #[derive(Debug, Default, Clone)]
    pub struct FailingKvStore;

    #[async_trait]
    impl KvStore for FailingKvStore {
        async fn get(&self, _key: &str) -> Result<Option<Value>, RepositoryError> {
            Err(RepositoryError::Unavailable("store is offline".to_string()))
        }

        async fn set(&self, _key: &str, _value: Value) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("store is offline".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("store is offline".to_string()))
        }

        async fn get_by_prefix(&self, _prefix: &str) -> Result<Vec<(String, Value)>, RepositoryError> {
            Err(RepositoryError::Unavailable("store is offline".to_string()))
        }
    }
}

#[cfg(test)]
mod factory_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_memory_store() {
        let config = DatabaseConfig {
            db_type: DatabaseType::Memory,
            ..DatabaseConfig::default()
        };
        let store = create_kv_store(&config);
        store.set("k", serde_json::json!(1)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(serde_json::json!(1)));
    }

    #[tokio::test]
    async fn test_default_batch_operations() {
        let store = InMemoryKvStore::new();
        store
            .mset(vec![
                ("a".to_string(), serde_json::json!("x")),
                ("b".to_string(), serde_json::json!("y")),
            ])
            .await
            .unwrap();

        let values = store
            .mget(&["b".to_string(), "missing".to_string(), "a".to_string()])
            .await
            .unwrap();
        assert_eq!(values, vec![Some(serde_json::json!("y")), None, Some(serde_json::json!("x"))]);

        store.mdel(&["a".to_string(), "b".to_string()]).await.unwrap();
        assert!(store.get_by_prefix("").await.unwrap().is_empty());
    }
}
