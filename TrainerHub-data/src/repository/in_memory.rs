use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::errors::RepositoryError;
use super::KvStore;

/// In-memory key-value store
///
/// Entries live in an ordered map so prefix scans come back sorted by key,
/// the same order the SQLite store produces.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKvStore {
    entries: Arc<Mutex<BTreeMap<String, Value>>>,
}

impl InMemoryKvStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.entries.lock()?.len())
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.entries.lock()?.is_empty())
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        let entries = self.entries.lock()?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), RepositoryError> {
        let mut entries = self.entries.lock()?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        let mut entries = self.entries.lock()?;
        entries.remove(key);
        Ok(())
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<(String, Value)>, RepositoryError> {
        let entries = self.entries.lock()?;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    async fn mset(&self, entries: Vec<(String, Value)>) -> Result<(), RepositoryError> {
        let mut store = self.entries.lock()?;
        store.extend(entries);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = InMemoryKvStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);

        store.set("user:1", json!({"name": "Ana"})).await.unwrap();
        store.set("user:1", json!({"name": "Bea"})).await.unwrap();
        assert_eq!(store.get("user:1").await.unwrap(), Some(json!({"name": "Bea"})));
        assert_eq!(store.len().unwrap(), 1);

        store.delete("user:1").await.unwrap();
        store.delete("user:1").await.unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_prefix_scan_is_ordered_and_bounded() {
        let store = InMemoryKvStore::new();
        store.set("schedule:u1:2024-03-02", json!(2)).await.unwrap();
        store.set("schedule:u1:2024-03-01", json!(1)).await.unwrap();
        store.set("schedule:u2:2024-03-01", json!(3)).await.unwrap();
        store.set("schedules:u1:x", json!(4)).await.unwrap();

        let found = store.get_by_prefix("schedule:u1:").await.unwrap();
        let keys: Vec<&str> = found.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["schedule:u1:2024-03-01", "schedule:u1:2024-03-02"]);

        assert_eq!(store.get_by_prefix("schedule:").await.unwrap().len(), 3);
        assert_eq!(store.get_by_prefix("").await.unwrap().len(), 4);
    }
}
