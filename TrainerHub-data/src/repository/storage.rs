use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use serde_json::Value;
use tracing::debug;

use crate::database::DatabasePool;
use super::errors::RepositoryError;
use super::KvStore;

/// Key-value store backed by the `kv_store` SQLite table
#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    pool: DatabasePool,
}

impl SqliteKvStore {
    /// Wrap an already migrated pool
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        let conn = self.pool.get()?;

        let raw: Option<String> = conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;

        raw.map(|text| serde_json::from_str(&text))
            .transpose()
            .map_err(RepositoryError::from)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), RepositoryError> {
        debug!("Storing value for key {}", key);
        let conn = self.pool.get()?;
        let text = serde_json::to_string(&value)?;

        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, text],
        )?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<(String, Value)>, RepositoryError> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM kv_store
             WHERE substr(key, 1, length(?1)) = ?1
             ORDER BY key",
        )?;

        let rows = stmt.query_map(params![prefix], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (key, text) = row?;
            entries.push((key, serde_json::from_str(&text)?));
        }

        debug!("Prefix scan '{}' returned {} entries", prefix, entries.len());
        Ok(entries)
    }

    async fn mset(&self, entries: Vec<(String, Value)>) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        for (key, value) in entries {
            let text = serde_json::to_string(&value)?;
            tx.execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, text],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    async fn mdel(&self, keys: &[String]) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        for key in keys {
            tx.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        }

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{build_sqlite_pool, DatabaseConfig};
    use serde_json::json;

    fn temp_store(dir: &tempfile::TempDir) -> SqliteKvStore {
        let config = DatabaseConfig {
            sqlite_path: dir.path().join("kv.db").to_string_lossy().to_string(),
            ..DatabaseConfig::default()
        };
        SqliteKvStore::new(build_sqlite_pool(&config).unwrap())
    }

    #[tokio::test]
    async fn test_upsert_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);

        store.set("workout:u1:1", json!({"notes": "legs"})).await.unwrap();
        store.set("workout:u1:1", json!({"notes": "arms"})).await.unwrap();

        assert_eq!(store.get("workout:u1:1").await.unwrap(), Some(json!({"notes": "arms"})));
        assert_eq!(store.get("workout:u1:2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_prefix_scan_ignores_like_wildcards() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);

        store.set("session_card:u1:2024-01-02", json!(2)).await.unwrap();
        store.set("session_card:u1:2024-01-01", json!(1)).await.unwrap();
        store.set("sessionXcard:u1:2024-01-01", json!(9)).await.unwrap();

        let entries = store.get_by_prefix("session_card:u1:").await.unwrap();
        assert_eq!(
            entries,
            vec![
                ("session_card:u1:2024-01-01".to_string(), json!(1)),
                ("session_card:u1:2024-01-02".to_string(), json!(2)),
            ]
        );
    }

    #[tokio::test]
    async fn test_batch_operations_in_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);

        store
            .mset(vec![("a".to_string(), json!(1)), ("b".to_string(), json!(2))])
            .await
            .unwrap();
        assert_eq!(store.get_by_prefix("").await.unwrap().len(), 2);

        store.mdel(&["a".to_string()]).await.unwrap();
        assert_eq!(store.mget(&["a".to_string(), "b".to_string()]).await.unwrap(), vec![None, Some(json!(2))]);
    }
}
