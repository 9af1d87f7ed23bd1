use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::errors::RepositoryError;
use super::SharedKvStore;

/// A document stored in the key-value store under `{namespace}:{owner}:{id}`
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// Key prefix shared by every record of this type
    const NAMESPACE: &'static str;

    /// Identifier of the user the record belongs to
    fn owner(&self) -> &str;

    /// Identifier of the record within its owner
    fn id(&self) -> &str;

    /// Key for the record with the given owner and id
    fn key_for(owner: &str, id: &str) -> String {
        format!("{}:{}:{}", Self::NAMESPACE, owner, id)
    }

    /// Prefix shared by every record of one owner
    fn owner_prefix(owner: &str) -> String {
        format!("{}:{}:", Self::NAMESPACE, owner)
    }

    /// Key of this record
    fn key(&self) -> String {
        Self::key_for(self.owner(), self.id())
    }
}

/// Typed view over the records of one namespace
pub struct Collection<T> {
    store: SharedKvStore,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Record> Collection<T> {
    /// Create a collection over the given store
    pub fn new(store: SharedKvStore) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Insert or replace a record
    pub async fn put(&self, record: &T) -> Result<(), RepositoryError> {
        let value = serde_json::to_value(record)?;
        self.store.set(&record.key(), value).await
    }

    /// Insert or replace several records at once
    pub async fn put_many(&self, records: &[T]) -> Result<(), RepositoryError> {
        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            entries.push((record.key(), serde_json::to_value(record)?));
        }
        self.store.mset(entries).await
    }

    /// Read one record by owner and id
    pub async fn get(&self, owner: &str, id: &str) -> Result<Option<T>, RepositoryError> {
        match self.store.get(&T::key_for(owner, id)).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Find a record by id without knowing its owner
    pub async fn find(&self, id: &str) -> Result<Option<T>, RepositoryError> {
        Ok(self.list_all().await?.into_iter().find(|record| record.id() == id))
    }

    /// All records of one owner, ordered by key
    pub async fn list(&self, owner: &str) -> Result<Vec<T>, RepositoryError> {
        self.scan(&T::owner_prefix(owner)).await
    }

    /// Every record in the namespace, ordered by key
    pub async fn list_all(&self) -> Result<Vec<T>, RepositoryError> {
        self.scan(&format!("{}:", T::NAMESPACE)).await
    }

    /// Remove one record; missing records are ignored
    pub async fn remove(&self, owner: &str, id: &str) -> Result<(), RepositoryError> {
        self.store.delete(&T::key_for(owner, id)).await
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<T>, RepositoryError> {
        let entries = self.store.get_by_prefix(prefix).await?;
        let mut records = Vec::with_capacity(entries.len());

        for (key, value) in entries {
            match serde_json::from_value(value) {
                Ok(record) => records.push(record),
                // Malformed documents are skipped, not fatal
                Err(e) => warn!("Skipping unreadable record at {}: {}", key, e),
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryKvStore, KvStore};
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        owner: String,
        id: String,
        text: String,
    }

    impl Record for Note {
        const NAMESPACE: &'static str = "note";

        fn owner(&self) -> &str {
            &self.owner
        }

        fn id(&self) -> &str {
            &self.id
        }
    }

    fn note(owner: &str, id: &str, text: &str) -> Note {
        Note {
            owner: owner.to_string(),
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_records_are_scoped_by_owner() {
        let store = Arc::new(InMemoryKvStore::new());
        let notes: Collection<Note> = Collection::new(store.clone());

        notes.put(&note("u1", "b", "second")).await.unwrap();
        notes.put(&note("u1", "a", "first")).await.unwrap();
        notes.put(&note("u2", "c", "other")).await.unwrap();

        let mine = notes.list("u1").await.unwrap();
        assert_eq!(mine.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(notes.list_all().await.unwrap().len(), 3);
        assert_eq!(notes.get("u2", "c").await.unwrap(), Some(note("u2", "c", "other")));
        assert_eq!(notes.get("u1", "c").await.unwrap(), None);
        assert_eq!(notes.find("c").await.unwrap().map(|n| n.owner), Some("u2".to_string()));

        notes.remove("u1", "a").await.unwrap();
        assert_eq!(notes.list("u1").await.unwrap().len(), 1);
        assert!(store.get("note:u1:b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unreadable_documents_are_skipped() {
        let store = Arc::new(InMemoryKvStore::new());
        store.set("note:u1:broken", serde_json::json!("not a note")).await.unwrap();

        let notes: Collection<Note> = Collection::new(store);
        notes.put(&note("u1", "ok", "fine")).await.unwrap();

        assert_eq!(notes.list("u1").await.unwrap(), vec![note("u1", "ok", "fine")]);
    }
}
