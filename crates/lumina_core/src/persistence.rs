//! crates/lumina_core/src/persistence.rs
//!
//! Loads and saves whole JSON documents through a [`KeyValueStore`].
//!
//! Reads never fail: a missing, unreadable or unparseable document is treated
//! as absent and the caller gets the default value. A corrupt store is
//! therefore indistinguishable from an empty one, and whatever was stored is
//! overwritten by the next save.

use crate::ports::{KeyValueStore, PortError, PortResult};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Key of the ordered book collection document.
pub const BOOKS_KEY: &str = "lumina_books";
/// Key of the user profile document.
pub const USER_KEY: &str = "lumina_user";

#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads the document under `key`, substituting `T::default()` when it is
    /// absent or cannot be parsed.
    pub async fn load<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        self.load_existing(key).await.unwrap_or_default()
    }

    /// Loads the document under `key`, or `None` when it is absent or corrupt.
    pub async fn load_existing<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored document under '{}'", key);
                return None;
            }
            Err(e) => {
                warn!("Failed to read '{}', treating it as empty: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Stored document '{}' is corrupt, treating it as empty: {}", key, e);
                None
            }
        }
    }

    /// Serializes `value` and replaces the whole document under `key`.
    pub async fn save<T>(&self, key: &str, value: &T) -> PortResult<()>
    where
        T: Serialize + ?Sized,
    {
        let raw = serde_json::to_string(value).map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.store.set(key, &raw).await
    }

    pub async fn remove(&self, key: &str) -> PortResult<()> {
        self.store.remove(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use async_trait::async_trait;

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> PortResult<Option<String>> {
            Err(PortError::Unexpected("disk on fire".into()))
        }
        async fn set(&self, _key: &str, _value: &str) -> PortResult<()> {
            Err(PortError::Unexpected("disk on fire".into()))
        }
        async fn remove(&self, _key: &str) -> PortResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn absent_key_loads_default() {
        let persistence = Persistence::new(Arc::new(MemoryStore::new()));
        let values: Vec<u32> = persistence.load("numbers").await;
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn corrupt_document_loads_default() {
        let store = Arc::new(MemoryStore::new());
        store.set("numbers", "[1, 2,").await.unwrap();
        let persistence = Persistence::new(store);
        let values: Vec<u32> = persistence.load("numbers").await;
        assert!(values.is_empty());
        assert!(persistence.load_existing::<Vec<u32>>("numbers").await.is_none());
    }

    #[tokio::test]
    async fn unreadable_store_loads_default_but_write_fails() {
        let persistence = Persistence::new(Arc::new(BrokenStore));
        let values: Vec<u32> = persistence.load("numbers").await;
        assert!(values.is_empty());
        assert!(persistence.save("numbers", &vec![1u32]).await.is_err());
    }

    #[tokio::test]
    async fn saved_document_loads_back() {
        let persistence = Persistence::new(Arc::new(MemoryStore::new()));
        persistence.save("numbers", &vec![3u32, 1, 2]).await.unwrap();
        let values: Vec<u32> = persistence.load("numbers").await;
        assert_eq!(values, vec![3, 1, 2]);

        persistence.remove("numbers").await.unwrap();
        assert!(persistence.load_existing::<Vec<u32>>("numbers").await.is_none());
    }
}
