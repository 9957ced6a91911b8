mod file_store;
mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use async_trait::async_trait;
use aurora_common::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// The LocalStore trait defines the interface for the device-local
/// storage backends that hold the dashboard collections.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Store a JSON value under a fixed key, replacing any previous value
    async fn save(&self, key: &str, data: &Value) -> Result<()>;

    /// Retrieve the value stored under a key
    async fn load(&self, key: &str) -> Result<Option<Value>>;

    /// Get the store name
    fn name(&self) -> &str;
}

/// Serialize a collection and store it under `key`
pub async fn save_collection<T>(store: &dyn LocalStore, key: &str, collection: &T) -> Result<()>
where
    T: Serialize + ?Sized + Sync,
{
    let value = serde_json::to_value(collection)?;
    store.save(key, &value).await
}

/// Load a collection, treating absent, unreadable or malformed data as "nothing stored"
pub async fn load_collection<T>(store: &dyn LocalStore, key: &str) -> Option<T>
where
    T: DeserializeOwned,
{
    match store.load(key).await {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(collection) => Some(collection),
            Err(e) => {
                debug!("Ignoring malformed data under {} in {}: {}", key, store.name(), e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            debug!("Ignoring unreadable data under {} in {}: {}", key, store.name(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurora_common::{Category, storage_keys};
    use aurora_common::defaults::initial_categories;
    use serde_json::json;

    #[tokio::test]
    async fn test_typed_round_trip() -> Result<()> {
        let store = MemoryStore::new();
        let categories = initial_categories();

        save_collection(&store, storage_keys::CATEGORIES, &categories).await?;
        let loaded: Option<Vec<Category>> = load_collection(&store, storage_keys::CATEGORIES).await;

        assert_eq!(loaded, Some(categories));
        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_shape_is_swallowed() -> Result<()> {
        let store = MemoryStore::new();
        store
            .save(storage_keys::CATEGORIES, &json!({"not": "a list"}))
            .await?;

        let loaded: Option<Vec<Category>> = load_collection(&store, storage_keys::CATEGORIES).await;
        assert!(loaded.is_none());

        let missing: Option<Vec<Category>> = load_collection(&store, storage_keys::SEARCH_ENGINES).await;
        assert!(missing.is_none());
        Ok(())
    }
}
