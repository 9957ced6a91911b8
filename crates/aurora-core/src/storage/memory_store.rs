use crate::storage::LocalStore;
use async_trait::async_trait;
use aurora_common::Result;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// MemoryStore keeps collections in process memory; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn save(&self, key: &str, data: &Value) -> Result<()> {
        self.values.write().await.insert(key.to_string(), data.clone());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
