//! In-memory state store for tests and embedding

use super::{StateKind, StateStore};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct MemoryStateStore {
    records: Arc<RwLock<HashMap<(String, StateKind), serde_json::Value>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self, server_id: &str, kind: StateKind) -> Result<Option<serde_json::Value>> {
        let records = self.records.read().await;
        Ok(records.get(&(server_id.to_string(), kind)).cloned())
    }

    async fn save(
        &self,
        server_id: &str,
        kind: StateKind,
        record: serde_json::Value,
    ) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert((server_id.to_string(), kind), record);
        Ok(())
    }

    async fn remove_server(&self, server_id: &str) -> Result<()> {
        let mut records = self.records.write().await;
        records.retain(|(id, _), _| id != server_id);
        Ok(())
    }
}

impl Clone for MemoryStateStore {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
        }
    }
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}
