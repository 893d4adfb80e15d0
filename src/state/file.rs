//! JSON-file state store
//!
//! One file per `(server_id, kind)` record under a flat directory, written
//! through a temp file so a crash mid-write leaves the previous record
//! intact.

use super::{StateKind, StateStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct JsonFileStateStore {
    root: PathBuf,
}

impl JsonFileStateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn record_path(&self, server_id: &str, kind: StateKind) -> PathBuf {
        self.root.join(format!("{}.{}.json", server_id, kind))
    }
}

#[async_trait]
impl StateStore for JsonFileStateStore {
    async fn load(&self, server_id: &str, kind: StateKind) -> Result<Option<serde_json::Value>> {
        let path = self.record_path(server_id, kind);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        let value = serde_json::from_slice(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(value))
    }

    async fn save(
        &self,
        server_id: &str,
        kind: StateKind,
        record: serde_json::Value,
    ) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create {}", self.root.display()))?;

        let path = self.record_path(server_id, kind);
        let tmp = path.with_extension("json.tmp");
        let raw = serde_json::to_vec_pretty(&record)?;

        tokio::fs::write(&tmp, &raw)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        Ok(())
    }

    async fn remove_server(&self, server_id: &str) -> Result<()> {
        for kind in StateKind::ALL {
            let path = self.record_path(server_id, kind);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to remove {}", path.display()))
                }
            }
        }
        Ok(())
    }
}
