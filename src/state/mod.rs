//! Persisted per-server automation state
//!
//! Each record is stored independently, keyed by `(server_id, kind)`, and
//! owned exclusively by the engine. A missing or corrupt record is never an
//! error: the typed loaders fall back to the documented defaults so a wiped
//! data directory only costs one redundant decision, not a crashed tick.

pub mod file;
pub mod memory;

pub use file::JsonFileStateStore;
pub use memory::MemoryStateStore;

use crate::config::BackupKind;
use crate::health::HealthLevel;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Backup,
    Health,
    PluginUpdates,
}

impl StateKind {
    pub const ALL: [StateKind; 3] = [
        StateKind::Backup,
        StateKind::Health,
        StateKind::PluginUpdates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::Backup => "backup",
            StateKind::Health => "health",
            StateKind::PluginUpdates => "plugin_updates",
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome bookkeeping for the backup planner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupState {
    pub last_backup_time: Option<DateTime<Utc>>,
    pub last_backup_type: Option<BackupKind>,
    pub last_backup_success: bool,
    pub next_scheduled_backup: Option<DateTime<Utc>>,
}

/// Rolling health evaluation state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthState {
    pub last_check_time: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub last_restart_time: Option<DateTime<Utc>>,
    pub current_status: HealthLevel,
    pub last_tps: Option<f64>,
    pub last_memory_percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginUpdateInfo {
    pub plugin_name: String,
    pub current_version: String,
    pub latest_version: String,
    pub update_available: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginUpdateState {
    pub last_check_time: Option<DateTime<Utc>>,
    pub updates: Vec<PluginUpdateInfo>,
}

/// Raw record storage keyed by `(server_id, kind)`.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self, server_id: &str, kind: StateKind) -> Result<Option<serde_json::Value>>;
    async fn save(
        &self,
        server_id: &str,
        kind: StateKind,
        record: serde_json::Value,
    ) -> Result<()>;
    /// Drop every record for a deleted server.
    async fn remove_server(&self, server_id: &str) -> Result<()>;
}

/// Load a typed record, falling back to its default on absence, corruption,
/// or store failure.
pub async fn load_or_default<T>(store: &dyn StateStore, server_id: &str, kind: StateKind) -> T
where
    T: DeserializeOwned + Default,
{
    match store.load(server_id, kind).await {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    "Corrupt {} state for {}, using defaults: {}",
                    kind, server_id, e
                );
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            warn!(
                "Failed to load {} state for {}, using defaults: {}",
                kind, server_id, e
            );
            T::default()
        }
    }
}

pub async fn save_record<T: Serialize>(
    store: &dyn StateStore,
    server_id: &str,
    kind: StateKind,
    record: &T,
) -> Result<()> {
    let value = serde_json::to_value(record)?;
    store.save(server_id, kind, value).await
}
