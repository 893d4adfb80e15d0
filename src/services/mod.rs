//! Collaborator interfaces consumed by the engine
//!
//! The engine depends only on these traits; the enclosing process injects
//! concrete implementations through [`crate::engine::AutomationEngine::new`].
//! Container lifecycle, backup archive mechanics, plugin catalogs, and
//! notification delivery all live behind this boundary.

use crate::alerts::AutomationEvent;
use crate::config::{BackupKind, ServerProfile};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live process status for one server instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceStatus {
    pub running: bool,
    pub tps: Option<f64>,
    pub memory_percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    pub id: String,
    pub filename: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledPlugin {
    pub name: String,
    pub version: String,
    /// Upstream catalog reference; the plugin name is used when absent
    pub catalog_ref: Option<String>,
}

/// Start/stop/restart/status of a server process.
#[async_trait]
pub trait ContainerController: Send + Sync {
    async fn status(&self, server_id: &str) -> Result<InstanceStatus>;
    async fn start(&self, server_id: &str) -> Result<()>;
    async fn stop(&self, server_id: &str) -> Result<()>;
    async fn restart(&self, server_id: &str) -> Result<()>;
}

/// Backup archive creation and bookkeeping.
#[async_trait]
pub trait BackupService: Send + Sync {
    async fn create(&self, server_id: &str, kind: BackupKind) -> Result<BackupInfo>;
    async fn list(&self, server_id: &str) -> Result<Vec<BackupInfo>>;
    async fn delete(&self, server_id: &str, backup_id: &str) -> Result<bool>;
}

/// Outbound notification delivery. Fire-and-forget by contract:
/// implementations log failures instead of returning them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, server_id: &str, event: AutomationEvent);
}

/// Installed-plugin enumeration and upstream version lookup.
#[async_trait]
pub trait PluginCatalog: Send + Sync {
    async fn installed(&self, server_id: &str) -> Result<Vec<InstalledPlugin>>;
    /// Latest published version for a catalog reference, `None` when the
    /// catalog does not know the plugin.
    async fn latest_version(&self, catalog_ref: &str) -> Result<Option<String>>;
}

/// Enumeration of the servers under management.
#[async_trait]
pub trait ServerRegistry: Send + Sync {
    async fn list_servers(&self) -> Result<Vec<ServerProfile>>;
}
