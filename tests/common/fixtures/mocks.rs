//! Scripted in-memory stand-ins for the engine's collaborator traits

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use automation::alerts::{AutomationEvent, EventKind};
use automation::config::BackupKind;
use automation::services::{
    BackupService, ContainerController, InstalledPlugin, InstanceStatus, Notifier, PluginCatalog,
};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Container controller with per-server scripted statuses. Start, stop, and
/// restart calls are recorded and also update the scripted status, so a
/// scheduled start is visible to the health check later in the same tick.
#[derive(Clone, Default)]
pub struct ScriptedContainers {
    inner: Arc<RwLock<ContainersInner>>,
}

#[derive(Default)]
struct ContainersInner {
    statuses: HashMap<String, InstanceStatus>,
    fail_status: HashSet<String>,
    started: Vec<String>,
    stopped: Vec<String>,
    restarted: Vec<String>,
}

impl ScriptedContainers {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_status(&self, server_id: &str, status: InstanceStatus) {
        let mut inner = self.inner.write().await;
        inner.statuses.insert(server_id.to_string(), status);
    }

    pub async fn set_running(&self, server_id: &str, tps: Option<f64>, memory: Option<f64>) {
        self.set_status(
            server_id,
            InstanceStatus {
                running: true,
                tps,
                memory_percent: memory,
            },
        )
        .await;
    }

    pub async fn set_stopped(&self, server_id: &str) {
        self.set_status(server_id, InstanceStatus::default()).await;
    }

    /// Make status probes for a server fail.
    pub async fn fail_status(&self, server_id: &str) {
        let mut inner = self.inner.write().await;
        inner.fail_status.insert(server_id.to_string());
    }

    pub async fn started(&self) -> Vec<String> {
        self.inner.read().await.started.clone()
    }

    pub async fn stopped(&self) -> Vec<String> {
        self.inner.read().await.stopped.clone()
    }

    pub async fn restarted(&self) -> Vec<String> {
        self.inner.read().await.restarted.clone()
    }
}

#[async_trait]
impl ContainerController for ScriptedContainers {
    async fn status(&self, server_id: &str) -> Result<InstanceStatus> {
        let inner = self.inner.read().await;
        if inner.fail_status.contains(server_id) {
            return Err(anyhow!("status probe failed for {}", server_id));
        }
        Ok(inner.statuses.get(server_id).cloned().unwrap_or_default())
    }

    async fn start(&self, server_id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.started.push(server_id.to_string());
        inner.statuses.entry(server_id.to_string()).or_default().running = true;
        Ok(())
    }

    async fn stop(&self, server_id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.stopped.push(server_id.to_string());
        inner.statuses.entry(server_id.to_string()).or_default().running = false;
        Ok(())
    }

    async fn restart(&self, server_id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.restarted.push(server_id.to_string());
        inner.statuses.entry(server_id.to_string()).or_default().running = true;
        Ok(())
    }
}

/// Notifier that records every event it receives.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<RwLock<Vec<(String, AutomationEvent)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<(String, AutomationEvent)> {
        self.events.read().await.clone()
    }

    pub async fn count(&self, kind: EventKind) -> usize {
        self.events
            .read()
            .await
            .iter()
            .filter(|(_, event)| event.kind == kind)
            .count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, server_id: &str, event: AutomationEvent) {
        self.events.write().await.push((server_id.to_string(), event));
    }
}

/// Backup service with a scripted archive listing and recorded operations.
#[derive(Clone, Default)]
pub struct MockBackupService {
    inner: Arc<RwLock<BackupInner>>,
}

#[derive(Default)]
struct BackupInner {
    existing: Vec<automation::services::BackupInfo>,
    created: u32,
    deleted: Vec<String>,
    fail_create: bool,
    fail_delete: HashSet<String>,
}

impl MockBackupService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_existing(&self, backups: Vec<automation::services::BackupInfo>) {
        self.inner.write().await.existing = backups;
    }

    pub async fn set_fail_create(&self, fail: bool) {
        self.inner.write().await.fail_create = fail;
    }

    pub async fn fail_delete(&self, backup_id: &str) {
        let mut inner = self.inner.write().await;
        inner.fail_delete.insert(backup_id.to_string());
    }

    pub async fn created_count(&self) -> u32 {
        self.inner.read().await.created
    }

    pub async fn deleted_ids(&self) -> Vec<String> {
        self.inner.read().await.deleted.clone()
    }
}

#[async_trait]
impl BackupService for MockBackupService {
    async fn create(
        &self,
        server_id: &str,
        _kind: BackupKind,
    ) -> Result<automation::services::BackupInfo> {
        let mut inner = self.inner.write().await;
        if inner.fail_create {
            return Err(anyhow!("archive creation failed"));
        }
        inner.created += 1;
        Ok(automation::services::BackupInfo {
            id: Uuid::new_v4().to_string(),
            filename: format!("{}-{}.tar.gz", server_id, inner.created),
            size_bytes: 1024,
            created_at: Utc::now(),
        })
    }

    async fn list(&self, _server_id: &str) -> Result<Vec<automation::services::BackupInfo>> {
        Ok(self.inner.read().await.existing.clone())
    }

    async fn delete(&self, _server_id: &str, backup_id: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        if inner.fail_delete.contains(backup_id) {
            return Err(anyhow!("deletion failed for {}", backup_id));
        }
        inner.deleted.push(backup_id.to_string());
        Ok(true)
    }
}

/// Plugin catalog with scripted installed lists and published versions.
#[derive(Clone, Default)]
pub struct StaticCatalog {
    inner: Arc<RwLock<CatalogInner>>,
}

#[derive(Default)]
struct CatalogInner {
    installed: HashMap<String, Vec<InstalledPlugin>>,
    latest: HashMap<String, String>,
    fail_lookups: HashSet<String>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn install(&self, server_id: &str, plugin: InstalledPlugin) {
        let mut inner = self.inner.write().await;
        inner
            .installed
            .entry(server_id.to_string())
            .or_default()
            .push(plugin);
    }

    pub async fn publish(&self, catalog_ref: &str, version: &str) {
        let mut inner = self.inner.write().await;
        inner.latest.insert(catalog_ref.to_string(), version.to_string());
    }

    pub async fn fail_lookup(&self, catalog_ref: &str) {
        let mut inner = self.inner.write().await;
        inner.fail_lookups.insert(catalog_ref.to_string());
    }
}

#[async_trait]
impl PluginCatalog for StaticCatalog {
    async fn installed(&self, server_id: &str) -> Result<Vec<InstalledPlugin>> {
        let inner = self.inner.read().await;
        Ok(inner.installed.get(server_id).cloned().unwrap_or_default())
    }

    async fn latest_version(&self, catalog_ref: &str) -> Result<Option<String>> {
        let inner = self.inner.read().await;
        if inner.fail_lookups.contains(catalog_ref) {
            return Err(anyhow!("catalog lookup failed for {}", catalog_ref));
        }
        Ok(inner.latest.get(catalog_ref).cloned())
    }
}
