//! Profile sources
//!
//! [`ProfileStore`] reads one TOML file per server from a directory and is
//! the registry most deployments use; [`StaticRegistry`] holds profiles in
//! memory for embedding and tests.

use super::ServerProfile;
use crate::services::ServerRegistry;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load every `*.toml` profile under the directory. Unparseable files
    /// are skipped with a warning so one bad profile cannot take the whole
    /// registry down.
    pub async fn load_profiles(&self) -> Result<Vec<ServerProfile>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("Failed to read profile directory {}", self.dir.display()))?;

        let mut profiles = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .context("Failed to iterate profile directory")?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }

            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Skipping unreadable profile {}: {}", path.display(), e);
                    continue;
                }
            };

            match toml::from_str::<ServerProfile>(&raw) {
                Ok(profile) => {
                    debug!("Loaded profile {} from {}", profile.id, path.display());
                    profiles.push(profile);
                }
                Err(e) => {
                    warn!("Skipping unparseable profile {}: {}", path.display(), e);
                }
            }
        }

        profiles.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(profiles)
    }
}

#[async_trait]
impl ServerRegistry for ProfileStore {
    async fn list_servers(&self) -> Result<Vec<ServerProfile>> {
        self.load_profiles().await
    }
}

/// In-memory registry. Cheap to clone; all clones share the same profile
/// list.
pub struct StaticRegistry {
    profiles: Arc<RwLock<Vec<ServerProfile>>>,
}

impl StaticRegistry {
    pub fn new(profiles: Vec<ServerProfile>) -> Self {
        Self {
            profiles: Arc::new(RwLock::new(profiles)),
        }
    }

    /// Insert or replace a profile by server id.
    pub async fn upsert(&self, profile: ServerProfile) {
        let mut profiles = self.profiles.write().await;
        match profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile,
            None => profiles.push(profile),
        }
    }

    pub async fn remove(&self, server_id: &str) -> bool {
        let mut profiles = self.profiles.write().await;
        let before = profiles.len();
        profiles.retain(|p| p.id != server_id);
        profiles.len() != before
    }
}

#[async_trait]
impl ServerRegistry for StaticRegistry {
    async fn list_servers(&self) -> Result<Vec<ServerProfile>> {
        Ok(self.profiles.read().await.clone())
    }
}

impl Clone for StaticRegistry {
    fn clone(&self) -> Self {
        Self {
            profiles: self.profiles.clone(),
        }
    }
}

impl Default for StaticRegistry {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
