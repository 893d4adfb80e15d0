//! Plugin update checks
//!
//! The gate is a simple interval check against persisted state; the scan
//! itself compares normalized version strings for change detection only,
//! without any semantic version ordering.

use crate::alerts::{AutomationEvent, EventKind, EventSeverity};
use crate::config::{PluginUpdatePolicy, ServerProfile};
use crate::services::{Notifier, PluginCatalog};
use crate::state::{self, PluginUpdateInfo, PluginUpdateState, StateKind, StateStore};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Whether an update check is due.
pub fn should_check(
    policy: &PluginUpdatePolicy,
    state: &PluginUpdateState,
    now: DateTime<Utc>,
) -> bool {
    if !policy.enabled {
        return false;
    }
    match state.last_check_time {
        None => true,
        Some(last) => {
            now.signed_duration_since(last) >= Duration::hours(policy.check_interval_hours)
        }
    }
}

/// Case- and `v`-prefix-insensitive form used for change detection.
pub fn normalize_version(version: &str) -> String {
    let trimmed = version.trim();
    let stripped = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    stripped.to_ascii_lowercase()
}

pub struct UpdateChecker {
    catalog: Arc<dyn PluginCatalog>,
    store: Arc<dyn StateStore>,
    notifier: Arc<dyn Notifier>,
}

impl UpdateChecker {
    pub fn new(
        catalog: Arc<dyn PluginCatalog>,
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            catalog,
            store,
            notifier,
        }
    }

    /// Run the update scan if the interval has elapsed. Individual catalog
    /// lookup failures skip that plugin; only enumerating the installed
    /// list is allowed to fail the check.
    pub async fn run_check(&self, profile: &ServerProfile, now: DateTime<Utc>) -> Result<()> {
        let policy = &profile.plugin_updates;
        let mut state: PluginUpdateState =
            state::load_or_default(self.store.as_ref(), &profile.id, StateKind::PluginUpdates)
                .await;

        if !should_check(policy, &state, now) {
            return Ok(());
        }

        let installed = self.catalog.installed(&profile.id).await?;
        let mut updates = Vec::with_capacity(installed.len());

        for plugin in installed {
            if policy.exclude_plugins.contains(&plugin.name) {
                debug!("Plugin {} excluded from update checks", plugin.name);
                continue;
            }

            let reference = plugin.catalog_ref.as_deref().unwrap_or(&plugin.name);
            match self.catalog.latest_version(reference).await {
                Ok(Some(latest)) => {
                    let update_available =
                        normalize_version(&plugin.version) != normalize_version(&latest);
                    updates.push(PluginUpdateInfo {
                        plugin_name: plugin.name,
                        current_version: plugin.version,
                        latest_version: latest,
                        update_available,
                    });
                }
                Ok(None) => {
                    debug!("Plugin {} not found in catalog", plugin.name);
                }
                Err(e) => {
                    warn!("Version lookup failed for plugin {}: {}", plugin.name, e);
                }
            }
        }

        let available: Vec<&PluginUpdateInfo> =
            updates.iter().filter(|u| u.update_available).collect();
        let available_count = available.len();

        if available_count > 0 {
            info!(
                "{} plugin update(s) available for {}",
                available_count, profile.id
            );
            if policy.notify_on_update {
                let details = serde_json::to_value(&available).unwrap_or_default();
                self.notifier
                    .notify(
                        &profile.id,
                        AutomationEvent::new(
                            EventKind::PluginUpdatesAvailable,
                            EventSeverity::Info,
                            format!("{} plugin update(s) available", available_count),
                        )
                        .with_details(details),
                    )
                    .await;
            }
        }

        state.last_check_time = Some(now);
        state.updates = updates;
        state::save_record(
            self.store.as_ref(),
            &profile.id,
            StateKind::PluginUpdates,
            &state,
        )
        .await?;

        Ok(())
    }
}
