//! Top-level automation loop
//!
//! One engine instance owns the per-minute tick. Each tick enumerates the
//! registry and walks the servers sequentially: uptime reconciliation (with
//! event backups off its actions), the scheduled backup check, the health
//! evaluation, and the plugin update gate. Every sub-check failure is
//! caught and logged at the per-server boundary so one server can never
//! stall the others' automation.
//!
//! The tick body is awaited inside the loop task, so ticks cannot overlap;
//! `stop()` lets in-flight work finish and then joins the task.

use crate::backup::{BackupPlanner, EventTrigger};
use crate::config::ServerProfile;
use crate::constants::ticker::TICK_INTERVAL_SECONDS;
use crate::health::HealthMonitor;
use crate::plugins::UpdateChecker;
use crate::schedule::{UptimeAction, UptimeScheduler};
use crate::services::{
    BackupService, ContainerController, Notifier, PluginCatalog, ServerRegistry,
};
use crate::state::StateStore;
use crate::stop_intent::StopIntentRegistry;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

struct LoopHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

pub struct AutomationEngine {
    registry: Arc<dyn ServerRegistry>,
    store: Arc<dyn StateStore>,
    uptime: UptimeScheduler,
    planner: BackupPlanner,
    health: HealthMonitor,
    updates: UpdateChecker,
    stop_intents: StopIntentRegistry,
    loop_handle: Mutex<Option<LoopHandle>>,
}

impl AutomationEngine {
    pub fn new(
        registry: Arc<dyn ServerRegistry>,
        containers: Arc<dyn ContainerController>,
        backups: Arc<dyn BackupService>,
        catalog: Arc<dyn PluginCatalog>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        let stop_intents = StopIntentRegistry::new();

        Self {
            registry,
            uptime: UptimeScheduler::new(containers.clone(), stop_intents.clone()),
            planner: BackupPlanner::new(backups, store.clone(), notifier.clone()),
            health: HealthMonitor::new(containers, store.clone(), notifier.clone(), stop_intents.clone()),
            updates: UpdateChecker::new(catalog, store.clone(), notifier),
            store,
            stop_intents,
            loop_handle: Mutex::new(None),
        }
    }

    /// Spawn the repeating tick loop. Idempotent: a second call while the
    /// loop is running is a no-op.
    pub async fn start(self: &Arc<Self>) {
        let mut guard = self.loop_handle.lock().await;
        if guard.is_some() {
            warn!("Automation loop already running");
            return;
        }

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let engine = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(TICK_INTERVAL_SECONDS));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The interval's first tick completes immediately; consume it so
            // the first real tick happens one full interval after start.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        engine.run_tick(Utc::now()).await;
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("Automation loop stopped");
        });

        *guard = Some(LoopHandle { shutdown, task });
        info!("Automation loop started ({}s interval)", TICK_INTERVAL_SECONDS);
    }

    /// Signal the loop to stop and wait for it to finish. In-flight
    /// per-server work completes; no new tick is scheduled afterward.
    pub async fn stop(&self) {
        let handle = self.loop_handle.lock().await.take();
        let Some(LoopHandle { shutdown, task }) = handle else {
            return;
        };

        let _ = shutdown.send(true);
        if let Err(e) = task.await {
            error!("Automation loop task failed: {}", e);
        }
    }

    /// One full tick over every known server. Public so tests and manual
    /// triggers can drive the engine with an explicit clock.
    pub async fn run_tick(&self, now: DateTime<Utc>) {
        let swept = self.stop_intents.sweep_expired(now).await;
        if swept > 0 {
            debug!("Swept {} expired stop-intent marker(s)", swept);
        }

        let profiles = match self.registry.list_servers().await {
            Ok(profiles) => profiles,
            Err(e) => {
                error!("Failed to enumerate servers, skipping tick: {}", e);
                return;
            }
        };

        debug!("Automation tick across {} server(s)", profiles.len());
        for profile in &profiles {
            self.run_server_tick(profile, now).await;
        }
    }

    async fn run_server_tick(&self, profile: &ServerProfile, now: DateTime<Utc>) {
        match self.uptime.reconcile(profile, now).await {
            Ok(UptimeAction::Started) => {
                if let Err(e) = self.planner.run_event(profile, EventTrigger::Start, now).await {
                    error!("[{}] on-start backup failed: {}", profile.id, e);
                }
            }
            Ok(UptimeAction::Stopped) => {
                if let Err(e) = self.planner.run_event(profile, EventTrigger::Stop, now).await {
                    error!("[{}] on-stop backup failed: {}", profile.id, e);
                }
            }
            Ok(UptimeAction::None) => {}
            Err(e) => {
                error!("[{}] uptime reconciliation failed: {}", profile.id, e);
            }
        }

        if let Err(e) = self.planner.run_scheduled(profile, now).await {
            error!("[{}] scheduled backup check failed: {}", profile.id, e);
        }

        if let Err(e) = self.health.evaluate(profile, now).await {
            error!("[{}] health evaluation failed: {}", profile.id, e);
        }

        if let Err(e) = self.updates.run_check(profile, now).await {
            error!("[{}] plugin update check failed: {}", profile.id, e);
        }
    }

    /// Drop all engine-owned state for a deleted server: stop-intent
    /// markers and persisted records. Called by the enclosing process as
    /// part of server deletion.
    pub async fn forget_server(&self, server_id: &str) {
        self.stop_intents.forget(server_id).await;
        if let Err(e) = self.store.remove_server(server_id).await {
            warn!("Failed to remove persisted state for {}: {}", server_id, e);
        }
    }
}
