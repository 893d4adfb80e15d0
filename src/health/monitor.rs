//! Per-server health evaluation, crash detection, and auto-restart

use super::HealthLevel;
use crate::alerts::{AutomationEvent, EventKind, EventSeverity};
use crate::config::{HealthPolicy, ServerProfile};
use crate::constants::health::{
    CRASH_DETECTION_SLACK_SECONDS, CRITICAL_TPS_RATIO, MEMORY_HARD_CEILING_PERCENT,
};
use crate::services::{ContainerController, InstanceStatus, Notifier};
use crate::state::{self, HealthState, StateKind, StateStore};
use crate::stop_intent::StopIntentRegistry;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cooldown rule for auto-restarts: permitted when no restart has happened
/// yet or the configured minutes have fully elapsed.
pub fn restart_allowed(
    last_restart: Option<DateTime<Utc>>,
    cooldown_minutes: i64,
    now: DateTime<Utc>,
) -> bool {
    match last_restart {
        None => true,
        Some(last) => now.signed_duration_since(last) >= Duration::minutes(cooldown_minutes),
    }
}

pub struct HealthMonitor {
    containers: Arc<dyn ContainerController>,
    store: Arc<dyn StateStore>,
    notifier: Arc<dyn Notifier>,
    stop_intents: StopIntentRegistry,
}

impl HealthMonitor {
    pub fn new(
        containers: Arc<dyn ContainerController>,
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn Notifier>,
        stop_intents: StopIntentRegistry,
    ) -> Self {
        Self {
            containers,
            store,
            notifier,
            stop_intents,
        }
    }

    /// One health evaluation for one server, gated by the policy's check
    /// interval. All status transitions happen inside this call.
    pub async fn evaluate(&self, profile: &ServerProfile, now: DateTime<Utc>) -> Result<()> {
        let policy = &profile.health;
        if !policy.enabled {
            return Ok(());
        }

        let mut state: HealthState =
            state::load_or_default(self.store.as_ref(), &profile.id, StateKind::Health).await;

        if let Some(last) = state.last_check_time {
            let elapsed = now.signed_duration_since(last);
            if elapsed < Duration::seconds(policy.check_interval_seconds as i64) {
                return Ok(());
            }
        }

        let gap_seconds = state
            .last_check_time
            .map(|last| now.signed_duration_since(last).num_seconds());

        let status = self.containers.status(&profile.id).await?;

        if status.running {
            self.evaluate_running(profile, policy, &mut state, &status, now)
                .await;
        } else {
            self.evaluate_stopped(profile, policy, &mut state, gap_seconds, now)
                .await;
        }

        state.last_check_time = Some(now);
        state::save_record(self.store.as_ref(), &profile.id, StateKind::Health, &state).await?;
        Ok(())
    }

    /// A server found stopped is a crash candidate only when we saw it
    /// alive recently and nobody intended the stop.
    async fn evaluate_stopped(
        &self,
        profile: &ServerProfile,
        policy: &HealthPolicy,
        state: &mut HealthState,
        gap_seconds: Option<i64>,
        now: DateTime<Utc>,
    ) {
        // The interval gate guarantees the gap is at least one check
        // interval, so the window has to be relative to it.
        let crash_window = policy.check_interval_seconds as i64 + CRASH_DETECTION_SLACK_SECONDS;
        let seen_recently = gap_seconds.is_some_and(|gap| gap <= crash_window);
        let previously_observed = state.current_status != HealthLevel::Unknown;
        let intentional = self.stop_intents.is_marked(&profile.id, now).await;

        if policy.crash_detection && previously_observed && seen_recently && !intentional {
            warn!("Server {} found stopped unexpectedly, possible crash", profile.id);
            self.notifier
                .notify(
                    &profile.id,
                    AutomationEvent::new(
                        EventKind::CrashSuspected,
                        EventSeverity::Critical,
                        "Server stopped unexpectedly, possible crash",
                    )
                    .with_details(serde_json::json!({
                        "previous_status": state.current_status,
                        "gap_seconds": gap_seconds,
                    })),
                )
                .await;

            if policy.auto_restart
                && restart_allowed(state.last_restart_time, policy.restart_cooldown_minutes, now)
            {
                self.attempt_restart(profile, state, "crash recovery", now)
                    .await;
            }
        } else if intentional {
            debug!("Server {} stopped intentionally, no crash handling", profile.id);
        }

        state.current_status = HealthLevel::Unknown;
        state.consecutive_failures = 0;
        state.last_tps = None;
        state.last_memory_percent = None;
    }

    async fn evaluate_running(
        &self,
        profile: &ServerProfile,
        policy: &HealthPolicy,
        state: &mut HealthState,
        status: &InstanceStatus,
        now: DateTime<Utc>,
    ) {
        let level = evaluate_thresholds(policy, status);
        let previous = state.current_status;

        state.last_tps = status.tps;
        state.last_memory_percent = status.memory_percent;
        state.current_status = level;

        if level == HealthLevel::Healthy {
            state.consecutive_failures = 0;
            if previous.is_degraded() {
                info!("Server {} recovered to healthy", profile.id);
                self.notifier
                    .notify(
                        &profile.id,
                        AutomationEvent::new(
                            EventKind::HealthRecovered,
                            EventSeverity::Recovery,
                            "Server health recovered",
                        ),
                    )
                    .await;
            }
            return;
        }

        state.consecutive_failures += 1;

        // Alert only on the edge into a degraded level; a continuing streak
        // stays quiet.
        if !previous.is_degraded() {
            let severity = match level {
                HealthLevel::Critical => EventSeverity::Critical,
                _ => EventSeverity::Warning,
            };
            warn!(
                "Server {} degraded to {:?} (tps: {:?}, memory: {:?}%)",
                profile.id, level, status.tps, status.memory_percent
            );
            self.notifier
                .notify(
                    &profile.id,
                    AutomationEvent::new(
                        EventKind::HealthAlert,
                        severity,
                        format!("Server health degraded to {:?}", level),
                    )
                    .with_details(serde_json::json!({
                        "tps": status.tps,
                        "memory_percent": status.memory_percent,
                        "status": level,
                    })),
                )
                .await;
        }

        if policy.auto_restart
            && state.consecutive_failures >= policy.consecutive_failures
            && restart_allowed(state.last_restart_time, policy.restart_cooldown_minutes, now)
        {
            self.attempt_restart(profile, state, "degraded health", now)
                .await;
        }
    }

    /// The restart itself is intentional, so the stop intent is marked first
    /// to keep the next evaluation from reading it as a crash.
    async fn attempt_restart(
        &self,
        profile: &ServerProfile,
        state: &mut HealthState,
        reason: &str,
        now: DateTime<Utc>,
    ) {
        info!("Auto-restarting {} ({})", profile.id, reason);
        self.stop_intents.mark(&profile.id, now).await;

        match self.containers.restart(&profile.id).await {
            Ok(()) => {
                state.last_restart_time = Some(now);
                state.consecutive_failures = 0;
                state.current_status = HealthLevel::Unknown;
                self.notifier
                    .notify(
                        &profile.id,
                        AutomationEvent::new(
                            EventKind::AutoRestart,
                            EventSeverity::Info,
                            format!("Server auto-restarted ({})", reason),
                        ),
                    )
                    .await;
            }
            Err(e) => {
                warn!("Auto-restart failed for {}: {}", profile.id, e);
            }
        }
    }
}

fn evaluate_thresholds(policy: &HealthPolicy, status: &InstanceStatus) -> HealthLevel {
    let tps_level = match status.tps {
        Some(tps) if tps < policy.tps_threshold * CRITICAL_TPS_RATIO => HealthLevel::Critical,
        Some(tps) if tps < policy.tps_threshold => HealthLevel::Warning,
        _ => HealthLevel::Healthy,
    };

    let memory_level = match status.memory_percent {
        Some(memory) if memory > MEMORY_HARD_CEILING_PERCENT => HealthLevel::Critical,
        Some(memory) if memory > policy.memory_threshold_percent => HealthLevel::Warning,
        _ => HealthLevel::Healthy,
    };

    tps_level.worse(memory_level)
}
