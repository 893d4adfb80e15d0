//! Per-server automation configuration
//!
//! A [`ServerProfile`] bundles the four policies the engine evaluates each
//! tick: the weekly uptime schedule, the backup plan, the health policy, and
//! the plugin update policy. Profiles are produced by a
//! [`crate::services::ServerRegistry`] collaborator; this module only defines
//! the shapes and their documented defaults.

pub mod store;

pub use store::{ProfileStore, StaticRegistry};

use crate::constants::defaults;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One weekday's uptime window. Times are `HH:MM` strings; `"24:00"` is the
/// only valid hour-24 token and means midnight of the following day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DayWindow {
    pub enabled: bool,
    pub start: String,
    pub end: String,
}

impl Default for DayWindow {
    fn default() -> Self {
        Self {
            enabled: false,
            start: "09:00".to_string(),
            end: "22:00".to_string(),
        }
    }
}

/// Weekly uptime schedule. `windows` is indexed by weekday with Sunday = 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklySchedule {
    pub enabled: bool,
    /// IANA zone name, e.g. "Europe/Berlin"
    pub timezone: String,
    pub windows: Vec<DayWindow>,
}

impl WeeklySchedule {
    /// Window for a weekday index (Sunday = 0). Missing entries count as
    /// disabled days.
    pub fn window_for(&self, weekday: usize) -> Option<&DayWindow> {
        self.windows.get(weekday)
    }
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self {
            enabled: false,
            timezone: "UTC".to_string(),
            windows: default_week(),
        }
    }
}

fn default_week() -> Vec<DayWindow> {
    (0..7).map(|_| DayWindow::default()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupCadence {
    Daily,
    Weekly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupKind {
    /// World data only
    World,
    /// Full server directory
    Full,
}

/// Retention limits. A backup is deleted when it falls beyond `max_count`
/// (by recency) or is older than `max_age_days`; either condition alone is
/// sufficient. A zero value disables that condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionPolicy {
    pub max_count: usize,
    pub max_age_days: i64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_count: defaults::BACKUP_MAX_COUNT,
            max_age_days: defaults::BACKUP_MAX_AGE_DAYS,
        }
    }
}

/// Recurring backup plan plus event-backup flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupPlan {
    pub enabled: bool,
    pub schedule_type: BackupCadence,
    pub daily_time: String,
    /// Weekday for weekly backups, Sunday = 0
    pub weekly_day: u8,
    pub weekly_time: String,
    pub backup_on_start: bool,
    pub backup_on_stop: bool,
    pub retention: RetentionPolicy,
    pub backup_type: BackupKind,
}

impl BackupPlan {
    /// Configured target time for the active cadence.
    pub fn target_time(&self) -> &str {
        match self.schedule_type {
            BackupCadence::Daily => &self.daily_time,
            BackupCadence::Weekly => &self.weekly_time,
        }
    }
}

impl Default for BackupPlan {
    fn default() -> Self {
        Self {
            enabled: false,
            schedule_type: BackupCadence::Daily,
            daily_time: "04:00".to_string(),
            weekly_day: 0,
            weekly_time: "04:00".to_string(),
            backup_on_start: false,
            backup_on_stop: false,
            retention: RetentionPolicy::default(),
            backup_type: BackupKind::World,
        }
    }
}

/// Health evaluation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthPolicy {
    pub enabled: bool,
    pub check_interval_seconds: u64,
    pub tps_threshold: f64,
    pub memory_threshold_percent: f64,
    /// Degraded evaluations in a row before an auto-restart fires
    pub consecutive_failures: u32,
    pub auto_restart: bool,
    pub restart_cooldown_minutes: i64,
    pub crash_detection: bool,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_seconds: defaults::HEALTH_CHECK_INTERVAL_SECONDS,
            tps_threshold: defaults::TPS_THRESHOLD,
            memory_threshold_percent: defaults::MEMORY_THRESHOLD_PERCENT,
            consecutive_failures: defaults::CONSECUTIVE_FAILURES,
            auto_restart: false,
            restart_cooldown_minutes: defaults::RESTART_COOLDOWN_MINUTES,
            crash_detection: true,
        }
    }
}

/// Plugin update check policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginUpdatePolicy {
    pub enabled: bool,
    pub check_interval_hours: i64,
    pub exclude_plugins: HashSet<String>,
    pub notify_on_update: bool,
}

impl Default for PluginUpdatePolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            check_interval_hours: defaults::PLUGIN_CHECK_INTERVAL_HOURS,
            exclude_plugins: HashSet::new(),
            notify_on_update: true,
        }
    }
}

/// Everything the engine needs to know about one managed server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerProfile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub schedule: WeeklySchedule,
    #[serde(default)]
    pub backups: BackupPlan,
    #[serde(default)]
    pub health: HealthPolicy,
    #[serde(default)]
    pub plugin_updates: PluginUpdatePolicy,
}

impl ServerProfile {
    /// Fresh profile with all automation disabled, as created alongside a
    /// new server.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            schedule: WeeklySchedule::default(),
            backups: BackupPlan::default(),
            health: HealthPolicy::default(),
            plugin_updates: PluginUpdatePolicy::default(),
        }
    }
}
