//! Recurring and event-triggered backup execution

use crate::alerts::{AutomationEvent, EventKind, EventSeverity};
use crate::config::{BackupCadence, BackupPlan, ServerProfile};
use crate::constants::backups::{
    DAILY_MIN_SPACING_HOURS, SCHEDULE_TOLERANCE_MINUTES, WEEKLY_MIN_SPACING_DAYS,
};
use crate::constants::windows::END_OF_DAY;
use crate::schedule::parse_minute_of_day;
use crate::services::{BackupService, Notifier};
use crate::state::{self, BackupState, StateKind, StateStore};
use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{info, warn};

/// Which lifecycle edge triggered an event backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTrigger {
    Start,
    Stop,
}

impl EventTrigger {
    fn label(&self) -> &'static str {
        match self {
            EventTrigger::Start => "on_start",
            EventTrigger::Stop => "on_stop",
        }
    }
}

/// Timezone the server's backup times are expressed in. Falls back to UTC
/// when the schedule carries no usable zone.
pub fn schedule_tz(profile: &ServerProfile) -> Tz {
    profile
        .schedule
        .timezone
        .parse()
        .unwrap_or(chrono_tz::UTC)
}

/// Configured target minute of day; the `24:00` sentinel collapses to
/// midnight for backup purposes.
fn target_minute(plan: &BackupPlan) -> Option<u32> {
    match parse_minute_of_day(plan.target_time()) {
        Ok(minute) if minute == END_OF_DAY => Some(0),
        Ok(minute) => Some(minute),
        Err(e) => {
            warn!("Ignoring backup plan with bad time: {}", e);
            None
        }
    }
}

/// Whether a recurring backup is due at `now`. Minute-granular ticks may
/// drift, so a tick up to one minute late still fires; a backup never fires
/// before its configured time. The minimum spacing since the last run
/// (23 h daily, 6 d weekly) keeps the tolerance and process restarts from
/// double-firing.
pub fn should_run_scheduled(
    plan: &BackupPlan,
    state: &BackupState,
    now: DateTime<Utc>,
    tz: Tz,
) -> bool {
    if !plan.enabled {
        return false;
    }

    let Some(target) = target_minute(plan) else {
        return false;
    };

    let local = now.with_timezone(&tz);

    if plan.schedule_type == BackupCadence::Weekly {
        if plan.weekly_day > 6 {
            warn!("Ignoring backup plan with weekday {}", plan.weekly_day);
            return false;
        }
        if local.weekday().num_days_from_sunday() != u32::from(plan.weekly_day) {
            return false;
        }
    }

    let minute = i64::from(local.hour() * 60 + local.minute());
    let lateness = minute - i64::from(target);
    if lateness < 0 || lateness > SCHEDULE_TOLERANCE_MINUTES {
        return false;
    }

    if let Some(last) = state.last_backup_time {
        let min_spacing = match plan.schedule_type {
            BackupCadence::Daily => Duration::hours(DAILY_MIN_SPACING_HOURS),
            BackupCadence::Weekly => Duration::days(WEEKLY_MIN_SPACING_DAYS),
        };
        if now.signed_duration_since(last) < min_spacing {
            return false;
        }
    }

    true
}

/// Next occurrence of the configured time, in UTC. `None` when the plan is
/// disabled or its configuration cannot be interpreted.
pub fn next_run_time(plan: &BackupPlan, now: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
    if !plan.enabled {
        return None;
    }

    let target = target_minute(plan)?;
    let local = now.with_timezone(&tz);
    let today = local.date_naive();

    match plan.schedule_type {
        BackupCadence::Daily => {
            // Today if the time is still ahead, otherwise tomorrow; the
            // extra iteration absorbs a DST gap swallowing the target time.
            let mut date = today;
            for _ in 0..3 {
                if let Some(candidate) = resolve_local(date, target, tz) {
                    if candidate > now {
                        return Some(candidate);
                    }
                }
                date = date.succ_opt()?;
            }
            None
        }
        BackupCadence::Weekly => {
            if plan.weekly_day > 6 {
                return None;
            }
            let today_weekday = local.weekday().num_days_from_sunday();
            let days_ahead = (u32::from(plan.weekly_day) + 7 - today_weekday) % 7;
            let date = today.checked_add_days(chrono::Days::new(u64::from(days_ahead)))?;

            if let Some(candidate) = resolve_local(date, target, tz) {
                if candidate > now {
                    return Some(candidate);
                }
            }
            // Today but already passed: next week.
            let date = date.checked_add_days(chrono::Days::new(7))?;
            resolve_local(date, target, tz)
        }
    }
}

fn resolve_local(date: NaiveDate, minute: u32, tz: Tz) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(minute / 60, minute % 60, 0)?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

pub struct BackupPlanner {
    backups: Arc<dyn BackupService>,
    store: Arc<dyn StateStore>,
    notifier: Arc<dyn Notifier>,
}

impl BackupPlanner {
    pub fn new(
        backups: Arc<dyn BackupService>,
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            backups,
            store,
            notifier,
        }
    }

    /// Per-tick entry point: run the recurring backup if it is due.
    pub async fn run_scheduled(&self, profile: &ServerProfile, now: DateTime<Utc>) -> Result<()> {
        let tz = schedule_tz(profile);
        let state: BackupState =
            state::load_or_default(self.store.as_ref(), &profile.id, StateKind::Backup).await;

        if !should_run_scheduled(&profile.backups, &state, now, tz) {
            return Ok(());
        }

        info!("Scheduled backup due for {}", profile.id);
        self.execute(profile, now, "scheduled").await
    }

    /// Event backup off a start/stop action; skips the time-window gate.
    pub async fn run_event(
        &self,
        profile: &ServerProfile,
        trigger: EventTrigger,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let wanted = match trigger {
            EventTrigger::Start => profile.backups.backup_on_start,
            EventTrigger::Stop => profile.backups.backup_on_stop,
        };
        if !wanted {
            return Ok(());
        }

        info!("Running {} backup for {}", trigger.label(), profile.id);
        self.execute(profile, now, trigger.label()).await
    }

    /// Create the archive, record the outcome, then apply retention. A
    /// failed archive is a state flag and a notification, not an error.
    async fn execute(&self, profile: &ServerProfile, now: DateTime<Utc>, trigger: &str) -> Result<()> {
        let plan = &profile.backups;
        let tz = schedule_tz(profile);
        let result = self.backups.create(&profile.id, plan.backup_type).await;

        let mut state: BackupState =
            state::load_or_default(self.store.as_ref(), &profile.id, StateKind::Backup).await;
        state.last_backup_time = Some(now);
        state.last_backup_type = Some(plan.backup_type);
        state.last_backup_success = result.is_ok();
        state.next_scheduled_backup = next_run_time(plan, now, tz);
        state::save_record(self.store.as_ref(), &profile.id, StateKind::Backup, &state).await?;

        match result {
            Ok(backup) => {
                info!(
                    "Backup {} created for {} ({} bytes)",
                    backup.filename, profile.id, backup.size_bytes
                );
                self.notifier
                    .notify(
                        &profile.id,
                        AutomationEvent::new(
                            EventKind::BackupCompleted,
                            EventSeverity::Info,
                            format!("Backup {} created", backup.filename),
                        )
                        .with_details(serde_json::json!({
                            "backup_id": backup.id,
                            "filename": backup.filename,
                            "size_bytes": backup.size_bytes,
                            "trigger": trigger,
                        })),
                    )
                    .await;

                self.apply_retention(profile, now).await;
            }
            Err(e) => {
                warn!("Backup failed for {}: {}", profile.id, e);
                self.notifier
                    .notify(
                        &profile.id,
                        AutomationEvent::new(
                            EventKind::BackupFailed,
                            EventSeverity::Warning,
                            format!("Backup failed: {}", e),
                        )
                        .with_details(serde_json::json!({ "trigger": trigger })),
                    )
                    .await;
            }
        }

        Ok(())
    }

    /// Delete backups beyond the retention count or age. The two conditions
    /// are independent, and one failed deletion never blocks the rest.
    pub async fn apply_retention(&self, profile: &ServerProfile, now: DateTime<Utc>) {
        let retention = &profile.backups.retention;
        if retention.max_count == 0 && retention.max_age_days == 0 {
            return;
        }

        let mut backups = match self.backups.list(&profile.id).await {
            Ok(backups) => backups,
            Err(e) => {
                warn!("Retention skipped for {}: listing failed: {}", profile.id, e);
                return;
            }
        };

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        for (index, backup) in backups.iter().enumerate() {
            let beyond_count = retention.max_count > 0 && index >= retention.max_count;
            let too_old = retention.max_age_days > 0
                && now.signed_duration_since(backup.created_at)
                    > Duration::days(retention.max_age_days);

            if !beyond_count && !too_old {
                continue;
            }

            match self.backups.delete(&profile.id, &backup.id).await {
                Ok(true) => {
                    info!("Retention deleted backup {} for {}", backup.filename, profile.id);
                }
                Ok(false) => {
                    warn!(
                        "Retention could not find backup {} for {}",
                        backup.id, profile.id
                    );
                }
                Err(e) => {
                    warn!(
                        "Retention failed to delete backup {} for {}: {}",
                        backup.id, profile.id, e
                    );
                }
            }
        }
    }
}
