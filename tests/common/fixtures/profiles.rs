//! Server profile builders
//!
//! Each builder starts from [`ServerProfile::new`] (all automation off) and
//! enables only the policy under test, so test outcomes are never driven by
//! an unrelated subsystem.

use automation::config::{BackupCadence, DayWindow, ServerProfile};

/// Profile with all automation disabled, including the default-on health
/// policy.
pub fn bare_profile(id: &str) -> ServerProfile {
    let mut profile = ServerProfile::new(id, id);
    profile.health.enabled = false;
    profile
}

/// Profile with a single enabled uptime window on one weekday (Sunday = 0).
pub fn windowed_profile(
    id: &str,
    timezone: &str,
    weekday: usize,
    start: &str,
    end: &str,
) -> ServerProfile {
    let mut profile = bare_profile(id);
    profile.schedule.enabled = true;
    profile.schedule.timezone = timezone.to_string();
    profile.schedule.windows[weekday] = DayWindow {
        enabled: true,
        start: start.to_string(),
        end: end.to_string(),
    };
    profile
}

/// Profile with a daily backup at the given local time (schedule timezone
/// stays UTC).
pub fn daily_backup_profile(id: &str, time: &str) -> ServerProfile {
    let mut profile = bare_profile(id);
    profile.backups.enabled = true;
    profile.backups.schedule_type = BackupCadence::Daily;
    profile.backups.daily_time = time.to_string();
    profile
}

/// Profile with a weekly backup on one weekday (Sunday = 0).
pub fn weekly_backup_profile(id: &str, weekday: u8, time: &str) -> ServerProfile {
    let mut profile = bare_profile(id);
    profile.backups.enabled = true;
    profile.backups.schedule_type = BackupCadence::Weekly;
    profile.backups.weekly_day = weekday;
    profile.backups.weekly_time = time.to_string();
    profile
}

/// Profile with health monitoring enabled and auto-restart on.
pub fn health_profile(id: &str) -> ServerProfile {
    let mut profile = bare_profile(id);
    profile.health.enabled = true;
    profile.health.auto_restart = true;
    profile
}
