//! Application-wide constants for intervals, guards, and limits
//!
//! Organized by sub-system to provide a single source of truth for the
//! magic numbers the automation engine relies on.

/// Engine tick loop constants
pub mod ticker {
    /// Seconds between automation ticks (one decision opportunity per server)
    pub const TICK_INTERVAL_SECONDS: u64 = 60;
}

/// Weekly uptime window constants
pub mod windows {
    /// Minutes in a calendar day
    pub const MINUTES_PER_DAY: u32 = 1440;

    /// The "24:00" end-of-day sentinel, in minutes
    pub const END_OF_DAY: u32 = 1440;
}

/// Backup scheduling guards
pub mod backups {
    /// Late tolerance past the configured time, in minutes (ticks may
    /// drift; a backup never fires early)
    pub const SCHEDULE_TOLERANCE_MINUTES: i64 = 1;

    /// Minimum spacing between daily backups (idempotence guard)
    pub const DAILY_MIN_SPACING_HOURS: i64 = 23;

    /// Minimum spacing between weekly backups (idempotence guard)
    pub const WEEKLY_MIN_SPACING_DAYS: i64 = 6;
}

/// Health evaluation constants
pub mod health {
    /// TPS below `tps_threshold * CRITICAL_TPS_RATIO` is critical
    pub const CRITICAL_TPS_RATIO: f64 = 0.5;

    /// Memory above this percentage is critical regardless of policy
    pub const MEMORY_HARD_CEILING_PERCENT: f64 = 95.0;

    /// Extra seconds past the policy check interval within which a stopped
    /// server still counts as recently observed (crash candidate)
    pub const CRASH_DETECTION_SLACK_SECONDS: i64 = 120;
}

/// Stop-intent registry constants
pub mod stop_intent {
    /// Seconds an intentional-stop marker stays valid
    pub const TTL_SECONDS: i64 = 60;
}

/// Webhook notification constants
pub mod webhook {
    /// Timeout for outbound webhook requests
    pub const TIMEOUT_SECONDS: u64 = 10;
}

/// Default policy values (used for missing config fields)
pub mod defaults {
    /// Default health check interval in seconds
    pub const HEALTH_CHECK_INTERVAL_SECONDS: u64 = 60;

    /// Default TPS warning threshold
    pub const TPS_THRESHOLD: f64 = 15.0;

    /// Default memory warning threshold in percent
    pub const MEMORY_THRESHOLD_PERCENT: f64 = 85.0;

    /// Default consecutive failures before an auto-restart
    pub const CONSECUTIVE_FAILURES: u32 = 3;

    /// Default auto-restart cooldown in minutes
    pub const RESTART_COOLDOWN_MINUTES: i64 = 10;

    /// Default plugin update check interval in hours
    pub const PLUGIN_CHECK_INTERVAL_HOURS: i64 = 24;

    /// Default backup retention count
    pub const BACKUP_MAX_COUNT: usize = 10;

    /// Default backup retention age in days
    pub const BACKUP_MAX_AGE_DAYS: i64 = 30;
}
