//! Custom error types for the automation engine
//!
//! Schedule configuration faults are deliberately small and local: the
//! governing checks catch them and return a safe negative result instead of
//! propagating them out of a tick.

use std::fmt;

/// Errors raised while interpreting schedule configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A time token that is not `HH:MM` (or the `24:00` sentinel)
    InvalidTime { value: String },

    /// A timezone name that is not a known IANA zone
    UnknownTimezone { zone: String },

    /// A weekday index outside 0..=6
    InvalidWeekday { value: u8 },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::InvalidTime { value } => {
                write!(f, "Invalid time token '{}': expected HH:MM", value)
            }
            ScheduleError::UnknownTimezone { zone } => {
                write!(f, "Unknown timezone '{}'", zone)
            }
            ScheduleError::InvalidWeekday { value } => {
                write!(f, "Weekday {} is outside the valid range 0-6", value)
            }
        }
    }
}

impl std::error::Error for ScheduleError {}
