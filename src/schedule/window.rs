//! Weekly window evaluation
//!
//! A window is inclusive at its start minute and exclusive at its end
//! minute. A window crosses midnight when its start is not strictly before
//! its end; the `24:00` start sentinel is the extreme case and means "from
//! midnight of the following day", so the configured day itself never
//! matches. Only the tail on the next day does, up to the end time.
//! Evaluating a given instant therefore has to look at two windows: today's
//! and, for the crossing case, yesterday's.

use crate::config::{DayWindow, WeeklySchedule};
use crate::constants::windows::END_OF_DAY;
use crate::errors::ScheduleError;
use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Parse an `HH:MM` token into a minute of day in `[0, 1440]`. `"24:00"` is
/// the only valid hour-24 token.
pub fn parse_minute_of_day(token: &str) -> Result<u32, ScheduleError> {
    let invalid = || ScheduleError::InvalidTime {
        value: token.to_string(),
    };

    let (hours, minutes) = token.split_once(':').ok_or_else(invalid)?;
    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;

    match (hours, minutes) {
        (24, 0) => Ok(END_OF_DAY),
        (h, m) if h < 24 && m < 60 => Ok(h * 60 + m),
        _ => Err(invalid()),
    }
}

/// Whether `now` falls inside the schedule's configured uptime. Unknown
/// timezones and unparseable window times yield `false`.
pub fn is_within_window(schedule: &WeeklySchedule, now: DateTime<Utc>) -> bool {
    if !schedule.enabled {
        return false;
    }

    let tz: Tz = match schedule.timezone.parse() {
        Ok(tz) => tz,
        Err(_) => {
            warn!("Unknown timezone '{}' in weekly schedule", schedule.timezone);
            return false;
        }
    };

    let local = now.with_timezone(&tz);
    let weekday = local.weekday().num_days_from_sunday() as usize;
    let minute = local.hour() * 60 + local.minute();

    if let Some(window) = schedule.window_for(weekday) {
        if matches_today(window, minute) {
            return true;
        }
    }

    // A window like Friday 24:00-01:00 must still be active during the
    // first minutes of Saturday.
    let yesterday = (weekday + 6) % 7;
    schedule
        .window_for(yesterday)
        .is_some_and(|window| matches_overnight_tail(window, minute))
}

fn window_bounds(window: &DayWindow) -> Option<(u32, u32)> {
    if !window.enabled {
        return None;
    }

    let start = match parse_minute_of_day(&window.start) {
        Ok(start) => start,
        Err(e) => {
            warn!("Ignoring window with bad start time: {}", e);
            return None;
        }
    };
    let end = match parse_minute_of_day(&window.end) {
        Ok(end) => end,
        Err(e) => {
            warn!("Ignoring window with bad end time: {}", e);
            return None;
        }
    };

    Some((start, end))
}

fn crosses_midnight(start: u32, end: u32) -> bool {
    start == END_OF_DAY || start >= end
}

fn matches_today(window: &DayWindow, minute: u32) -> bool {
    let Some((start, end)) = window_bounds(window) else {
        return false;
    };

    if crosses_midnight(start, end) {
        // Start inclusive; a 24:00 start can never match on its own day.
        minute >= start
    } else {
        start <= minute && minute < end
    }
}

fn matches_overnight_tail(window: &DayWindow, minute: u32) -> bool {
    let Some((start, end)) = window_bounds(window) else {
        return false;
    };

    crosses_midnight(start, end) && minute < end
}
