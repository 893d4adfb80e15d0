//! Common test data and constants

use chrono::{DateTime, TimeZone, Utc};

/// Common test server ids
pub mod servers {
    pub const SERVER_1: &str = "test-server-1";
    pub const SERVER_2: &str = "test-server-2";
}

/// UTC instant from calendar components.
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
}
