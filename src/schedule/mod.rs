//! Uptime scheduling
//!
//! [`window`] answers the pure question "should this server be running right
//! now?"; [`uptime`] reconciles that answer against the actual container
//! state once per tick.

pub mod uptime;
pub mod window;

pub use uptime::{UptimeAction, UptimeScheduler};
pub use window::{is_within_window, parse_minute_of_day};
