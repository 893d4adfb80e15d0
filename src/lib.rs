//! Automation engine for managed game-server instances.
//!
//! Once per minute the engine walks every registered server and enforces
//! its automation profile: weekly uptime windows (with timezone-aware
//! midnight crossing), recurring and event-triggered backups with
//! retention, TPS/memory health monitoring with crash detection and
//! cooldown-limited auto-restarts, and periodic plugin update checks.
//!
//! The engine itself owns no infrastructure. Container control, backup
//! storage, the plugin catalog, notifications, and state persistence all
//! come in through the traits in [`services`] and [`state`], so the loop
//! can be driven against real containers or test doubles alike.

pub mod alerts;
pub mod backup;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod health;
pub mod plugins;
pub mod schedule;
pub mod services;
pub mod state;
pub mod stop_intent;

pub use engine::AutomationEngine;
