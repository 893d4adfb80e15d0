//! Backup planning and execution
//!
//! The planner decides when a recurring backup is due (a late tick gets one
//! minute of tolerance, never an early one, guarded by a minimum spacing so
//! the tolerance cannot double-fire), runs event backups off start/stop
//! actions, and applies retention after every successful run.

pub mod planner;

pub use planner::{BackupPlanner, EventTrigger};
