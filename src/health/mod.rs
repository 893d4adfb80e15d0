//! Health evaluation
//!
//! Each server moves through `Unknown -> Healthy/Warning/Critical` as the
//! monitor samples TPS and memory. Alerts fire on the transition into a
//! degraded level, not on every degraded sample.

pub mod monitor;

pub use monitor::{restart_allowed, HealthMonitor};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    #[default]
    Unknown,
    Healthy,
    Warning,
    Critical,
}

impl HealthLevel {
    pub fn is_degraded(&self) -> bool {
        matches!(self, HealthLevel::Warning | HealthLevel::Critical)
    }

    fn rank(&self) -> u8 {
        match self {
            HealthLevel::Unknown => 0,
            HealthLevel::Healthy => 1,
            HealthLevel::Warning => 2,
            HealthLevel::Critical => 3,
        }
    }

    /// The worse of two independently evaluated levels.
    pub fn worse(self, other: HealthLevel) -> HealthLevel {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}
