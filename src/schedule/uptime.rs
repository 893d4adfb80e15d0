//! Desired-vs-actual run state reconciliation

use super::window::is_within_window;
use crate::config::ServerProfile;
use crate::services::ContainerController;
use crate::stop_intent::StopIntentRegistry;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// What a reconciliation pass did for one server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UptimeAction {
    None,
    Started,
    Stopped,
}

pub struct UptimeScheduler {
    containers: Arc<dyn ContainerController>,
    stop_intents: StopIntentRegistry,
}

impl UptimeScheduler {
    pub fn new(containers: Arc<dyn ContainerController>, stop_intents: StopIntentRegistry) -> Self {
        Self {
            containers,
            stop_intents,
        }
    }

    /// Bring the server's actual run state in line with its weekly schedule.
    /// A disabled schedule means "hands off", not "stop the server". The
    /// stop intent is marked before a scheduled stop so the health monitor
    /// does not read it as a crash.
    pub async fn reconcile(
        &self,
        profile: &ServerProfile,
        now: DateTime<Utc>,
    ) -> Result<UptimeAction> {
        if !profile.schedule.enabled {
            return Ok(UptimeAction::None);
        }

        let desired = is_within_window(&profile.schedule, now);
        let status = self.containers.status(&profile.id).await?;

        match (desired, status.running) {
            (true, false) => {
                info!("Uptime window open for {}, starting server", profile.id);
                self.containers.start(&profile.id).await?;
                Ok(UptimeAction::Started)
            }
            (false, true) => {
                info!("Uptime window closed for {}, stopping server", profile.id);
                self.stop_intents.mark(&profile.id, now).await;
                self.containers.stop(&profile.id).await?;
                Ok(UptimeAction::Stopped)
            }
            _ => Ok(UptimeAction::None),
        }
    }
}
