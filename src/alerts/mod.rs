//! Notification event model
//!
//! Every side effect the engine wants an operator to hear about is expressed
//! as an [`AutomationEvent`] and handed to the injected
//! [`crate::services::Notifier`]. Delivery is fire-and-forget: a failed
//! notification is logged by the notifier and never becomes a scheduling
//! error.

pub mod webhook;

pub use webhook::WebhookNotifier;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CrashSuspected,
    HealthAlert,
    HealthRecovered,
    AutoRestart,
    BackupCompleted,
    BackupFailed,
    PluginUpdatesAvailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    Critical,
    Warning,
    Info,
    Recovery,
}

#[derive(Debug, Clone, Serialize)]
pub struct AutomationEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    pub severity: EventSeverity,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl AutomationEvent {
    pub fn new(kind: EventKind, severity: EventSeverity, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            severity,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
