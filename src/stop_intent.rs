//! Intentional-stop tracking
//!
//! A server being stopped on purpose (scheduled stop, auto-restart) is
//! marked here so the health monitor does not classify the resulting
//! "not running" observation as a crash. Markers live for a short TTL and
//! are never persisted: losing them on process restart can at worst turn
//! one legitimate stop into a suspected crash.

use crate::constants::stop_intent::TTL_SECONDS;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

pub struct StopIntentRegistry {
    entries: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl StopIntentRegistry {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Mark a server as stopping intentionally, refreshing any prior marker.
    pub async fn mark(&self, server_id: &str, now: DateTime<Utc>) {
        let mut entries = self.entries.write().await;
        entries.insert(server_id.to_string(), now);
        debug!("Marked stop intent for {}", server_id);
    }

    /// Whether an unexpired marker exists for the server.
    pub async fn is_marked(&self, server_id: &str, now: DateTime<Utc>) -> bool {
        let entries = self.entries.read().await;
        match entries.get(server_id) {
            Some(marked_at) => now.signed_duration_since(*marked_at) <= Duration::seconds(TTL_SECONDS),
            None => false,
        }
    }

    /// Drop expired markers; returns how many were removed.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, marked_at| {
            now.signed_duration_since(*marked_at) <= Duration::seconds(TTL_SECONDS)
        });
        before - entries.len()
    }

    /// Remove any marker for a deleted server.
    pub async fn forget(&self, server_id: &str) {
        let mut entries = self.entries.write().await;
        if entries.remove(server_id).is_some() {
            debug!("Cleared stop intent for {}", server_id);
        }
    }
}

impl Clone for StopIntentRegistry {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl Default for StopIntentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
