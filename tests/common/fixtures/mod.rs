//! Reusable test utilities:
//! - Scripted collaborator mocks (containers, backups, catalog, notifier)
//! - Server profile builders
//! - Common test data

// Fixtures are shared across test binaries; not every binary uses every item.
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mocks;
pub mod profiles;
pub mod test_data;

pub use mocks::{MockBackupService, RecordingNotifier, ScriptedContainers, StaticCatalog};
pub use profiles::*;
pub use test_data::*;

/// Route engine logs through the test harness so a failing test prints them.
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
