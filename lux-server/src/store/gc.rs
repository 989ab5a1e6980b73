//! TTL garbage collection of guest session directories
//!
//! Guest uploads create `guest-<uuid>` directories that nothing ever
//! deletes on request, so a background sweeper reclaims the ones whose
//! newest content has aged past the configured TTL.

use super::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Spawn the periodic guest sweeper
///
/// Runs until the task is aborted (server shutdown). Sweep failures are
/// logged and the loop keeps going; a failed sweep only delays cleanup.
pub fn spawn_guest_sweeper(
    store: Arc<SessionStore>,
    ttl: Duration,
    sweep_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        // First tick fires immediately; skip it so startup stays quick
        interval.tick().await;

        loop {
            interval.tick().await;
            let store = store.clone();
            let result =
                tokio::task::spawn_blocking(move || store.sweep_guest_sessions(ttl)).await;
            match result {
                Ok(Ok(0)) => debug!("Guest sweep: nothing expired"),
                Ok(Ok(removed)) => debug!("Guest sweep: removed {} directories", removed),
                Ok(Err(e)) => warn!("Guest sweep failed: {}", e),
                Err(e) => warn!("Guest sweep task panicked: {}", e),
            }
        }
    })
}
