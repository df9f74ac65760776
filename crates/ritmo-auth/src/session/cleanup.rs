//! Periodic purge of expired and revoked refresh tokens.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use ritmo_core::error::AppError;

use super::manager::SessionManager;

/// Handles periodic cleanup of stale session rows.
#[derive(Clone)]
pub struct SessionCleanup {
    /// Session manager for purging.
    manager: Arc<SessionManager>,
    /// Interval between cleanup cycles.
    interval: Duration,
}

impl std::fmt::Debug for SessionCleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCleanup")
            .field("interval", &self.interval)
            .finish()
    }
}

impl SessionCleanup {
    /// Creates a new cleanup handler.
    pub fn new(manager: Arc<SessionManager>, interval: Duration) -> Self {
        Self { manager, interval }
    }

    /// Runs a single cleanup cycle. Returns the number of rows purged.
    pub async fn run_cleanup(&self) -> Result<u64, AppError> {
        self.manager.purge_expired().await
    }

    /// Spawns the background cleanup loop. The loop exits when the shutdown
    /// channel is signalled.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // The first tick fires immediately; skip it so startup is quiet.
            ticker.tick().await;

            info!(interval_secs = self.interval.as_secs(), "Session cleanup task started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_cleanup().await {
                            error!(error = %e, "Session cleanup cycle failed");
                        }
                    }
                    _ = shutdown.changed() => {
                        info!("Session cleanup task stopping");
                        break;
                    }
                }
            }
        })
    }
}
