use crate::config::TrackerConfig;
use crate::error::Result;
use crate::tracker::{TrackerActor, TrackerClient};
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

/// The tracker actor task ended abnormally.
#[derive(Debug, Error)]
#[error("Tracker task failed: {0}")]
pub struct ShutdownError(#[from] JoinError);

/// Starts and stops the tracker.
///
/// `TrackerSystem` is the one place the tracker is constructed. Hand clones of
/// [`client`](Self::client) to customer sessions, the picker and the views.
///
/// ```ignore
/// let system = TrackerSystem::start(TrackerConfig::default()).await?;
/// let id = system.client.submit("alice", lines).await?;
/// system.shutdown().await?;
/// ```
pub struct TrackerSystem {
    pub client: TrackerClient,
    handle: JoinHandle<()>,
}

impl TrackerSystem {
    /// Prepares the layout, rebuilds the index and spawns the actor loop.
    pub async fn start(config: TrackerConfig) -> Result<Self> {
        info!(root = %config.root.display(), "Starting tracker");
        let (actor, client) = TrackerActor::open(&config).await?;
        let handle = tokio::spawn(actor.run());
        Ok(Self { client, handle })
    }

    /// Closes the request queue and waits for the actor to drain it.
    ///
    /// Clones of the client held elsewhere keep the actor alive; drop them
    /// first.
    pub async fn shutdown(self) -> Result<(), ShutdownError> {
        info!("Shutting down tracker...");
        drop(self.client);

        if let Err(e) = self.handle.await {
            error!(error = %e, "Tracker task failed");
            return Err(e.into());
        }

        info!("Tracker shutdown complete.");
        Ok(())
    }
}
