//! First-run preparation of the on-disk layout.

use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::model::OrderState;
use std::path::Path;
use tokio::fs;
use tracing::info;

/// Creates the root, the three state directories and the counter file.
///
/// Anything that already exists is left as it is, so this is safe to call on
/// every start.
pub async fn prepare_layout(config: &TrackerConfig) -> Result<()> {
    ensure_dir(&config.root).await?;
    for state in OrderState::ALL {
        ensure_dir(&config.state_dir(state)).await?;
    }

    let counter = config.counter_path();
    if !exists(&counter).await? {
        fs::write(&counter, "0")
            .await
            .map_err(|e| TrackerError::storage(&counter, e))?;
        info!(path = %counter.display(), "Created order counter");
    }
    Ok(())
}

async fn ensure_dir(path: &Path) -> Result<()> {
    if exists(path).await? {
        return Ok(());
    }
    fs::create_dir_all(path)
        .await
        .map_err(|e| TrackerError::storage(path, e))?;
    info!(path = %path.display(), "Created directory");
    Ok(())
}

async fn exists(path: &Path) -> Result<bool> {
    fs::try_exists(path).await.map_err(|e| TrackerError::storage(path, e))
}
