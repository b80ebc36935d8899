//! File-backed order records.
//!
//! One JSON file per order, named `<id>.json`, living in the directory of its
//! current state. The directory is the authority: a transition is a single
//! `rename` from one state directory to the next, so after a crash the record
//! is in exactly one of them. The state tag inside the file is rewritten after
//! the move and is only advisory.

use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::model::{Order, OrderId, OrderState};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

const RECORD_EXTENSION: &str = "json";

pub struct OrderStore {
    placed: PathBuf,
    in_progress: PathBuf,
    done: PathBuf,
}

impl OrderStore {
    /// Points the store at the state directories named by `config`.
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            placed: config.state_dir(OrderState::Placed),
            in_progress: config.state_dir(OrderState::InProgress),
            done: config.state_dir(OrderState::Done),
        }
    }

    /// Directory holding records in `state`.
    pub fn state_dir(&self, state: OrderState) -> &Path {
        match state {
            OrderState::Placed => &self.placed,
            OrderState::InProgress => &self.in_progress,
            OrderState::Done => &self.done,
        }
    }

    /// Path of the record for `id` if it were in `state`.
    pub fn record_path(&self, id: OrderId, state: OrderState) -> PathBuf {
        self.state_dir(state).join(format!("{id}.{RECORD_EXTENSION}"))
    }

    /// State directory currently holding a record for `id`, if any.
    pub async fn locate(&self, id: OrderId) -> Result<Option<OrderState>> {
        for state in OrderState::ALL {
            let path = self.record_path(id, state);
            match fs::try_exists(&path).await {
                Ok(true) => return Ok(Some(state)),
                Ok(false) => {}
                Err(e) => return Err(TrackerError::storage(path, e)),
            }
        }
        Ok(None)
    }

    /// Writes a new placed record.
    pub async fn create(&self, order: &Order) -> Result<()> {
        if order.state != OrderState::Placed {
            return Err(TrackerError::InvalidTransition {
                from: OrderState::Placed,
                to: order.state,
            });
        }
        if self.locate(order.id).await?.is_some() {
            return Err(TrackerError::DuplicateId(order.id));
        }
        let path = self.record_path(order.id, OrderState::Placed);
        write_record(&path, order).await?;
        debug!(order_id = %order.id, path = %path.display(), "Record created");
        Ok(())
    }

    /// Moves the record for `id` one step forward and returns the updated order.
    pub async fn transition(&self, id: OrderId, from: OrderState, to: OrderState) -> Result<Order> {
        if from.successor() != Some(to) {
            return Err(TrackerError::InvalidTransition { from, to });
        }
        let source = self.record_path(id, from);
        let target = self.record_path(id, to);

        let mut order = match read_record(&source).await {
            Ok(order) => order,
            Err(TrackerError::Storage { source: e, .. })
                if e.kind() == std::io::ErrorKind::NotFound =>
            {
                return Err(TrackerError::NotFound { id, state: from });
            }
            Err(e) => return Err(e),
        };

        fs::rename(&source, &target)
            .await
            .map_err(|e| TrackerError::storage(&target, e))?;

        order.mark(to, Utc::now());
        if let Err(e) = write_record(&target, &order).await {
            // The move already happened; the directory carries the state.
            warn!(order_id = %id, error = %e, "State tag not rewritten after move");
        }
        info!(order_id = %id, %from, %to, "Record moved");
        Ok(order)
    }

    /// Reads the full record for `id` from the `state` directory.
    pub async fn read(&self, id: OrderId, state: OrderState) -> Result<Order> {
        let path = self.record_path(id, state);
        match read_record(&path).await {
            Err(TrackerError::Storage { source: e, .. })
                if e.kind() == std::io::ErrorKind::NotFound =>
            {
                Err(TrackerError::NotFound { id, state })
            }
            Ok(mut order) => {
                order.state = state;
                Ok(order)
            }
            Err(e) => Err(e),
        }
    }

    /// Scans the placed and in-progress directories.
    ///
    /// Unreadable or corrupt records are skipped with a warning. The result
    /// is sorted by id. If the same id shows up in both directories the more
    /// advanced state wins.
    pub async fn load_all(&self) -> Result<Vec<(OrderId, OrderState)>> {
        let mut found: Vec<(OrderId, OrderState)> = Vec::new();
        let mut skipped = 0usize;

        for state in [OrderState::Placed, OrderState::InProgress] {
            let dir = self.state_dir(state);
            let mut entries = fs::read_dir(dir)
                .await
                .map_err(|e| TrackerError::storage(dir, e))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| TrackerError::storage(dir, e))?
            {
                let path = entry.path();
                if !is_record_file(&path) {
                    continue;
                }
                match read_record(&path).await {
                    Ok(order) => {
                        let expected = self.record_path(order.id, state);
                        if expected != path {
                            warn!(path = %path.display(), order_id = %order.id, "Record name does not match its id, skipping");
                            skipped += 1;
                            continue;
                        }
                        if order.state != state {
                            warn!(order_id = %order.id, tag = %order.state, %state, "Stale state tag, directory wins");
                        }
                        found.push((order.id, state));
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping unreadable record");
                        skipped += 1;
                    }
                }
            }
        }

        found.sort();
        let before = found.len();
        // Sorted by (id, state), so the later duplicate is the more advanced one.
        found.reverse();
        found.dedup_by_key(|(id, _)| *id);
        found.reverse();
        if found.len() != before {
            warn!(duplicates = before - found.len(), "Order found in two state directories");
        }

        debug!(loaded = found.len(), skipped, "Scanned order records");
        Ok(found)
    }

    /// Highest id named by a record file in the `state` directory.
    ///
    /// Only file names are inspected, so this stays cheap for the done
    /// directory, which grows without bound.
    pub async fn highest_id(&self, state: OrderState) -> Result<Option<OrderId>> {
        let dir = self.state_dir(state);
        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| TrackerError::storage(dir, e))?;

        let mut highest = None;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| TrackerError::storage(dir, e))?
        {
            let path = entry.path();
            if !is_record_file(&path) {
                continue;
            }
            let id = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<u64>().ok())
                .map(OrderId);
            highest = highest.max(id);
        }
        Ok(highest)
    }
}

fn is_record_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or(true, |n| n.starts_with('.'));
    !hidden && path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXTENSION)
}

async fn read_record(path: &Path) -> Result<Order> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| TrackerError::storage(path, e))?;
    serde_json::from_str(&content).map_err(|e| TrackerError::CorruptRecord {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Writes atomically: hidden temp file in the same directory, fsync, rename.
async fn write_record(path: &Path, order: &Order) -> Result<()> {
    let content = serde_json::to_string_pretty(order).map_err(|e| TrackerError::CorruptRecord {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("record");
    let temp_path = path.with_file_name(format!(".{file_name}.tmp"));

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| TrackerError::storage(&temp_path, e))?;
    file.write_all(content.as_bytes())
        .await
        .map_err(|e| TrackerError::storage(&temp_path, e))?;
    file.sync_all()
        .await
        .map_err(|e| TrackerError::storage(&temp_path, e))?;
    drop(file);

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| TrackerError::storage(path, e))
}
