//! Durable order id allocation.
//!
//! The counter file holds the decimal string of the last id handed out. It is
//! advanced with write-to-temp, `fsync`, rename, so after a crash it holds
//! either the old or the new value and an id is never handed out twice.

use crate::error::{Result, TrackerError};
use crate::model::OrderId;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub struct IdAllocator {
    path: PathBuf,
}

impl IdAllocator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last allocated id; `0` when nothing has been allocated yet.
    pub async fn peek(&self) -> Result<u64> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(TrackerError::AllocationFailed(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )))
            }
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(0);
        }
        trimmed.parse::<u64>().map_err(|e| {
            TrackerError::AllocationFailed(format!(
                "counter {} holds {trimmed:?}: {e}",
                self.path.display()
            ))
        })
    }

    /// Allocates the next id. The new value is on disk before it is returned.
    ///
    /// Takes `&mut self`: the tracker actor is the only owner, which is what
    /// makes concurrent submissions see distinct values.
    pub async fn next(&mut self) -> Result<OrderId> {
        let last = self.peek().await?;
        let id = last.checked_add(1).ok_or_else(|| {
            TrackerError::AllocationFailed("order counter exhausted".to_string())
        })?;
        self.persist(id).await?;
        debug!(order_id = id, "Allocated id");
        Ok(OrderId(id))
    }

    async fn persist(&self, value: u64) -> Result<()> {
        let fail = |e: std::io::Error| {
            TrackerError::AllocationFailed(format!("cannot persist {}: {e}", self.path.display()))
        };
        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path).await.map_err(fail)?;
        file.write_all(value.to_string().as_bytes()).await.map_err(fail)?;
        file.sync_all().await.map_err(fail)?;
        drop(file);
        fs::rename(&temp_path, &self.path).await.map_err(fail)?;
        Ok(())
    }

    /// Hidden sibling of the counter file; never equal to the counter itself.
    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("counter");
        self.path.with_file_name(format!(".{file_name}.tmp"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_counter_starts_at_one() {
        let dir = TempDir::new().unwrap();
        let mut allocator = IdAllocator::new(dir.path().join("orderCounter.txt"));
        assert_eq!(allocator.peek().await.unwrap(), 0);
        assert_eq!(allocator.next().await.unwrap(), OrderId(1));
        assert_eq!(allocator.next().await.unwrap(), OrderId(2));
        assert_eq!(allocator.peek().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn value_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orderCounter.txt");
        std::fs::write(&path, "41\n").unwrap();

        let mut allocator = IdAllocator::new(&path);
        assert_eq!(allocator.next().await.unwrap(), OrderId(42));
        drop(allocator);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "42");
        let mut reopened = IdAllocator::new(&path);
        assert_eq!(reopened.next().await.unwrap(), OrderId(43));
    }

    #[tokio::test]
    async fn tmp_named_counter_keeps_its_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("counter.tmp");
        std::fs::write(&path, "7").unwrap();

        let mut allocator = IdAllocator::new(&path);
        assert_ne!(allocator.temp_path(), path);
        assert_eq!(allocator.next().await.unwrap(), OrderId(8));
        assert_eq!(allocator.next().await.unwrap(), OrderId(9));

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["counter.tmp".to_string()]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "9");
    }

    #[tokio::test]
    async fn garbage_counter_fails_instead_of_resetting() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orderCounter.txt");
        std::fs::write(&path, "forty").unwrap();

        let mut allocator = IdAllocator::new(&path);
        let err = allocator.next().await.unwrap_err();
        assert!(matches!(err, TrackerError::AllocationFailed(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "forty");
    }

    #[tokio::test]
    async fn unwritable_location_fails_allocation() {
        let dir = TempDir::new().unwrap();
        let mut allocator = IdAllocator::new(dir.path().join("missing").join("orderCounter.txt"));
        assert!(matches!(
            allocator.next().await,
            Err(TrackerError::AllocationFailed(_))
        ));
    }
}
