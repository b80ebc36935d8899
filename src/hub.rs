//! # Notification Hub
//!
//! Keeps the registered observers and pushes a [`TrackerUpdate`] to each of
//! them after every committed change. Delivery is synchronous and happens
//! inside the tracker actor's handling of the request that caused the
//! change, so every observer sees every change exactly once and in order.
//!
//! A failing observer is logged and skipped. It cannot stop delivery to the
//! others, and a panic inside an observer does not take the actor down.
//! Observers that report [`ObserverError::Detached`] are dropped.

use crate::model::TrackerUpdate;
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Errors an observer may report back to the hub.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ObserverError {
    /// The view behind this observer is gone; the hub forgets it.
    #[error("Observer detached")]
    Detached,

    /// The view could not take this update but stays registered.
    #[error("Observer rejected update: {0}")]
    Rejected(String),
}

/// Anything that wants to be pushed the live order map.
pub trait OrderObserver: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str {
        "observer"
    }

    fn on_update(&self, update: &TrackerUpdate) -> Result<(), ObserverError>;
}

/// Forwards updates to an async consumer through an unbounded channel.
pub struct ChannelObserver {
    name: String,
    sender: mpsc::UnboundedSender<TrackerUpdate>,
}

impl ChannelObserver {
    pub fn new(name: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<TrackerUpdate>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let observer = Self {
            name: name.into(),
            sender,
        };
        (observer, receiver)
    }
}

impl OrderObserver for ChannelObserver {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_update(&self, update: &TrackerUpdate) -> Result<(), ObserverError> {
        self.sender
            .send(update.clone())
            .map_err(|_| ObserverError::Detached)
    }
}

/// Writes every update to the log, one `info!` line per change.
pub struct LoggingObserver;

impl OrderObserver for LoggingObserver {
    fn name(&self) -> &str {
        "log"
    }

    fn on_update(&self, update: &TrackerUpdate) -> Result<(), ObserverError> {
        let active = update.detail.as_ref().map(|d| d.id.to_string());
        info!(size = update.snapshot.len(), active = ?active, "Orders\n{}", update.snapshot);
        Ok(())
    }
}

/// Registry of observers. Owned by the tracker actor.
#[derive(Default)]
pub struct NotificationHub {
    observers: Vec<Box<dyn OrderObserver>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observer and hands it the current state straight away.
    ///
    /// Returns `false` when the observer detached during that first delivery
    /// and was therefore not kept.
    pub fn register(&mut self, observer: Box<dyn OrderObserver>, current: &TrackerUpdate) -> bool {
        match deliver(observer.as_ref(), current) {
            Err(ObserverError::Detached) => {
                info!(observer = observer.name(), "Observer detached on registration");
                false
            }
            _ => {
                info!(observer = observer.name(), total = self.observers.len() + 1, "Observer registered");
                self.observers.push(observer);
                true
            }
        }
    }

    /// Pushes `update` to every observer.
    pub fn notify_all(&mut self, update: &TrackerUpdate) {
        debug!(observers = self.observers.len(), size = update.snapshot.len(), "Notifying");
        self.observers.retain(|observer| match deliver(observer.as_ref(), update) {
            Err(ObserverError::Detached) => {
                info!(observer = observer.name(), "Observer detached, removing");
                false
            }
            _ => true,
        });
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

fn deliver(observer: &dyn OrderObserver, update: &TrackerUpdate) -> Result<(), ObserverError> {
    match catch_unwind(AssertUnwindSafe(|| observer.on_update(update))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            warn!(observer = observer.name(), error = %e, "Observer delivery failed");
            Err(e)
        }
        Err(_) => {
            error!(observer = observer.name(), "Observer panicked during delivery");
            Err(ObserverError::Rejected("panicked".to_string()))
        }
    }
}
