//! Error types for the order tracker.

use crate::model::{OrderId, OrderState};
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by tracker operations.
///
/// Every variant goes back to the immediate caller; nothing in the tracker retries.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The order counter could not be read or durably advanced.
    #[error("Order id allocation failed: {0}")]
    AllocationFailed(String),

    /// A record for this id already exists in some state directory.
    #[error("Duplicate order id: {0}")]
    DuplicateId(OrderId),

    /// No record for the id in the expected state directory.
    #[error("Order {id} not found in state {state}")]
    NotFound { id: OrderId, state: OrderState },

    /// The requested move is not the immediate forward successor.
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderState, to: OrderState },

    /// The picker asked for work but nothing is placed.
    #[error("No placed order available")]
    NoOrderAvailable,

    /// The picker action does not fit its current state.
    #[error("Invalid workflow state: {action} requires {expected}, picker is {actual}")]
    InvalidWorkflowState {
        action: &'static str,
        expected: &'static str,
        actual: String,
    },

    /// The submitted order has nothing to pick.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// Filesystem failure while touching a record.
    #[error("Storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record exists but cannot be decoded or encoded.
    #[error("Corrupt record at {path}: {reason}")]
    CorruptRecord { path: PathBuf, reason: String },

    /// The tracker actor is no longer accepting requests.
    #[error("Tracker closed")]
    ActorClosed,

    /// The tracker actor dropped the response channel.
    #[error("Tracker dropped response channel")]
    ActorDropped,
}

impl TrackerError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TrackerError::Storage {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for tracker operations.
pub type Result<T, E = TrackerError> = std::result::Result<T, E>;
