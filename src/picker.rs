//! Picker workflow state machine.
//!
//! There is one picker and one working slot. `advance` checks out the oldest
//! placed order, `complete` archives it. The store, index and hub side of
//! those steps is driven by the tracker actor; this type only guards the
//! order in which the two actions may happen.

use crate::error::{Result, TrackerError};
use crate::model::OrderId;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickerState {
    /// No order checked out.
    #[default]
    Idle,
    /// One order being picked.
    Working(OrderId),
}

impl Display for PickerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PickerState::Idle => f.write_str("IDLE"),
            PickerState::Working(id) => write!(f, "WORKING({id})"),
        }
    }
}

#[derive(Debug, Default)]
pub struct PickerWorkflow {
    state: PickerState,
}

impl PickerWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts in `Working(id)`, used when an in-progress order survives a restart.
    pub fn resume(id: OrderId) -> Self {
        Self {
            state: PickerState::Working(id),
        }
    }

    pub fn state(&self) -> PickerState {
        self.state
    }

    /// The order currently checked out, if any.
    pub fn active(&self) -> Option<OrderId> {
        match self.state {
            PickerState::Idle => None,
            PickerState::Working(id) => Some(id),
        }
    }

    /// Fails unless the picker is idle. Call before touching the store.
    pub fn ensure_idle(&self) -> Result<()> {
        match self.state {
            PickerState::Idle => Ok(()),
            PickerState::Working(_) => Err(self.wrong_state("advance", "IDLE")),
        }
    }

    /// The active order id; fails unless the picker is working.
    pub fn ensure_working(&self) -> Result<OrderId> {
        self.active()
            .ok_or_else(|| self.wrong_state("complete", "WORKING"))
    }

    /// Records that `id` has been moved to in-progress.
    pub fn begin(&mut self, id: OrderId) -> Result<()> {
        self.ensure_idle()?;
        self.state = PickerState::Working(id);
        Ok(())
    }

    /// Records that the active order has been archived.
    pub fn finish(&mut self) -> Result<OrderId> {
        let id = self.ensure_working()?;
        self.state = PickerState::Idle;
        Ok(id)
    }

    fn wrong_state(&self, action: &'static str, expected: &'static str) -> TrackerError {
        TrackerError::InvalidWorkflowState {
            action,
            expected,
            actual: self.state.to_string(),
        }
    }
}
