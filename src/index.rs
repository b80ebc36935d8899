//! In-memory live view of the orders, keyed by ascending id.
//!
//! The index is a cache of what the store says. It is rebuilt from the record
//! directories at startup and afterwards only changed after the store has
//! committed a creation or transition.

use crate::error::Result;
use crate::model::{OrderId, OrderSnapshot, OrderState};
use crate::store::OrderStore;
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Default)]
pub struct OrderIndex {
    entries: BTreeMap<OrderId, OrderState>,
}

impl OrderIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole index with what the store currently holds.
    pub async fn initialize(&mut self, store: &OrderStore) -> Result<()> {
        let loaded = store.load_all().await?;
        self.entries = loaded.into_iter().collect();
        info!(size = self.entries.len(), "Order index initialized");
        Ok(())
    }

    /// Records the new state of `id`. Terminal states leave the live view.
    pub fn apply(&mut self, id: OrderId, state: OrderState) {
        if state.is_terminal() {
            self.entries.remove(&id);
        } else {
            self.entries.insert(id, state);
        }
    }

    /// Drops `id` from the live view whatever its state.
    pub fn remove(&mut self, id: OrderId) {
        self.entries.remove(&id);
    }

    pub fn snapshot(&self) -> OrderSnapshot {
        OrderSnapshot::new(self.entries.clone())
    }

    /// Smallest id currently in `state`.
    pub fn oldest(&self, state: OrderState) -> Option<OrderId> {
        self.entries
            .iter()
            .find(|(_, s)| **s == state)
            .map(|(id, _)| *id)
    }

    pub fn state_of(&self, id: OrderId) -> Option<OrderState> {
        self.entries.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
