use crate::model::{OrderDetail, OrderId, OrderState};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Owned, read-only copy of the live index, ordered by ascending id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderSnapshot(BTreeMap<OrderId, OrderState>);

impl OrderSnapshot {
    pub fn new(entries: BTreeMap<OrderId, OrderState>) -> Self {
        Self(entries)
    }

    pub fn get(&self, id: OrderId) -> Option<OrderState> {
        self.0.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OrderId, OrderState)> + '_ {
        self.0.iter().map(|(id, state)| (*id, *state))
    }

    pub fn as_map(&self) -> &BTreeMap<OrderId, OrderState> {
        &self.0
    }

    pub fn into_map(self) -> BTreeMap<OrderId, OrderState> {
        self.0
    }
}

impl From<BTreeMap<OrderId, OrderState>> for OrderSnapshot {
    fn from(entries: BTreeMap<OrderId, OrderState>) -> Self {
        Self(entries)
    }
}

impl<const N: usize> From<[(u64, OrderState); N]> for OrderSnapshot {
    fn from(entries: [(u64, OrderState); N]) -> Self {
        Self(entries.into_iter().map(|(id, state)| (OrderId(id), state)).collect())
    }
}

/// One line per order, the text form shown by the tracker view.
impl Display for OrderSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (id, state) in &self.0 {
            writeln!(f, "{id}        {state}")?;
        }
        Ok(())
    }
}

/// What every observer receives: the live map plus the picker's active order.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerUpdate {
    pub snapshot: OrderSnapshot,
    pub detail: Option<OrderDetail>,
}
