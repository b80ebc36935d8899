//! Customer orders, tracked from checkout to collection.
//!
//! The identity (`id`, `owner`, `lines`, `placed_at`) is fixed when the order is
//! submitted. Only `state` and the matching timestamps move, and only forward:
//! `Placed -> InProgress -> Done`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque product identifier supplied by the catalog.
pub type ProductId = String;

/// Product lines of an order, ordered by product id.
pub type OrderLines = BTreeMap<ProductId, u32>;

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    /// Awaiting picking.
    Placed,
    /// Being picked.
    InProgress,
    /// Picked and collected; archived.
    Done,
}

impl OrderState {
    /// All states in lifecycle order.
    pub const ALL: [OrderState; 3] = [OrderState::Placed, OrderState::InProgress, OrderState::Done];

    /// The only state this one may move to, if any.
    pub fn successor(self) -> Option<OrderState> {
        match self {
            OrderState::Placed => Some(OrderState::InProgress),
            OrderState::InProgress => Some(OrderState::Done),
            OrderState::Done => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.successor().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderState::Placed => "PLACED",
            OrderState::InProgress => "IN_PROGRESS",
            OrderState::Done => "DONE",
        }
    }
}

impl Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLACED" => Ok(OrderState::Placed),
            "IN_PROGRESS" => Ok(OrderState::InProgress),
            "DONE" => Ok(OrderState::Done),
            other => Err(format!("unknown order state: {other}")),
        }
    }
}

/// The durable form of an order, one JSON file per order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub owner: String,
    pub lines: OrderLines,
    pub state: OrderState,
    pub placed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progressing_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<DateTime<Utc>>,
}

/// Payload for submitting a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub owner: String,
    pub lines: OrderLines,
}

impl Order {
    /// Creates a freshly placed order.
    pub fn new(id: OrderId, owner: impl Into<String>, lines: OrderLines) -> Self {
        Self {
            id,
            owner: owner.into(),
            lines,
            state: OrderState::Placed,
            placed_at: Utc::now(),
            progressing_at: None,
            collected_at: None,
        }
    }

    /// Moves the state tag forward and stamps the matching timestamp.
    pub(crate) fn mark(&mut self, state: OrderState, at: DateTime<Utc>) {
        self.state = state;
        match state {
            OrderState::Placed => {}
            OrderState::InProgress => self.progressing_at = Some(at),
            OrderState::Done => self.collected_at = Some(at),
        }
    }

    /// Total number of items across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.values().map(|q| u64::from(*q)).sum()
    }
}

/// Detail of a single order, handed to the picker and to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetail {
    pub id: OrderId,
    pub owner: String,
    pub lines: OrderLines,
    pub state: OrderState,
    pub placed_at: DateTime<Utc>,
    pub progressing_at: Option<DateTime<Utc>>,
}

impl From<Order> for OrderDetail {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            owner: order.owner,
            lines: order.lines,
            state: order.state,
            placed_at: order.placed_at,
            progressing_at: order.progressing_at,
        }
    }
}

impl Display for OrderDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Order ID: {}", self.id)?;
        writeln!(f, "Owner: {}", self.owner)?;
        writeln!(f, "State: {}", self.state)?;
        writeln!(f, "Placed: {}", self.placed_at.format("%Y-%m-%d %H:%M:%S"))?;
        if let Some(at) = self.progressing_at {
            writeln!(f, "Progressing: {}", at.format("%Y-%m-%d %H:%M:%S"))?;
        }
        for (product, quantity) in &self.lines {
            writeln!(f, "  {product} x {quantity}")?;
        }
        Ok(())
    }
}
