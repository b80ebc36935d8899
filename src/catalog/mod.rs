//! # Stock Collaborator
//!
//! Checkout must reserve stock before the tracker hands out an order id.
//! The catalog itself lives outside the tracker; this module defines the
//! seam ([`StockReservation`]) and an in-memory implementation used by the
//! demo binary and the tests.
//!
//! ```rust
//! use order_tracker::catalog::{InMemoryCatalog, StockReservation};
//! use order_tracker::model::OrderLines;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = InMemoryCatalog::new();
//!     catalog.restock("0001", 10).await;
//!
//!     let lines = OrderLines::from([("0001".to_string(), 4)]);
//!     catalog.reserve(&lines).await?;
//!     assert_eq!(catalog.stock("0001").await, Some(6));
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::*;

use crate::model::{OrderLines, ProductId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Reserves and releases stock for the lines of an order.
#[async_trait]
pub trait StockReservation: Send + Sync {
    /// Takes stock for every line, or for none of them.
    async fn reserve(&self, lines: &OrderLines) -> Result<(), CatalogError>;

    /// Gives back stock taken by an earlier `reserve`.
    async fn release(&self, lines: &OrderLines) -> Result<(), CatalogError>;
}

/// Stock levels kept in memory. Clones share the same stock.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    stock: Arc<Mutex<HashMap<ProductId, u32>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` units of `product_id`, creating the product if needed.
    pub async fn restock(&self, product_id: &str, quantity: u32) {
        let mut stock = self.stock.lock().await;
        let level = stock.entry(product_id.to_string()).or_insert(0);
        *level = level.saturating_add(quantity);
        info!(product_id, level = *level, "Restocked");
    }

    pub async fn stock(&self, product_id: &str) -> Option<u32> {
        self.stock.lock().await.get(product_id).copied()
    }
}

#[async_trait]
impl StockReservation for InMemoryCatalog {
    async fn reserve(&self, lines: &OrderLines) -> Result<(), CatalogError> {
        let mut stock = self.stock.lock().await;

        // Check everything first so a failure leaves stock untouched.
        for (product_id, requested) in lines {
            let available = *stock
                .get(product_id)
                .ok_or_else(|| CatalogError::UnknownProduct(product_id.clone()))?;
            if available < *requested {
                return Err(CatalogError::InsufficientStock {
                    product_id: product_id.clone(),
                    requested: *requested,
                    available,
                });
            }
        }
        for (product_id, requested) in lines {
            if let Some(level) = stock.get_mut(product_id) {
                *level -= *requested;
            }
        }
        debug!(lines = lines.len(), "Stock reserved");
        Ok(())
    }

    async fn release(&self, lines: &OrderLines) -> Result<(), CatalogError> {
        let mut stock = self.stock.lock().await;
        for (product_id, quantity) in lines {
            let level = stock
                .get_mut(product_id)
                .ok_or_else(|| CatalogError::UnknownProduct(product_id.clone()))?;
            *level = level.saturating_add(*quantity);
        }
        debug!(lines = lines.len(), "Stock released");
        Ok(())
    }
}
