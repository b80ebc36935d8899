//! Customer checkout: reserve stock, then place the order with the tracker.

use crate::catalog::{CatalogError, StockReservation};
use crate::error::TrackerError;
use crate::model::{OrderId, OrderLines};
use crate::tracker::TrackerClient;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Why a checkout did not produce an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Stock could not be reserved; no order id was allocated.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Stock was reserved but the tracker refused the order.
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// The producer path used by a customer session.
pub struct Checkout<S> {
    tracker: TrackerClient,
    stock: S,
}

impl<S: StockReservation> Checkout<S> {
    pub fn new(tracker: TrackerClient, stock: S) -> Self {
        Self { tracker, stock }
    }

    /// Reserves stock for `lines` and places the order for `owner`.
    ///
    /// If the tracker rejects the order after stock was taken, the stock is
    /// handed back before the tracker error is returned.
    #[instrument(skip(self, lines))]
    pub async fn place_order(&self, owner: &str, lines: OrderLines) -> Result<OrderId, CheckoutError> {
        self.stock.reserve(&lines).await?;

        match self.tracker.submit(owner, lines.clone()).await {
            Ok(id) => {
                info!(order_id = %id, "Checkout complete");
                Ok(id)
            }
            Err(e) => {
                if let Err(release_err) = self.stock.release(&lines).await {
                    warn!(error = %release_err, "Stock release after failed submit did not succeed");
                }
                Err(e.into())
            }
        }
    }
}
