//! # Test Doubles
//!
//! Helpers for testing checkout and observers without real collaborators.
//!
//! [`MockStock`] replays a queue of scripted `reserve` outcomes and records
//! every `release`. [`RecordingObserver`] keeps every update it is handed.
//!
//! ```ignore
//! let stock = MockStock::new();
//! stock.expect_reserve().return_err(CatalogError::UnknownProduct("0009".into()));
//!
//! let checkout = Checkout::new(client, stock.clone());
//! assert!(checkout.place_order("alice", lines).await.is_err());
//! stock.verify();
//! ```

use crate::catalog::{CatalogError, StockReservation};
use crate::hub::{ObserverError, OrderObserver};
use crate::model::{OrderLines, TrackerUpdate};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A scripted [`StockReservation`]. Clones share the same script.
#[derive(Clone, Default)]
pub struct MockStock {
    expectations: Arc<Mutex<VecDeque<Result<(), CatalogError>>>>,
    reserved: Arc<Mutex<Vec<OrderLines>>>,
    released: Arc<Mutex<Vec<OrderLines>>>,
}

impl MockStock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the outcome of the next `reserve` call.
    pub fn expect_reserve(&self) -> ReserveExpectationBuilder {
        ReserveExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Lines passed to `reserve`, in call order.
    pub fn reserved(&self) -> Vec<OrderLines> {
        lock(&self.reserved).clone()
    }

    /// Lines passed to `release`, in call order.
    pub fn released(&self) -> Vec<OrderLines> {
        lock(&self.released).clone()
    }

    /// Panics if a queued expectation was never consumed.
    pub fn verify(&self) {
        let remaining = lock(&self.expectations).len();
        if remaining != 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

#[async_trait]
impl StockReservation for MockStock {
    async fn reserve(&self, lines: &OrderLines) -> Result<(), CatalogError> {
        lock(&self.reserved).push(lines.clone());
        match lock(&self.expectations).pop_front() {
            Some(outcome) => outcome,
            None => panic!("Unexpected reserve call for {} lines", lines.len()),
        }
    }

    async fn release(&self, lines: &OrderLines) -> Result<(), CatalogError> {
        lock(&self.released).push(lines.clone());
        Ok(())
    }
}

/// Builder for `reserve` expectations.
pub struct ReserveExpectationBuilder {
    expectations: Arc<Mutex<VecDeque<Result<(), CatalogError>>>>,
}

impl ReserveExpectationBuilder {
    pub fn return_ok(self) {
        lock(&self.expectations).push_back(Ok(()));
    }

    pub fn return_err(self, error: CatalogError) {
        lock(&self.expectations).push_back(Err(error));
    }
}

/// An observer that stores every update. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    updates: Arc<Mutex<Vec<TrackerUpdate>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<TrackerUpdate> {
        lock(&self.updates).clone()
    }
}

impl OrderObserver for RecordingObserver {
    fn name(&self) -> &str {
        "recorder"
    }

    fn on_update(&self, update: &TrackerUpdate) -> Result<(), ObserverError> {
        lock(&self.updates).push(update.clone());
        Ok(())
    }
}
