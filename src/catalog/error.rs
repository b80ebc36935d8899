//! Error types for the stock collaborator.

use crate::model::ProductId;
use thiserror::Error;

/// Errors that can occur while reserving or releasing stock.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    /// The requested quantity exceeds the available stock.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The product is not in the catalog.
    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),
}
