//! Durable state: the order counter and the per-state record directories.

pub mod counter;
pub mod records;

pub use counter::IdAllocator;
pub use records::OrderStore;
