//! Pure data structures shared by every tracker component.

pub mod order;
pub mod snapshot;

pub use order::*;
pub use snapshot::*;
