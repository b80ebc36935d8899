//! Startup, shutdown and logging setup.

pub mod bootstrap;
pub mod tracing;
pub mod tracker_system;

pub use bootstrap::prepare_layout;
pub use tracker_system::{ShutdownError, TrackerSystem};
