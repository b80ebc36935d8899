//! # Logging
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter whose
//! level comes from `RUST_LOG`. Module paths are hidden; the structured fields
//! (`order_id`, `state`, `owner`, `size`) carry the context instead.
//!
//! ```bash
//! # Committed changes, actor start and stop
//! RUST_LOG=info cargo run
//!
//! # Every request and payload as it reaches the actor
//! RUST_LOG=debug cargo run
//! ```
//!
//! A typical `info` run of the demo session reads:
//!
//! ```text
//! INFO Tracker started size=0 picker=IDLE
//! INFO place_order:submit: Placed order_id=1 owner=alice items=3 size=1
//! INFO Picking started order_id=1 owner=alice
//! INFO Collected order_id=1 size=2
//! INFO Shutdown size=2 observers=1
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
