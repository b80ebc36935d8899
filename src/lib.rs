//! # Order Tracker
//!
//! > **Durable order lifecycle tracking behind a single actor.**
//!
//! Customers place orders, a picker takes them one at a time, and any number
//! of views watch the live order map. Every order moves through three states:
//!
//! ```text
//! PLACED ──advance──▶ IN_PROGRESS ──complete──▶ DONE
//! ```
//!
//! ## 🏗️ Design
//!
//! ### Directories are the truth
//! Each state has its own directory and each order is one JSON record living
//! in exactly one of them. A transition is a rename between directories. The
//! in-memory [`OrderIndex`](index::OrderIndex) is a cache, rebuilt from the
//! directories on every start.
//!
//! ### One actor, one critical section
//! All tracker state (counter, records, index, observers, picker slot) is
//! owned by the [`TrackerActor`](tracker::TrackerActor). Everyone else holds a
//! cloned [`TrackerClient`](tracker::TrackerClient). Requests are handled one
//! at a time, so concurrent checkouts always get distinct ids and no observer
//! ever sees half a transition.
//!
//! ### Synchronous notification
//! Observers are pushed the new order map before the request that changed it
//! is answered. A broken observer is logged and skipped; it never blocks the
//! others.
//!
//! ## 🗺️ Module Tour
//!
//! - [`model`]: `OrderId`, `OrderState`, `Order`, `OrderSnapshot`.
//! - [`store`]: the id counter file and the per-state record directories.
//! - [`index`]: the live id → state map.
//! - [`hub`]: observer registration and delivery.
//! - [`picker`]: the `IDLE`/`WORKING` picker slot.
//! - [`tracker`]: the actor, its messages and its client.
//! - [`catalog`] and [`checkout`]: reserve stock, then submit.
//! - [`lifecycle`]: layout bootstrap, start/shutdown, logging setup.
//! - [`config`]: TOML configuration.
//! - [`mock`]: test doubles for stock and observers.
//!
//! ## 🚀 Quick Start
//!
//! ```rust,ignore
//! let system = TrackerSystem::start(TrackerConfig::default()).await?;
//! let mut updates = system.client.subscribe("tracker-view").await?;
//!
//! let id = system.client.submit("alice", lines).await?;
//! let detail = system.client.advance().await?;
//! system.client.complete().await?;
//!
//! system.shutdown().await?;
//! ```
//!
//! ### Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run -- --root /tmp/orders
//! ```

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod hub;
pub mod index;
pub mod lifecycle;
pub mod mock;
pub mod model;
pub mod picker;
pub mod store;
pub mod tracker;
