//! # Order Tracker Actor
//!
//! The tracker is split the usual actor way:
//!
//! - [`TrackerActor`] is the server. It owns the id allocator, the record
//!   store, the live index, the observer hub and the picker slot, and
//!   handles one [`TrackerRequest`] at a time.
//! - [`TrackerClient`] is the cloneable handle everyone else holds.
//!
//! ```rust,ignore
//! let (actor, client) = TrackerActor::open(&config).await?;
//! tokio::spawn(actor.run());
//!
//! let id = client.submit("alice", lines).await?;
//! let detail = client.advance().await?;
//! client.complete().await?;
//! ```
//!
//! Because the actor is the only owner of that state, the request queue is
//! the one critical section: concurrent submissions get distinct ids, and a
//! snapshot never shows a half-applied transition.

pub mod actor;
pub mod client;
pub mod message;

pub use actor::TrackerActor;
pub use client::TrackerClient;
pub use message::{Response, TrackerRequest};
