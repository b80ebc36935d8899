//! # Order Tracker
//!
//! Runs a short session against the on-disk order layout:
//! 1. Prepares the layout and starts the [`TrackerSystem`].
//! 2. Attaches a [`LoggingObserver`] so every change shows up in the log.
//! 3. Checks out three orders through an in-memory catalog.
//! 4. Lets the picker take the oldest order and collect it.
//!
//! ```bash
//! RUST_LOG=info cargo run -- --root /tmp/orders
//! ```

use clap::Parser;
use order_tracker::catalog::InMemoryCatalog;
use order_tracker::checkout::Checkout;
use order_tracker::config::TrackerConfig;
use order_tracker::error::TrackerError;
use order_tracker::hub::LoggingObserver;
use order_tracker::lifecycle::tracing::setup_tracing;
use order_tracker::lifecycle::TrackerSystem;
use order_tracker::model::{OrderId, OrderLines};
use order_tracker::picker::PickerState;
use order_tracker::tracker::TrackerClient;
use std::path::PathBuf;
use tracing::{info, warn, Instrument};

/// Command-line arguments for the order tracker.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "ORDER_TRACKER_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the order folders and the counter (overrides the config)
    #[arg(short, long)]
    root: Option<PathBuf>,
}

fn lines(entries: &[(&str, u32)]) -> OrderLines {
    entries
        .iter()
        .map(|(product, quantity)| (product.to_string(), *quantity))
        .collect()
}

/// Collects one order. An order left in progress by an earlier run is
/// finished first; otherwise the oldest placed order is picked.
async fn pick_one(client: &TrackerClient) -> Result<OrderId, TrackerError> {
    if let PickerState::Working(id) = client.picker_state().await? {
        info!(order_id = %id, "Finishing order resumed from an earlier run");
        return client.complete().await;
    }
    let detail = client.advance().await?;
    info!(order_id = %detail.id, items = detail.lines.len(), "Picking");
    client.complete().await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_tracing();

    let mut config = match &args.config {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };
    if let Some(root) = args.root {
        config = config.with_root(root);
    }

    let system = TrackerSystem::start(config).await?;
    system.client.register(LoggingObserver).await?;

    let catalog = InMemoryCatalog::new();
    catalog.restock("0001", 10).await;
    catalog.restock("0002", 5).await;
    catalog.restock("0003", 2).await;

    let checkout = Checkout::new(system.client.clone(), catalog.clone());
    let sessions = [
        ("alice", lines(&[("0001", 2), ("0002", 1)])),
        ("bob", lines(&[("0003", 1)])),
        ("carol", lines(&[("0001", 3)])),
        ("dave", lines(&[("0003", 5)])),
    ];
    for (owner, order) in sessions {
        let span = tracing::info_span!("customer", owner);
        match checkout.place_order(owner, order).instrument(span).await {
            Ok(id) => info!(order_id = %id, owner, "Order placed"),
            Err(e) => warn!(owner, error = %e, "Checkout refused"),
        }
    }

    let span = tracing::info_span!("picker");
    pick_one(&system.client).instrument(span).await?;

    let snapshot = system.client.snapshot().await?;
    info!(size = snapshot.len(), "Final order map\n{}", snapshot);

    drop(checkout);
    system.shutdown().await?;
    Ok(())
}
