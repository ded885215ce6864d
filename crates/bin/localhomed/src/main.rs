//! # localhomed: localhome daemon
//!
//! Composition root that wires all adapters together and runs the control
//! loop until shutdown.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the accessory hub, geocoder and settings store (adapters)
//! - Spawn the control loop, injecting adapters via port traits
//! - Log control-loop events and phase changes
//! - Handle graceful shutdown (Ctrl-C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;
mod geocoder;

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing_subscriber::EnvFilter;

use localhome_adapter_storage_sqlite_sqlx::{Config as StorageConfig, SqliteSettingsStore};
use localhome_adapter_virtual::VirtualHub;
use localhome_app::control_loop::{ControlLoop, ControlSnapshot};
use localhome_app::event_bus::InProcessEventBus;
use localhome_domain::event::Event;

use crate::config::Config;
use crate::geocoder::Geocoder;

const EVENT_BUS_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting localhomed");

    // Database
    let db = StorageConfig::new(config.database_url()).build().await?;
    let settings = Arc::new(SqliteSettingsStore::new(db.pool().clone()));

    // Adapters
    let hub = Arc::new(VirtualHub::new(&config.integrations.virtual_hub));
    let geocoder = Arc::new(Geocoder::from_config(&config.geocoding)?);
    tracing::info!(provider = ?geocoder.provider(), "geocoder ready");

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(EVENT_BUS_CAPACITY));
    tokio::spawn(log_events(event_bus.subscribe()));

    // Control loop
    let (handle, mut task) = ControlLoop::spawn(
        config.control_config(VirtualHub::roles()),
        hub,
        geocoder,
        settings,
        event_bus,
    )?;
    tokio::spawn(log_snapshots(handle.subscribe()));

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("shutdown requested");
            if let Err(err) = handle.shutdown().await {
                tracing::warn!(error = %err, "control loop already stopped");
            }
            (&mut task).await?;
        }
        finished = &mut task => {
            finished?;
            tracing::warn!("control loop stopped on its own");
        }
    }

    tracing::info!("localhomed stopped");
    Ok(())
}

/// Log every control-loop event as one JSON line.
async fn log_events(mut events: broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => tracing::info!(target: "localhomed::events", event = %json),
                Err(err) => tracing::warn!(error = %err, "unserializable event"),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event log lagging behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn log_snapshots(mut snapshots: watch::Receiver<ControlSnapshot>) {
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        tracing::debug!(
            phase = %snapshot.phase,
            generation = %snapshot.generation,
            temperature = ?snapshot.temperature(),
            relay_on = snapshot.relay_on(),
            distance_to_home_m = ?snapshot.distance_to_home_m,
            "state"
        );
    }
}
