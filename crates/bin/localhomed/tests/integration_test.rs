//! End-to-end tests for the full localhomed stack.
//!
//! Each test wires the complete application (in-memory `SQLite`, the virtual
//! hub, the virtual geocoder, the real control loop) and drives it through
//! its handle. Timers run in real time, so tests use `refresh` to force a
//! poll instead of waiting for the periodic reconnect.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use localhome_adapter_storage_sqlite_sqlx::{Config, Database, SqliteSettingsStore};
use localhome_adapter_virtual::{VirtualGeocoder, VirtualHub, VirtualHubConfig};
use localhome_app::control_loop::{ControlConfig, ControlHandle, ControlLoop, ControlSnapshot};
use localhome_app::event_bus::InProcessEventBus;
use localhome_app::ports::SettingsStore;
use localhome_domain::address::HomeAddress;
use localhome_domain::phase::{DegradedReason, Phase};

const TIMEOUT: Duration = Duration::from_secs(30);

async fn database() -> Database {
    Config::new("sqlite::memory:")
        .build()
        .await
        .expect("in-memory database should initialise")
}

/// Start a control loop over `hub`, persisting into `db`.
fn start(db: &Database, hub: &Arc<VirtualHub>) -> (ControlHandle, JoinHandle<()>) {
    let config = ControlConfig {
        roles: VirtualHub::roles(),
        ..ControlConfig::default()
    };
    ControlLoop::spawn(
        config,
        Arc::clone(hub),
        Arc::new(VirtualGeocoder::default()),
        Arc::new(SqliteSettingsStore::new(db.pool().clone())),
        InProcessEventBus::new(256),
    )
    .expect("default config should be valid")
}

async fn until(
    handle: &ControlHandle,
    predicate: impl FnMut(&ControlSnapshot) -> bool,
) -> ControlSnapshot {
    tokio::time::timeout(TIMEOUT, handle.wait_for(predicate))
        .await
        .expect("condition not reached in time")
        .expect("control loop stopped")
}

fn springfield() -> HomeAddress {
    HomeAddress::new(12, "Main Street", "Springfield", "USA", 11111).unwrap()
}

// ---------------------------------------------------------------------------
// Heating cycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_heat_room_until_threshold_then_switch_off() {
    let db = database().await;
    let hub = Arc::new(VirtualHub::default());
    let (handle, task) = start(&db, &hub);

    until(&handle, |s| s.phase == Phase::Polling && s.relay_on()).await;
    assert!(hub.relay_on());

    let snapshot = tokio::time::timeout(TIMEOUT, async {
        loop {
            handle.refresh().await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
            let snapshot = handle.snapshot();
            if !snapshot.relay_on() && !hub.relay_on() {
                return snapshot;
            }
        }
    })
    .await
    .expect("room never reached the threshold");

    assert!(snapshot.temperature().unwrap() >= 20.0);
    assert_eq!(snapshot.humidity, Some(45.0));

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn should_leave_heater_off_when_room_is_warm() {
    let db = database().await;
    let hub = Arc::new(VirtualHub::new(&VirtualHubConfig {
        initial_temperature: 23.0,
        ..VirtualHubConfig::default()
    }));
    let (handle, task) = start(&db, &hub);

    let snapshot = until(&handle, |s| s.temperature().is_some()).await;

    assert!(!snapshot.relay_on());
    assert!(!hub.relay_on());

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

// ---------------------------------------------------------------------------
// Reachability
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_degrade_when_relay_goes_offline_and_recover() {
    let db = database().await;
    let hub = Arc::new(VirtualHub::default());
    let (handle, task) = start(&db, &hub);
    until(&handle, |s| s.phase == Phase::Polling).await;

    hub.set_relay_reachable(false);
    let snapshot = until(&handle, |s| {
        s.phase == Phase::Degraded(DegradedReason::RelayUnreachable)
    })
    .await;
    assert!(!snapshot.thermal.relay_reachable);
    assert!(handle.set_relay(true).await.is_err());

    hub.set_relay_reachable(true);
    until(&handle, |s| s.phase == Phase::Polling && s.thermal.relay_reachable).await;

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

// ---------------------------------------------------------------------------
// Settings persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_restore_threshold_and_home_address_after_restart() {
    let db = database().await;
    let hub = Arc::new(VirtualHub::default());
    let store = SqliteSettingsStore::new(db.pool().clone());

    let (handle, task) = start(&db, &hub);
    handle.set_threshold(17.5).await.unwrap();
    handle.set_home_address(springfield()).await.unwrap();
    until(&handle, |s| s.home_coordinate.is_some()).await;

    tokio::time::timeout(TIMEOUT, async {
        loop {
            let stored = store.load().await.unwrap();
            if stored.home_address.is_some() && stored.threshold == Some(17.5) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("settings were not persisted");
    handle.shutdown().await.unwrap();
    task.await.unwrap();

    let (handle, task) = start(&db, &hub);
    let snapshot = until(&handle, |s| s.home_coordinate.is_some()).await;

    assert!((snapshot.thermal.threshold - 17.5).abs() < f64::EPSILON);
    assert_eq!(snapshot.home_address, Some(springfield()));
    assert!(snapshot.address_issue.is_none());

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn should_flag_unparsable_stored_address() {
    let db = database().await;
    store_raw_address(&db, "Main Street Springfield").await;
    let hub = Arc::new(VirtualHub::default());

    let (handle, task) = start(&db, &hub);
    let snapshot = until(&handle, |s| s.address_issue.is_some()).await;

    let issue = snapshot.address_issue.unwrap();
    assert_eq!(issue.raw, "Main Street Springfield");
    assert!(snapshot.home_address.is_none());

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

/// Store an address string the way an older release could have left it.
async fn store_raw_address(db: &Database, raw: &str) {
    sqlx::query("INSERT INTO settings (key, value) VALUES ('home_address', ?)")
        .bind(serde_json::Value::from(raw).to_string())
        .execute(db.pool())
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_resolve_position_and_adopt_it_as_home() {
    let db = database().await;
    let hub = Arc::new(VirtualHub::default());
    let (handle, task) = start(&db, &hub);

    let near_rivoli = localhome_domain::geo::Coordinate::new(48.8570, 2.3600).unwrap();
    handle.update_position(near_rivoli).await.unwrap();
    until(&handle, |s| s.position_place.is_some()).await;

    let home = handle.adopt_position_as_home().await.unwrap();
    let snapshot = until(&handle, |s| s.home_address.is_some()).await;

    assert_eq!(home.city, "Paris");
    assert_eq!(snapshot.home_address, Some(home));
    assert_eq!(snapshot.distance_to_home_m, Some(0.0));

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}
