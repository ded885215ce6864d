//! Control loop: the single task that owns all controller state.
//!
//! The loop reconnects to the hub on startup, on every accessory-change
//! notification, on [`ControlHandle::refresh`] and every
//! [`ControlConfig::reconnect_interval`]. A reconnect bumps the
//! [`Generation`], drops every resolved handle and discovers again. Reads,
//! writes and geocoding calls run in spawned tasks and come back as
//! [`Completion`]s which the loop applies one at a time; anything tagged with
//! a superseded generation is discarded.
//!
//! The threshold rule runs after each discovery and after each successful
//! temperature read. The 1 s tick only feeds the geocoding rate limiter.

mod command;
mod handle;
mod snapshot;


use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use localhome_domain::accessory::{Accessory, Capability};
use localhome_domain::address::HomeAddress;
use localhome_domain::error::{HomeError, NotFoundError, ValidationError};
use localhome_domain::event::{CommandOrigin, Event, EventKind, GeocodeDirection};
use localhome_domain::generation::Generation;
use localhome_domain::geo::Coordinate;
use localhome_domain::phase::{DegradedReason, Phase};
use localhome_domain::rate_limit::{DEFAULT_MIN_INTERVAL_SECS, GeocodeRateLimiter};
use localhome_domain::role::{AccessoryRole, Classification, RoleMap};
use localhome_domain::rule::{self, Decision};
use localhome_domain::thermal::{ThermalState, validate_threshold};

use crate::completion::{
    self, Completion, CompletionReceiver, CompletionSender, GeocodeCompletion, ReadCompletion,
};
use crate::ports::{AccessoryRegistry, EventPublisher, GeocodingService, SettingsStore};
use crate::services::{RelayActuator, SensorReader};

use self::command::Command;
pub use self::handle::ControlHandle;
pub use self::snapshot::{AddressIssue, ControlSnapshot};

/// Threshold used when neither the settings store nor the config has one.
pub const DEFAULT_THRESHOLD: f64 = 20.0;

const COMMAND_CAPACITY: usize = 32;

/// Tuning for [`ControlLoop`].
#[derive(Debug, Clone)]
pub struct ControlConfig {
    /// Threshold until a persisted one is loaded.
    pub threshold: f64,
    pub reconnect_interval: Duration,
    /// Rate limiter resolution; whole seconds only.
    pub tick_interval: Duration,
    pub geocode_min_interval_secs: u64,
    pub roles: RoleMap,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            reconnect_interval: Duration::from_secs(10),
            tick_interval: Duration::from_secs(1),
            geocode_min_interval_secs: DEFAULT_MIN_INTERVAL_SECS,
            roles: RoleMap::new(),
        }
    }
}

impl ControlConfig {
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a non-finite threshold or an interval
    /// shorter than one second.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_threshold(self.threshold)?;
        if self.reconnect_interval.as_secs() == 0 {
            return Err(ValidationError::ZeroInterval("reconnect_interval"));
        }
        if self.tick_interval.as_secs() == 0 {
            return Err(ValidationError::ZeroInterval("tick_interval"));
        }
        Ok(())
    }
}

/// Entry point for starting the loop.
pub struct ControlLoop;

impl ControlLoop {
    /// Spawn the loop on the current runtime.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] when `config` is invalid.
    pub fn spawn<R, G, S, P>(
        config: ControlConfig,
        registry: Arc<R>,
        geocoder: Arc<G>,
        settings: Arc<S>,
        publisher: P,
    ) -> Result<(ControlHandle, JoinHandle<()>), HomeError>
    where
        R: AccessoryRegistry + 'static,
        G: GeocodingService + 'static,
        S: SettingsStore + 'static,
        P: EventPublisher + Send + Sync + 'static,
    {
        config.validate()?;
        let thermal = ThermalState::new(config.threshold)?;

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(ControlSnapshot::initial(thermal.clone()));
        let (completion_tx, completion_rx) = completion::channel();

        let controller = Controller {
            sensors: SensorReader::new(Arc::clone(&registry), completion_tx.clone()),
            relay: RelayActuator::new(Arc::clone(&registry), completion_tx.clone()),
            limiter: GeocodeRateLimiter::new(config.geocode_min_interval_secs),
            config,
            registry,
            geocoder,
            settings,
            publisher,
            completions: completion_tx,
            snapshots: snapshot_tx,
            generation: Generation::default(),
            phase: Phase::Uninitialized,
            thermal,
            humidity: None,
            last_decision: None,
            home_address: None,
            home_coordinate: None,
            address_issue: None,
            position: None,
            position_place: None,
        };

        let task = tokio::spawn(controller.run(command_rx, completion_rx));
        Ok((ControlHandle::new(command_tx, snapshot_rx), task))
    }
}

struct Controller<R, G, S, P> {
    config: ControlConfig,
    registry: Arc<R>,
    geocoder: Arc<G>,
    settings: Arc<S>,
    publisher: P,
    completions: CompletionSender,
    snapshots: watch::Sender<ControlSnapshot>,

    sensors: SensorReader<R>,
    relay: RelayActuator<R>,
    limiter: GeocodeRateLimiter,

    generation: Generation,
    phase: Phase,
    thermal: ThermalState,
    humidity: Option<f64>,
    last_decision: Option<Decision>,

    home_address: Option<HomeAddress>,
    home_coordinate: Option<Coordinate>,
    address_issue: Option<AddressIssue>,
    position: Option<Coordinate>,
    position_place: Option<HomeAddress>,
}

impl<R, G, S, P> Controller<R, G, S, P>
where
    R: AccessoryRegistry + 'static,
    G: GeocodingService + 'static,
    S: SettingsStore + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    async fn run(mut self, mut commands: mpsc::Receiver<Command>, mut completions: CompletionReceiver) {
        self.bootstrap().await;

        let mut changes = self.registry.subscribe();
        let mut changes_open = true;
        self.reconnect("startup").await;
        self.publish_snapshot();

        let start = Instant::now();
        let mut reconnect = tokio::time::interval_at(
            start + self.config.reconnect_interval,
            self.config.reconnect_interval,
        );
        reconnect.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick =
            tokio::time::interval_at(start + self.config.tick_interval, self.config.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let tick_secs = self.config.tick_interval.as_secs();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                Some(completion) = completions.recv() => self.apply(completion).await,
                change = changes.recv(), if changes_open => match change {
                    Ok(change) => {
                        tracing::debug!(accessory = %change.accessory(), "accessory changed");
                        self.reconnect("accessory changed").await;
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "accessory notifications lagged");
                        self.reconnect("accessory changed").await;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::warn!("accessory notifications closed, relying on periodic reconnect");
                        changes_open = false;
                    }
                },
                _ = reconnect.tick() => self.reconnect("periodic").await,
                _ = tick.tick() => self.limiter.advance(tick_secs),
            }
            self.publish_snapshot();
        }

        tracing::info!(generation = %self.generation, "control loop stopped");
    }

    // ── Startup ───────────────────────────────────────────────────

    async fn bootstrap(&mut self) {
        match self.settings.load().await {
            Ok(stored) => {
                if let Some(threshold) = stored.threshold {
                    match self.thermal.set_threshold(threshold) {
                        Ok(()) => tracing::info!(threshold, "restored threshold"),
                        Err(err) => tracing::warn!(threshold, %err, "ignoring stored threshold"),
                    }
                }
                if let Some(raw) = stored.home_address {
                    self.restore_home_address(raw).await;
                }
            }
            Err(err) => tracing::warn!(%err, "could not load settings, using defaults"),
        }
    }

    async fn restore_home_address(&mut self, raw: String) {
        match HomeAddress::parse(&raw) {
            Ok(address) => {
                tracing::info!(%address, "restored home address");
                self.home_address = Some(address.clone());
                self.request_forward_geocode(address).await;
            }
            Err(err) => {
                tracing::warn!(raw = %raw, %err, "stored home address needs correction");
                let reason = err.to_string();
                self.address_issue = Some(AddressIssue {
                    raw: raw.clone(),
                    reason: reason.clone(),
                });
                self.emit(EventKind::AddressNeedsCorrection { raw, error: reason })
                    .await;
            }
        }
    }

    // ── Discovery ─────────────────────────────────────────────────

    async fn reconnect(&mut self, reason: &'static str) {
        self.generation = self.generation.next();
        let generation = self.generation;
        self.sensors.invalidate(generation);
        self.relay.invalidate(generation);
        self.thermal.relay_reachable = false;
        tracing::debug!(%generation, reason, "reconnecting to accessory hub");
        self.set_phase(Phase::Discovering).await;

        let registry = Arc::clone(&self.registry);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = registry.discover().await;
            let _ = completions.send(Completion::Discovered { generation, result });
        });

        // a home address still without coordinate is retried silently
        if self.home_coordinate.is_none() && self.limiter.check().is_granted() {
            if let Some(address) = self.home_address.clone() {
                self.request_forward_geocode(address).await;
            }
        }
    }

    async fn on_discovered(
        &mut self,
        generation: Generation,
        result: Result<Vec<Accessory>, HomeError>,
    ) {
        if !generation.is_current(self.generation) {
            tracing::debug!(%generation, current = %self.generation, "dropping superseded discovery");
            return;
        }
        let accessories = match result {
            Ok(accessories) => accessories,
            Err(err) => {
                tracing::warn!(%generation, %err, "accessory discovery failed");
                self.set_phase(Phase::Degraded(DegradedReason::DiscoveryFailed))
                    .await;
                return;
            }
        };

        let classification = self.config.roles.classify(&accessories);
        for (accessory, role) in &classification.skipped {
            tracing::warn!(%accessory, %role, capability = %role.required_capability(), "accessory lacks capability for role, skipped");
        }
        tracing::debug!(%generation, found = accessories.len(), classified = classification.len(), "accessories discovered");

        self.sensors.resolve(generation, &classification);
        self.relay.resolve(generation, &classification);
        self.thermal.relay_reachable = self.relay.is_reachable();

        self.set_phase(self.phase_for(&classification)).await;
        self.poll_sensors(&classification);
        self.evaluate().await;
    }

    fn phase_for(&self, classification: &Classification) -> Phase {
        if !classification.has(AccessoryRole::Relay) || !self.relay.is_resolved() {
            Phase::Degraded(DegradedReason::NoRelay)
        } else if !self.relay.is_reachable() {
            Phase::Degraded(DegradedReason::RelayUnreachable)
        } else if !classification.has(AccessoryRole::Thermometer) {
            Phase::Degraded(DegradedReason::NoThermometer)
        } else {
            Phase::Polling
        }
    }

    /// Issue sensor reads. Cached values only count while their sensor is
    /// still part of the discovery.
    fn poll_sensors(&mut self, classification: &Classification) {
        let temperature = self
            .sensors
            .read(AccessoryRole::Thermometer, &Capability::CurrentTemperature);
        let humidity = self
            .sensors
            .read(AccessoryRole::Hygrometer, &Capability::CurrentRelativeHumidity);
        self.thermal.current_temperature = classification
            .has(AccessoryRole::Thermometer)
            .then(|| temperature.value())
            .flatten();
        self.humidity = classification
            .has(AccessoryRole::Hygrometer)
            .then(|| humidity.value())
            .flatten();
    }

    // ── Completions ───────────────────────────────────────────────

    async fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Discovered { generation, result } => {
                self.on_discovered(generation, result).await;
            }
            Completion::Read(read) => self.on_read(read).await,
            Completion::Write(write) => {
                self.relay.apply(&write);
            }
            Completion::Geocoded(geocoded) => self.on_geocoded(geocoded).await,
        }
    }

    async fn on_read(&mut self, read: ReadCompletion) {
        let generation = read.generation;
        let capability = read.capability.clone();
        let Some(value) = self.sensors.apply(read) else {
            return;
        };
        match capability {
            Capability::CurrentTemperature => {
                tracing::debug!(celsius = value, %generation, "temperature updated");
                self.thermal.current_temperature = Some(value);
                self.emit(EventKind::TemperatureUpdated {
                    celsius: value,
                    generation,
                })
                .await;
                self.evaluate().await;
            }
            Capability::CurrentRelativeHumidity => {
                tracing::debug!(percent = value, %generation, "humidity updated");
                self.humidity = Some(value);
                self.emit(EventKind::HumidityUpdated {
                    percent: value,
                    generation,
                })
                .await;
            }
            _ => {}
        }
    }

    // ── Rule ──────────────────────────────────────────────────────

    async fn evaluate(&mut self) {
        let decision = rule::evaluate(&self.thermal);
        match decision {
            Decision::NoAction(reason) => {
                if self.last_decision != Some(decision) {
                    tracing::info!(%reason, "rule suppressed");
                    self.emit(EventKind::RuleSuppressed { reason }).await;
                } else {
                    tracing::debug!(%reason, "rule still suppressed");
                }
            }
            Decision::TurnOn | Decision::TurnOff => {
                let on = decision == Decision::TurnOn;
                // a fresh generation may face a relay that lost or never saw the last write
                if on != self.thermal.relay_on || !self.relay.written_this_generation() {
                    if let Err(err) = self.command_relay(on, CommandOrigin::Rule).await {
                        tracing::warn!(on, %err, "rule could not command relay");
                    }
                }
            }
        }
        self.last_decision = Some(decision);
    }

    async fn command_relay(&mut self, on: bool, origin: CommandOrigin) -> Result<(), HomeError> {
        self.relay.write(on)?;
        self.thermal.relay_on = on;
        tracing::info!(on, ?origin, generation = %self.generation, "relay commanded");
        self.emit(EventKind::RelayCommanded {
            on,
            origin,
            generation: self.generation,
        })
        .await;
        Ok(())
    }

    // ── Commands ──────────────────────────────────────────────────

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::SetThreshold(threshold) => {
                if let Err(err) = self.thermal.set_threshold(threshold) {
                    tracing::warn!(threshold, %err, "rejected threshold");
                    return;
                }
                tracing::info!(threshold, "threshold changed");
                self.persist_threshold(threshold);
                self.evaluate().await;
            }
            Command::SetRelay { on, reply } => {
                let result = self.command_relay(on, CommandOrigin::User).await;
                if let Err(err) = &result {
                    tracing::warn!(on, %err, "manual relay command refused");
                }
                let _ = reply.send(result);
            }
            Command::SetHomeAddress(address) => self.set_home_address(address, None).await,
            Command::UpdatePosition(position) => {
                if self.position != Some(position) {
                    self.position = Some(position);
                    self.position_place = None;
                }
                self.request_reverse_geocode(position).await;
            }
            Command::AdoptPositionAsHome { reply } => {
                let result = match (self.position, self.position_place.clone()) {
                    (Some(position), Some(place)) => {
                        self.set_home_address(place.clone(), Some(position)).await;
                        Ok(place)
                    }
                    _ => Err(HomeError::from(NotFoundError {
                        entity: "Place",
                        id: "current position".to_string(),
                    })),
                };
                let _ = reply.send(result);
            }
            Command::Refresh => self.reconnect("refresh requested").await,
            // handled by the run loop
            Command::Shutdown => {}
        }
    }

    async fn set_home_address(&mut self, address: HomeAddress, located: Option<Coordinate>) {
        tracing::info!(%address, "home address changed");
        self.home_address = Some(address.clone());
        self.home_coordinate = located;
        self.address_issue = None;
        self.persist_home_address(address.clone());
        match located {
            Some(coordinate) => {
                self.emit(EventKind::HomeLocated {
                    address,
                    coordinate,
                })
                .await;
            }
            None => self.request_forward_geocode(address).await,
        }
    }

    // ── Geocoding ─────────────────────────────────────────────────

    async fn request_forward_geocode(&mut self, address: HomeAddress) {
        if !self.admit(GeocodeDirection::Forward).await {
            return;
        }
        let geocoder = Arc::clone(&self.geocoder);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = geocoder.forward_geocode(&address).await;
            let _ = completions.send(Completion::Geocoded(GeocodeCompletion::Forward {
                address,
                result,
            }));
        });
    }

    async fn request_reverse_geocode(&mut self, at: Coordinate) {
        if !self.admit(GeocodeDirection::Reverse).await {
            return;
        }
        let geocoder = Arc::clone(&self.geocoder);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = geocoder.reverse_geocode(at).await;
            let _ = completions.send(Completion::Geocoded(GeocodeCompletion::Reverse { at, result }));
        });
    }

    async fn admit(&mut self, direction: GeocodeDirection) -> bool {
        let admission = self.limiter.try_acquire();
        if admission.is_granted() {
            return true;
        }
        tracing::info!(?direction, ?admission, "geocoding request dropped");
        self.emit(EventKind::GeocodeDropped {
            direction,
            admission,
        })
        .await;
        false
    }

    async fn on_geocoded(&mut self, geocoded: GeocodeCompletion) {
        match geocoded {
            GeocodeCompletion::Forward { address, result } => match result {
                Ok(coordinate) => {
                    self.limiter.record_success();
                    if self.home_address.as_ref() != Some(&address) {
                        tracing::debug!(%address, "home address changed while geocoding");
                        return;
                    }
                    tracing::info!(%address, ?coordinate, "home located");
                    self.home_coordinate = Some(coordinate);
                    self.emit(EventKind::HomeLocated {
                        address,
                        coordinate,
                    })
                    .await;
                }
                Err(err) => {
                    self.limiter.record_failure();
                    tracing::warn!(%address, %err, "forward geocoding failed");
                }
            },
            GeocodeCompletion::Reverse { at, result } => match result {
                Ok(place) => {
                    self.limiter.record_success();
                    if self.position != Some(at) {
                        tracing::debug!(?at, "position moved while geocoding");
                        return;
                    }
                    tracing::info!(%place, "position resolved");
                    self.position_place = Some(place.clone());
                    self.emit(EventKind::PositionResolved {
                        coordinate: at,
                        place,
                    })
                    .await;
                }
                Err(err) => {
                    self.limiter.record_failure();
                    tracing::warn!(?at, %err, "reverse geocoding failed");
                }
            },
        }
    }

    // ── Persistence ───────────────────────────────────────────────

    fn persist_threshold(&self, threshold: f64) {
        let settings = Arc::clone(&self.settings);
        tokio::spawn(async move {
            if let Err(err) = settings.save_threshold(threshold).await {
                tracing::warn!(threshold, %err, "failed to persist threshold");
            }
        });
    }

    fn persist_home_address(&self, address: HomeAddress) {
        let settings = Arc::clone(&self.settings);
        tokio::spawn(async move {
            if let Err(err) = settings.save_home_address(&address).await {
                tracing::warn!(%address, %err, "failed to persist home address");
            }
        });
    }

    // ── Output ────────────────────────────────────────────────────

    async fn set_phase(&mut self, phase: Phase) {
        if self.phase == phase {
            return;
        }
        let from = std::mem::replace(&mut self.phase, phase);
        if phase.is_degraded() {
            tracing::warn!(%from, to = %phase, generation = %self.generation, "control loop degraded");
        } else {
            tracing::debug!(%from, to = %phase, generation = %self.generation, "phase changed");
        }
        self.emit(EventKind::PhaseChanged {
            from,
            to: phase,
            generation: self.generation,
        })
        .await;
    }

    async fn emit(&self, kind: EventKind) {
        if let Err(err) = self.publisher.publish(Event::new(kind)).await {
            tracing::warn!(%err, "failed to publish event");
        }
    }

    fn snapshot(&self) -> ControlSnapshot {
        let distance_to_home_m = match (self.position, self.home_coordinate) {
            (Some(position), Some(home)) => Some(position.distance_to(&home)),
            _ => None,
        };
        ControlSnapshot {
            phase: self.phase,
            generation: self.generation,
            thermal: self.thermal.clone(),
            humidity: self.humidity,
            home_address: self.home_address.clone(),
            home_coordinate: self.home_coordinate,
            address_issue: self.address_issue.clone(),
            position: self.position,
            position_place: self.position_place.clone(),
            distance_to_home_m,
            updated_at: localhome_domain::time::now(),
        }
    }

    fn publish_snapshot(&self) {
        let next = self.snapshot();
        self.snapshots.send_if_modified(|current| {
            if current.same_state(&next) {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
