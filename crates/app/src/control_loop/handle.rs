//! Cloneable front door to a running control loop.

use tokio::sync::{mpsc, oneshot, watch};

use localhome_domain::address::HomeAddress;
use localhome_domain::error::HomeError;
use localhome_domain::geo::Coordinate;
use localhome_domain::thermal::validate_threshold;

use super::command::Command;
use super::snapshot::ControlSnapshot;

/// Sends commands to the loop and observes its snapshots.
///
/// Every command fails with [`HomeError::LoopStopped`] once the loop task
/// has exited.
#[derive(Clone)]
pub struct ControlHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<ControlSnapshot>,
}

impl ControlHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<Command>,
        snapshots: watch::Receiver<ControlSnapshot>,
    ) -> Self {
        Self {
            commands,
            snapshots,
        }
    }

    /// Change and persist the threshold temperature. The rule is
    /// re-evaluated right away.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] for a non-finite threshold.
    pub async fn set_threshold(&self, threshold: f64) -> Result<(), HomeError> {
        validate_threshold(threshold)?;
        self.send(Command::SetThreshold(threshold)).await
    }

    /// Switch the relay by hand.
    ///
    /// The override holds until the rule next decides otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::NotFound`] without a relay and
    /// [`HomeError::Unreachable`] when the hub reports it offline.
    pub async fn set_relay(&self, on: bool) -> Result<(), HomeError> {
        let (reply, answer) = oneshot::channel();
        self.send(Command::SetRelay { on, reply }).await?;
        answer.await.map_err(|_| HomeError::LoopStopped)?
    }

    /// Replace and persist the home address, then look up its coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] when the address would not survive
    /// its persisted form.
    pub async fn set_home_address(&self, address: HomeAddress) -> Result<(), HomeError> {
        address.validate()?;
        self.send(Command::SetHomeAddress(address)).await
    }

    /// Report the device's current position. The place name is looked up
    /// when the geocoding rate limit allows it.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::LoopStopped`] when the loop is gone.
    pub async fn update_position(&self, position: Coordinate) -> Result<(), HomeError> {
        self.send(Command::UpdatePosition(position)).await
    }

    /// Make the place resolved for the current position the new home.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::NotFound`] when no place has been resolved yet.
    pub async fn adopt_position_as_home(&self) -> Result<HomeAddress, HomeError> {
        let (reply, answer) = oneshot::channel();
        self.send(Command::AdoptPositionAsHome { reply }).await?;
        answer.await.map_err(|_| HomeError::LoopStopped)?
    }

    /// Force a reconnect without waiting for the timer.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::LoopStopped`] when the loop is gone.
    pub async fn refresh(&self) -> Result<(), HomeError> {
        self.send(Command::Refresh).await
    }

    /// Ask the loop to stop.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::LoopStopped`] when the loop is already gone.
    pub async fn shutdown(&self) -> Result<(), HomeError> {
        self.send(Command::Shutdown).await
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ControlSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver notified on every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ControlSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a snapshot satisfies `predicate`, checking the current one
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::LoopStopped`] when the loop exits first.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&ControlSnapshot) -> bool,
    ) -> Result<ControlSnapshot, HomeError> {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| HomeError::LoopStopped)?;
        Ok(snapshot.clone())
    }

    async fn send(&self, command: Command) -> Result<(), HomeError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| HomeError::LoopStopped)
    }
}
