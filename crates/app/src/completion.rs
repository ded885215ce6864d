//! Completions: results of asynchronous work sent back to the control loop.
//!
//! IO runs in spawned tasks. Each task reports back through a
//! [`CompletionSender`] so the loop applies every result on its own task,
//! in the order the results arrive.

use tokio::sync::mpsc;

use localhome_domain::accessory::{Accessory, Capability, CharacteristicValue};
use localhome_domain::address::HomeAddress;
use localhome_domain::error::HomeError;
use localhome_domain::generation::Generation;
use localhome_domain::geo::Coordinate;
use localhome_domain::role::AccessoryRole;

pub type CompletionSender = mpsc::UnboundedSender<Completion>;
pub type CompletionReceiver = mpsc::UnboundedReceiver<Completion>;

/// Create the completion channel.
#[must_use]
pub fn channel() -> (CompletionSender, CompletionReceiver) {
    mpsc::unbounded_channel()
}

#[derive(Debug)]
pub enum Completion {
    Discovered {
        generation: Generation,
        result: Result<Vec<Accessory>, HomeError>,
    },
    Read(ReadCompletion),
    Write(WriteCompletion),
    Geocoded(GeocodeCompletion),
}

#[derive(Debug)]
pub struct ReadCompletion {
    pub generation: Generation,
    pub role: AccessoryRole,
    pub capability: Capability,
    pub result: Result<CharacteristicValue, HomeError>,
}

#[derive(Debug)]
pub struct WriteCompletion {
    pub generation: Generation,
    pub on: bool,
    pub result: Result<(), HomeError>,
}

#[derive(Debug)]
pub enum GeocodeCompletion {
    Forward {
        address: HomeAddress,
        result: Result<Coordinate, HomeError>,
    },
    Reverse {
        at: Coordinate,
        result: Result<HomeAddress, HomeError>,
    },
}
