//! Requests sent from a [`ControlHandle`](super::ControlHandle) to the loop.

use tokio::sync::oneshot;

use localhome_domain::address::HomeAddress;
use localhome_domain::error::HomeError;
use localhome_domain::geo::Coordinate;

pub(crate) type Reply<T> = oneshot::Sender<Result<T, HomeError>>;

#[derive(Debug)]
pub(crate) enum Command {
    SetThreshold(f64),
    SetRelay { on: bool, reply: Reply<()> },
    SetHomeAddress(HomeAddress),
    UpdatePosition(Coordinate),
    AdoptPositionAsHome { reply: Reply<HomeAddress> },
    Refresh,
    Shutdown,
}
