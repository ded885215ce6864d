//! # localhome-app
//!
//! Application layer: the control loop and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `AccessoryRegistry`: discover accessories, read/write characteristics,
//!     accessory-change notifications
//!   - `GeocodingService`: forward and reverse geocoding
//!   - `SettingsStore`: persisted home address and threshold
//!   - `EventPublisher`: publish control-loop events
//! - Provide the **services** the loop drives: `SensorReader`, `RelayActuator`
//! - Provide the **ControlLoop** actor and its cloneable `ControlHandle`
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `localhome-domain` only (plus `tokio` for tasks, channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod completion;
pub mod control_loop;
pub mod event_bus;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;
