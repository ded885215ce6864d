//! # localhome-domain
//!
//! Pure domain model for the localhome environmental controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Accessories** and their typed **Characteristics**
//! - Define **Roles** (thermometer, hygrometer, relay) and how accessories get them
//! - Define the **ThermalState** and the **ThresholdRule** that drives the relay
//! - Define **HomeAddress** and **Coordinate** value objects
//! - Define the **GeocodeRateLimiter** and reconnect **Generation** counters
//! - Define the control-loop **Phase** and the **Events** it emits
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod accessory;
pub mod address;
pub mod event;
pub mod generation;
pub mod geo;
pub mod phase;
pub mod rate_limit;
pub mod role;
pub mod rule;
pub mod thermal;
