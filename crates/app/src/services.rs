//! Services driven by the control loop.
//!
//! Both services hold handles resolved from one discovery generation and
//! report their IO through the loop's completion channel.

pub mod relay_actuator;
pub mod sensor_reader;

pub use relay_actuator::RelayActuator;
pub use sensor_reader::SensorReader;
