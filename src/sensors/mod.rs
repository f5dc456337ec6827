//! Sensor drivers.
//!
//! The enclosure has a single combined temperature / humidity sensor; the
//! hardware adapter owns the driver and exposes it through
//! [`SensorPort`](crate::app::ports::SensorPort).

pub mod dht11;

pub use dht11::Dht11;
