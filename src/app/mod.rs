//! Application core: pure domain logic, zero I/O.
//!
//! This module wires the arbitration engine ([`crate::control`]) to the
//! outside world: it reads the climate sensor, drives relay edges and the
//! indicator, and publishes status to the dashboard.  All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod runner;
pub mod service;
