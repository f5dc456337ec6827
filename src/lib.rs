//! Sericulture climate-control library.
//!
//! Exposes the pure-logic modules for integration testing and host-side
//! simulation. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod pins;
pub mod remote;

// Hardware-facing layers; the simulation stubs inside keep them
// buildable on the host.
pub mod adapters;
pub mod drivers;
pub mod sensors;
