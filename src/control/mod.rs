//! Actuator arbitration: the only stateful logic in the system.
//!
//! Each control cycle the [`Arbiter`] receives the latest climate reading
//! (or `None` after a failed read), the current monotonic time and the
//! override commands drained from the remote mailbox.  It decides, per
//! actuator, whether the relay should be energised and which status label
//! the dashboard should show.
//!
//! ```text
//!   overrides ──▶ ┌──────────────────────────────┐
//!   reading   ──▶ │ Arbiter                      │ ──▶ edge commands
//!   now       ──▶ │  fan:  ActuatorControl       │ ──▶ status labels
//!                 │  pump: ActuatorControl       │
//!                 └──────────────────────────────┘
//! ```
//!
//! Nothing in here performs I/O; the [`AppService`](crate::app::service::AppService)
//! applies the outcome through the port traits.

pub mod actuator;
pub mod arbiter;
pub mod mailbox;
pub mod time;

pub use actuator::{ActuatorControl, ActuatorId, ControlState, StatusLabel};
pub use arbiter::{ActuatorCommand, Arbiter, CycleOutcome, OverrideCommand, Thresholds};
pub use mailbox::OverrideMailbox;
pub use time::Timestamp;

/// One successful temperature/humidity sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    /// Air temperature (°C).
    pub temperature_c: f64,
    /// Relative humidity (%).
    pub humidity_percent: f64,
}

impl ClimateReading {
    pub const fn new(temperature_c: f64, humidity_percent: f64) -> Self {
        Self {
            temperature_c,
            humidity_percent,
        }
    }
}
