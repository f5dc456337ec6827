//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log, test recorder, etc.).

use crate::control::{ActuatorId, ClimateReading, StatusLabel, Timestamp};
use crate::error::{ActuatorError, SensorError};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started with the given trigger points.
    Started {
        max_temperature_c: f64,
        min_humidity_percent: f64,
    },

    /// One control cycle finished.
    Cycle(CycleSummary),

    /// An actuator's label differs from the previous cycle.
    StatusChanged {
        actuator: ActuatorId,
        label: StatusLabel,
    },

    /// The climate sensor could not be read this cycle.
    SensorReadFailed(SensorError),

    /// A relay edge could not be applied.
    ActuatorFault {
        actuator: ActuatorId,
        error: ActuatorError,
    },

    /// The indicator LED could not be driven.
    IndicatorFault(ActuatorError),

    /// The dashboard link state changed.
    LinkChanged { connected: bool },

    /// Outputs have been forced off and the service is stopping.
    Shutdown,
}

/// What happened in one cycle, suitable for a console line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSummary {
    pub at: Timestamp,
    /// `None` when the sensor read failed.
    pub reading: Option<ClimateReading>,
    pub fan: StatusLabel,
    pub pump: StatusLabel,
    pub indicator_on: bool,
}
