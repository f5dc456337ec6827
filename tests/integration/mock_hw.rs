//! Mock adapters for integration tests.
//!
//! Records every actuator call and every dashboard publish so tests can
//! assert on the full history without touching GPIO or sockets.

use std::collections::VecDeque;

use sericulture::app::events::AppEvent;
use sericulture::app::ports::{ActuatorPort, EventSink, RemotePort, SensorPort};
use sericulture::control::{ActuatorId, ClimateReading, StatusLabel};
use sericulture::error::{ActuatorError, RemoteError, SensorError};

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    Set { actuator: ActuatorId, on: bool },
    Indicator(bool),
    AllOff,
}

// ── MockHardware ──────────────────────────────────────────────

/// Sensor + relays.  Readings are scripted; once the script runs out the
/// last scripted result repeats.
pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    script: VecDeque<Result<ClimateReading, SensorError>>,
    last: Result<ClimateReading, SensorError>,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            script: VecDeque::new(),
            last: Err(SensorError::NoResponse),
            fail_writes: false,
        }
    }

    pub fn push_reading(&mut self, temperature_c: f64, humidity_percent: f64) {
        self.script
            .push_back(Ok(ClimateReading::new(temperature_c, humidity_percent)));
    }

    pub fn push_failure(&mut self) {
        self.script.push_back(Err(SensorError::Timeout));
    }

    /// Current physical state implied by the call history.
    pub fn relay_on(&self, actuator: ActuatorId) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Set { actuator: a, on } if *a == actuator => Some(*on),
                ActuatorCall::AllOff => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn sets_for(&self, actuator: ActuatorId) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Set { actuator: a, on } if *a == actuator => Some(*on),
                _ => None,
            })
            .collect()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
    }
}

impl ActuatorPort for MockHardware {
    fn set_actuator(&mut self, actuator: ActuatorId, on: bool) -> Result<(), ActuatorError> {
        if self.fail_writes {
            return Err(ActuatorError::GpioWriteFailed(-1));
        }
        self.calls.push(ActuatorCall::Set { actuator, on });
        Ok(())
    }

    fn set_indicator(&mut self, on: bool) -> Result<(), ActuatorError> {
        if self.fail_writes {
            return Err(ActuatorError::GpioWriteFailed(-1));
        }
        self.calls.push(ActuatorCall::Indicator(on));
        Ok(())
    }

    fn all_off(&mut self) {
        self.calls.push(ActuatorCall::AllOff);
    }
}

// ── MockRemote ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Published {
    Status(ActuatorId, StatusLabel),
    Telemetry(f64, f64),
    System(String),
}

pub struct MockRemote {
    pub connected: bool,
    pub sent: Vec<Published>,
}

#[allow(dead_code)]
impl MockRemote {
    pub fn new() -> Self {
        Self {
            connected: true,
            sent: Vec::new(),
        }
    }

    pub fn statuses(&self, actuator: ActuatorId) -> Vec<StatusLabel> {
        self.sent
            .iter()
            .filter_map(|p| match p {
                Published::Status(a, l) if *a == actuator => Some(*l),
                _ => None,
            })
            .collect()
    }

    pub fn telemetry_count(&self) -> usize {
        self.sent
            .iter()
            .filter(|p| matches!(p, Published::Telemetry(..)))
            .count()
    }

    fn check(&self) -> Result<(), RemoteError> {
        if self.connected {
            Ok(())
        } else {
            Err(RemoteError::NotConnected)
        }
    }
}

impl Default for MockRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl RemotePort for MockRemote {
    fn publish_status(
        &mut self,
        actuator: ActuatorId,
        label: StatusLabel,
    ) -> Result<(), RemoteError> {
        self.check()?;
        self.sent.push(Published::Status(actuator, label));
        Ok(())
    }

    fn publish_telemetry(&mut self, reading: &ClimateReading) -> Result<(), RemoteError> {
        self.check()?;
        self.sent
            .push(Published::Telemetry(reading.temperature_c, reading.humidity_percent));
        Ok(())
    }

    fn publish_system_status(&mut self, text: &str) -> Result<(), RemoteError> {
        self.check()?;
        self.sent.push(Published::System(text.to_string()));
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
