//! Arbitration engine: one call per control cycle.

use core::time::Duration;

use heapless::Vec;
use log::debug;
use serde::{Deserialize, Serialize};

use super::actuator::{ActuatorControl, ActuatorId, StatusLabel};
use super::time::Timestamp;
use super::ClimateReading;

/// Operator intent for one actuator, as received from the remote channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideCommand {
    pub actuator: ActuatorId,
    /// `Some(on)` forces the relay, `None` hands control back to auto mode.
    pub intent: Option<bool>,
}

impl OverrideCommand {
    pub const fn force_on(actuator: ActuatorId) -> Self {
        Self {
            actuator,
            intent: Some(true),
        }
    }

    pub const fn force_off(actuator: ActuatorId) -> Self {
        Self {
            actuator,
            intent: Some(false),
        }
    }

    pub const fn release(actuator: ActuatorId) -> Self {
        Self {
            actuator,
            intent: None,
        }
    }
}

/// An ON/OFF edge the output driver must apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorCommand {
    pub actuator: ActuatorId,
    pub on: bool,
}

/// Auto-mode trigger points.  Comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Fan triggers when temperature rises above this (°C).
    pub max_temperature_c: f64,
    /// Pump triggers when humidity falls below this (%).
    pub min_humidity_percent: f64,
    /// Minimum time an auto-triggered actuator stays on.
    pub run_duration: Duration,
}

impl Thresholds {
    /// Whether `reading` crosses the trigger point for `actuator`.
    pub fn is_triggered(&self, actuator: ActuatorId, reading: &ClimateReading) -> bool {
        match actuator {
            ActuatorId::Fan => reading.temperature_c > self.max_temperature_c,
            ActuatorId::Pump => reading.humidity_percent < self.min_humidity_percent,
        }
    }
}

/// Result of one [`Arbiter::run_cycle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    statuses: [StatusLabel; 2],
    /// Edges to apply this cycle, at most one per actuator.
    pub commands: Vec<ActuatorCommand, 2>,
}

impl CycleOutcome {
    pub fn status(&self, actuator: ActuatorId) -> StatusLabel {
        self.statuses[actuator.index()]
    }

    pub fn command_for(&self, actuator: ActuatorId) -> Option<bool> {
        self.commands
            .iter()
            .find(|c| c.actuator == actuator)
            .map(|c| c.on)
    }
}

/// Owns both actuator records and the last commanded physical state.
#[derive(Debug, Clone)]
pub struct Arbiter {
    thresholds: Thresholds,
    controls: [ActuatorControl; 2],
    /// Physical state most recently handed to the output driver; `None`
    /// after a failed write, so the next cycle issues the edge again.
    commanded: [Option<bool>; 2],
}

impl Arbiter {
    /// Both actuators idle, no overrides, relays assumed de-energised.
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            controls: [ActuatorControl::new(); 2],
            commanded: [Some(false); 2],
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn control(&self, actuator: ActuatorId) -> &ActuatorControl {
        &self.controls[actuator.index()]
    }

    /// Physical state last commanded for `actuator`.
    pub fn is_commanded_on(&self, actuator: ActuatorId) -> bool {
        self.commanded[actuator.index()] == Some(true)
    }

    /// Record an operator command.  It takes effect in the next
    /// [`run_cycle`](Self::run_cycle).
    pub fn apply_override(&mut self, cmd: OverrideCommand) {
        debug!("override {} -> {:?}", cmd.actuator, cmd.intent);
        self.controls[cmd.actuator.index()].apply_override(cmd.intent);
    }

    /// The driver rejected the last edge for `actuator`.  The relay state is
    /// unknown until the next cycle commands it again.
    pub fn mark_output_unknown(&mut self, actuator: ActuatorId) {
        self.commanded[actuator.index()] = None;
    }

    /// Run one control cycle.
    ///
    /// Overrides are applied in order before any auto evaluation, so the
    /// last command for an actuator wins.  Commands are returned only for
    /// actuators whose required physical state differs from the last one
    /// issued.
    pub fn run_cycle(
        &mut self,
        now: Timestamp,
        reading: Option<ClimateReading>,
        overrides: &[OverrideCommand],
    ) -> CycleOutcome {
        for cmd in overrides {
            self.apply_override(*cmd);
        }

        let mut statuses = [StatusLabel::Off; 2];
        let mut commands = Vec::new();

        for id in ActuatorId::ALL {
            let i = id.index();
            let triggered = reading.as_ref().map(|r| self.thresholds.is_triggered(id, r));
            statuses[i] = self.controls[i].evaluate(now, triggered, self.thresholds.run_duration);

            let desired = self.controls[i].wants_on();
            if self.commanded[i] != Some(desired) {
                self.commanded[i] = Some(desired);
                // Capacity equals the number of actuators.
                let _ = commands.push(ActuatorCommand {
                    actuator: id,
                    on: desired,
                });
            }
        }

        CycleOutcome { statuses, commands }
    }

    /// Forget every override and auto window and mark both relays off.
    ///
    /// The caller is responsible for actually de-energising the outputs.
    pub fn force_all_off(&mut self) {
        for c in &mut self.controls {
            c.reset();
        }
        self.commanded = [Some(false); 2];
    }
}
