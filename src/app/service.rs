//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the arbitration engine and everything the control
//! loop must remember between cycles: the indicator state and which status
//! labels the dashboard has already seen.  All I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │       AppService        │
//! ActuatorPort ◀──│  Arbiter · indicator    │ ──▶ RemotePort
//!                 └────────────────────────┘
//! ```

use core::time::Duration;

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::control::{ActuatorId, Arbiter, ClimateReading, StatusLabel, Timestamp};

use super::commands::AppCommand;
use super::events::{AppEvent, CycleSummary};
use super::ports::{ActuatorPort, EventSink, RemotePort, SensorPort};

/// V6 text sent on orderly shutdown.
pub const SYSTEM_OFFLINE: &str = "System Offline";

// ───────────────────────────────────────────────────────────────
// CycleReport
// ───────────────────────────────────────────────────────────────

/// What the control loop needs to know after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub summary: CycleSummary,
    /// How long to sleep before the next tick.
    pub next_delay: Duration,
}

impl CycleReport {
    pub fn sensor_ok(&self) -> bool {
        self.summary.reading.is_some()
    }
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    arbiter: Arbiter,
    cycle_interval: Duration,
    retry_interval: Duration,
    /// Labels from the last cycle, for change detection.
    labels: [StatusLabel; 2],
    /// Labels the dashboard has acknowledged; `None` forces a resend.
    published: [Option<StatusLabel>; 2],
    indicator_on: bool,
    tick_count: u64,
}

impl AppService {
    /// Construct the service from configuration.  Both actuators start idle.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            arbiter: Arbiter::new(config.thresholds()),
            cycle_interval: config.cycle_interval(),
            retry_interval: config.sensor_retry_interval(),
            labels: [StatusLabel::Off; 2],
            published: [None; 2],
            indicator_on: false,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        let t = self.arbiter.thresholds();
        info!(
            "AppService started: fan > {:.1}°C, pump < {:.1}%, run {}s",
            t.max_temperature_c,
            t.min_humidity_percent,
            t.run_duration.as_secs()
        );
        sink.emit(&AppEvent::Started {
            max_temperature_c: t.max_temperature_c,
            min_humidity_percent: t.min_humidity_percent,
        });
    }

    /// Force every output off and tell the dashboard we are going away.
    pub fn shutdown(
        &mut self,
        hw: &mut impl ActuatorPort,
        remote: &mut impl RemotePort,
        sink: &mut impl EventSink,
    ) {
        self.arbiter.force_all_off();
        hw.all_off();
        self.indicator_on = false;
        self.labels = [StatusLabel::Off; 2];

        if let Err(e) = remote.publish_system_status(SYSTEM_OFFLINE) {
            debug!("offline notice not sent: {}", e);
        }
        info!("All actuators OFF, shutting down");
        sink.emit(&AppEvent::Shutdown);
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an event from the remote channel.
    ///
    /// Overrides are recorded in arrival order and take effect at the next
    /// tick, so the last one for an actuator wins.
    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) {
        match cmd {
            AppCommand::Override(ov) => self.arbiter.apply_override(ov),
            AppCommand::LinkConnected => {
                info!("dashboard link up");
                self.published = [None; 2];
                sink.emit(&AppEvent::LinkChanged { connected: true });
            }
            AppCommand::LinkDisconnected => {
                warn!("dashboard link down");
                sink.emit(&AppEvent::LinkChanged { connected: false });
            }
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle:
    /// read sensor → arbitrate → apply edges → indicator → publish.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        now: Timestamp,
        hw: &mut (impl SensorPort + ActuatorPort),
        remote: &mut impl RemotePort,
        sink: &mut impl EventSink,
    ) -> CycleReport {
        self.tick_count += 1;

        // 1. Sensor
        let reading = match hw.read_climate() {
            Ok(r) => Some(r),
            Err(e) => {
                warn!("sensor read failed: {}", e);
                sink.emit(&AppEvent::SensorReadFailed(e));
                None
            }
        };

        // 2. Arbitration
        let outcome = self.arbiter.run_cycle(now, reading, &[]);

        // 3. Relay edges
        for cmd in &outcome.commands {
            info!("{} -> {}", cmd.actuator, if cmd.on { "ON" } else { "OFF" });
            if let Err(error) = hw.set_actuator(cmd.actuator, cmd.on) {
                warn!("{} relay write failed: {}, retrying next cycle", cmd.actuator, error);
                self.arbiter.mark_output_unknown(cmd.actuator);
                sink.emit(&AppEvent::ActuatorFault {
                    actuator: cmd.actuator,
                    error,
                });
            }
        }

        // 4. Indicator follows the latest valid temperature
        if let Some(r) = &reading {
            self.update_indicator(r, hw, sink);
        }

        // 5. Dashboard
        if let Some(r) = &reading {
            if let Err(e) = remote.publish_telemetry(r) {
                debug!("telemetry not sent: {}", e);
            }
        }
        for id in ActuatorId::ALL {
            let label = outcome.status(id);
            if self.labels[id.index()] != label {
                self.labels[id.index()] = label;
                sink.emit(&AppEvent::StatusChanged { actuator: id, label });
            }
            self.publish_status_if_stale(id, label, remote);
        }

        let summary = CycleSummary {
            at: now,
            reading,
            fan: outcome.status(ActuatorId::Fan),
            pump: outcome.status(ActuatorId::Pump),
            indicator_on: self.indicator_on,
        };
        sink.emit(&AppEvent::Cycle(summary));

        CycleReport {
            summary,
            next_delay: if reading.is_some() {
                self.cycle_interval
            } else {
                self.retry_interval
            },
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn arbiter(&self) -> &Arbiter {
        &self.arbiter
    }

    pub fn indicator_on(&self) -> bool {
        self.indicator_on
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn update_indicator(
        &mut self,
        reading: &ClimateReading,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        let want = reading.temperature_c < self.arbiter.thresholds().max_temperature_c;
        if want == self.indicator_on {
            return;
        }
        match hw.set_indicator(want) {
            Ok(()) => self.indicator_on = want,
            Err(e) => {
                warn!("indicator write failed: {}", e);
                sink.emit(&AppEvent::IndicatorFault(e));
            }
        }
    }

    fn publish_status_if_stale(
        &mut self,
        id: ActuatorId,
        label: StatusLabel,
        remote: &mut impl RemotePort,
    ) {
        let slot = &mut self.published[id.index()];
        if *slot == Some(label) {
            return;
        }
        match remote.publish_status(id, label) {
            Ok(()) => *slot = Some(label),
            Err(e) => debug!("{} status not sent: {}", id, e),
        }
    }
}
