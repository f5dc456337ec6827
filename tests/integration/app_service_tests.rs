//! AppService and control-loop tests against mock adapters.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use sericulture::app::commands::AppCommand;
use sericulture::app::events::AppEvent;
use sericulture::app::ports::ClockPort;
use sericulture::app::runner;
use sericulture::app::service::{AppService, SYSTEM_OFFLINE};
use sericulture::config::SystemConfig;
use sericulture::control::{ActuatorId, OverrideCommand, StatusLabel, Timestamp};

use crate::mock_hw::{ActuatorCall, MockHardware, MockRemote, Published, RecordingSink};

fn service() -> AppService {
    AppService::new(&SystemConfig::default())
}

fn at(secs: u64) -> Timestamp {
    Timestamp::from_secs(secs)
}

// ── Tick ──────────────────────────────────────────────────────

#[test]
fn hot_cycle_drives_fan_and_publishes() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut remote = MockRemote::new();
    let mut sink = RecordingSink::new();

    hw.push_reading(26.0, 60.0);
    let report = app.tick(at(0), &mut hw, &mut remote, &mut sink);

    assert_eq!(report.summary.fan, StatusLabel::AutoOn);
    assert_eq!(report.summary.pump, StatusLabel::Off);
    assert_eq!(report.next_delay, Duration::from_millis(5_000));
    assert_eq!(hw.sets_for(ActuatorId::Fan), vec![true]);
    assert!(hw.sets_for(ActuatorId::Pump).is_empty());
    assert_eq!(remote.statuses(ActuatorId::Fan), vec![StatusLabel::AutoOn]);
    assert_eq!(remote.statuses(ActuatorId::Pump), vec![StatusLabel::Off]);
    assert!(remote.sent.contains(&Published::Telemetry(26.0, 60.0)));
}

#[test]
fn steady_state_sends_nothing_new() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut remote = MockRemote::new();
    let mut sink = RecordingSink::new();

    hw.push_reading(26.0, 60.0);
    for s in [0, 5] {
        app.tick(at(s), &mut hw, &mut remote, &mut sink);
    }
    assert_eq!(hw.sets_for(ActuatorId::Fan), vec![true]);
    assert_eq!(remote.statuses(ActuatorId::Fan).len(), 1);
    // Telemetry goes out every valid cycle.
    assert_eq!(remote.telemetry_count(), 2);
}

#[test]
fn failed_read_keeps_timer_and_uses_retry_delay() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut remote = MockRemote::new();
    let mut sink = RecordingSink::new();

    hw.push_reading(26.0, 60.0);
    hw.push_failure();
    app.tick(at(0), &mut hw, &mut remote, &mut sink);

    let second = app.tick(at(3), &mut hw, &mut remote, &mut sink);
    assert!(!second.sensor_ok());
    assert_eq!(second.summary.fan, StatusLabel::AutoOn);
    assert_eq!(second.next_delay, Duration::from_millis(2_000));

    let third = app.tick(at(11), &mut hw, &mut remote, &mut sink);
    assert_eq!(third.summary.fan, StatusLabel::Off);
    assert_eq!(hw.sets_for(ActuatorId::Fan), vec![true, false]);
    assert_eq!(remote.telemetry_count(), 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SensorReadFailed(_))),
        2
    );
}

#[test]
fn queued_overrides_apply_before_evaluation() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut remote = MockRemote::new();
    let mut sink = RecordingSink::new();

    hw.push_reading(22.0, 45.0);
    app.tick(at(0), &mut hw, &mut remote, &mut sink);
    assert!(hw.relay_on(ActuatorId::Pump));

    app.handle_command(
        AppCommand::Override(OverrideCommand::force_on(ActuatorId::Pump)),
        &mut sink,
    );
    app.handle_command(
        AppCommand::Override(OverrideCommand::force_off(ActuatorId::Pump)),
        &mut sink,
    );
    // Recorded at once but nothing is driven until the tick.
    assert_eq!(app.arbiter().control(ActuatorId::Pump).manual_override(), Some(false));
    assert!(hw.relay_on(ActuatorId::Pump));

    let r = app.tick(at(2), &mut hw, &mut remote, &mut sink);
    assert_eq!(r.summary.pump, StatusLabel::Off);
    assert!(!hw.relay_on(ActuatorId::Pump));
    assert_eq!(
        remote.statuses(ActuatorId::Pump),
        vec![StatusLabel::AutoOn, StatusLabel::Off]
    );
}

#[test]
fn indicator_follows_temperature_and_survives_failed_reads() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut remote = MockRemote::new();
    let mut sink = RecordingSink::new();

    hw.push_reading(20.0, 60.0);
    hw.push_failure();
    hw.push_reading(30.0, 60.0);

    app.tick(at(0), &mut hw, &mut remote, &mut sink);
    assert!(app.indicator_on());
    app.tick(at(5), &mut hw, &mut remote, &mut sink);
    assert!(app.indicator_on());
    app.tick(at(7), &mut hw, &mut remote, &mut sink);
    assert!(!app.indicator_on());

    let indicator: Vec<_> = hw
        .calls
        .iter()
        .filter(|c| matches!(c, ActuatorCall::Indicator(_)))
        .cloned()
        .collect();
    assert_eq!(
        indicator,
        vec![ActuatorCall::Indicator(true), ActuatorCall::Indicator(false)]
    );
}

#[test]
fn relay_fault_is_reported_and_retried_next_cycle() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut remote = MockRemote::new();
    let mut sink = RecordingSink::new();

    hw.fail_writes = true;
    hw.push_reading(26.0, 60.0);
    let r = app.tick(at(0), &mut hw, &mut remote, &mut sink);

    assert_eq!(r.summary.fan, StatusLabel::AutoOn);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ActuatorFault { actuator: ActuatorId::Fan, .. })),
        1
    );
    assert!(hw.sets_for(ActuatorId::Fan).is_empty());

    hw.fail_writes = false;
    app.tick(at(5), &mut hw, &mut remote, &mut sink);
    assert_eq!(hw.sets_for(ActuatorId::Fan), vec![true]);

    app.tick(at(8), &mut hw, &mut remote, &mut sink);
    assert_eq!(hw.sets_for(ActuatorId::Fan), vec![true], "no repeat once applied");
}

#[test]
fn manual_on_survives_a_transient_write_failure() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut remote = MockRemote::new();
    let mut sink = RecordingSink::new();

    hw.push_reading(22.0, 60.0);
    app.handle_command(
        AppCommand::Override(OverrideCommand::force_on(ActuatorId::Pump)),
        &mut sink,
    );
    hw.fail_writes = true;
    app.tick(at(0), &mut hw, &mut remote, &mut sink);
    assert!(!hw.relay_on(ActuatorId::Pump));

    hw.fail_writes = false;
    for s in 1..20 {
        let r = app.tick(at(s * 5), &mut hw, &mut remote, &mut sink);
        assert_eq!(r.summary.pump, StatusLabel::ManualOn);
    }
    assert!(hw.relay_on(ActuatorId::Pump));
    assert_eq!(hw.sets_for(ActuatorId::Pump), vec![true]);
    assert!(app.arbiter().is_commanded_on(ActuatorId::Pump));
}

#[test]
fn statuses_republished_after_reconnect() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut remote = MockRemote::new();
    let mut sink = RecordingSink::new();

    remote.connected = false;
    hw.push_reading(26.0, 60.0);
    app.tick(at(0), &mut hw, &mut remote, &mut sink);
    assert!(remote.sent.is_empty());

    // Labels that never got through are retried once the link is back.
    remote.connected = true;
    app.tick(at(5), &mut hw, &mut remote, &mut sink);
    assert_eq!(remote.statuses(ActuatorId::Fan), vec![StatusLabel::AutoOn]);

    app.handle_command(AppCommand::LinkConnected, &mut sink);
    app.tick(at(6), &mut hw, &mut remote, &mut sink);
    assert_eq!(
        remote.statuses(ActuatorId::Fan),
        vec![StatusLabel::AutoOn, StatusLabel::AutoOn]
    );
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::LinkChanged { connected: true })),
        1
    );
}

#[test]
fn shutdown_releases_everything() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut remote = MockRemote::new();
    let mut sink = RecordingSink::new();

    hw.push_reading(26.0, 45.0);
    app.tick(at(0), &mut hw, &mut remote, &mut sink);
    app.shutdown(&mut hw, &mut remote, &mut sink);

    assert_eq!(hw.calls.last(), Some(&ActuatorCall::AllOff));
    assert!(!app.arbiter().is_commanded_on(ActuatorId::Fan));
    assert!(!app.arbiter().is_commanded_on(ActuatorId::Pump));
    assert_eq!(
        remote.sent.last(),
        Some(&Published::System(SYSTEM_OFFLINE.to_string()))
    );
    assert_eq!(sink.events.last(), Some(&AppEvent::Shutdown));
}

// ── Control loop ──────────────────────────────────────────────

struct StepClock(Cell<u64>);

impl ClockPort for StepClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.0.get())
    }
}

#[test]
fn loop_runs_until_stopped_then_shuts_down() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut remote = MockRemote::new();
    let mut sink = RecordingSink::new();
    let clock = StepClock(Cell::new(0));
    let stop = AtomicBool::new(false);

    hw.push_reading(26.0, 60.0);
    let mut inbox = vec![AppCommand::Override(OverrideCommand::force_on(ActuatorId::Pump))];
    let mut delays = Vec::new();

    let cycles = runner::run_until_stopped(
        &mut app,
        &mut hw,
        &clock,
        &mut remote,
        &mut sink,
        || inbox.pop(),
        |d| {
            delays.push(d);
            clock.0.set(clock.0.get() + d.as_millis() as u64);
            if delays.len() == 3 {
                stop.store(true, Ordering::Release);
            }
        },
        &stop,
    );

    assert_eq!(cycles, 3);
    assert_eq!(app.tick_count(), 3);
    assert!(delays.iter().all(|d| *d == Duration::from_millis(5_000)));
    // Fan: on at 0 s, window of 10 s expires on the third cycle.
    assert_eq!(hw.sets_for(ActuatorId::Fan), vec![true, false]);
    assert_eq!(hw.sets_for(ActuatorId::Pump), vec![true]);
    assert_eq!(hw.calls.last(), Some(&ActuatorCall::AllOff));
    assert_eq!(
        remote.sent.last(),
        Some(&Published::System(SYSTEM_OFFLINE.to_string()))
    );
}

#[test]
fn loop_does_nothing_when_already_stopped() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut remote = MockRemote::new();
    let mut sink = RecordingSink::new();
    let clock = StepClock(Cell::new(0));
    let stop = AtomicBool::new(true);

    let cycles = runner::run_until_stopped(
        &mut app,
        &mut hw,
        &clock,
        &mut remote,
        &mut sink,
        || None,
        |_| {},
        &stop,
    );
    assert_eq!(cycles, 0);
    assert_eq!(hw.calls, vec![ActuatorCall::AllOff]);
}
