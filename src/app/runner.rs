//! Control loop driver.
//!
//! Runs [`AppService`] cycles until a shutdown is requested, then performs
//! the orderly shutdown (relays off, "System Offline").  Everything
//! platform-specific (sleeping, feeding the watchdog, the command source)
//! is injected, so host tests can drive the same loop the firmware runs.
//!
//! ```text
//!  ┌─▶ drain commands ─▶ tick ─▶ pause(next_delay) ─┐
//!  └───────────────── while !stop ◀────────────────┘
//!                          │ stop
//!                          ▼
//!                  AppService::shutdown
//! ```

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use log::info;

use super::commands::AppCommand;
use super::ports::{ActuatorPort, ClockPort, EventSink, RemotePort, SensorPort};
use super::service::AppService;

/// Raised by any task to end the loop after the current cycle.
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

pub fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::Release);
}

pub fn shutdown_flag() -> &'static AtomicBool {
    &SHUTDOWN
}

/// Run cycles until `stop` is set, then shut down.  Returns the number of
/// cycles completed.
///
/// `next_command` is drained completely before every tick so all overrides
/// that arrived during the pause are applied in the same cycle.  `pause`
/// receives the delay chosen by the tick; it should return early if `stop`
/// is raised meanwhile.
#[allow(clippy::too_many_arguments)]
pub fn run_until_stopped(
    app: &mut AppService,
    hw: &mut (impl SensorPort + ActuatorPort),
    clock: &impl ClockPort,
    remote: &mut impl RemotePort,
    sink: &mut impl EventSink,
    mut next_command: impl FnMut() -> Option<AppCommand>,
    mut pause: impl FnMut(Duration),
    stop: &AtomicBool,
) -> u64 {
    let mut cycles = 0u64;
    while !stop.load(Ordering::Acquire) {
        while let Some(cmd) = next_command() {
            app.handle_command(cmd, sink);
        }
        let report = app.tick(clock.now(), hw, remote, sink);
        cycles += 1;
        pause(report.next_delay);
    }
    info!("shutdown requested after {} cycles", cycles);
    app.shutdown(hw, remote, sink);
    cycles
}
