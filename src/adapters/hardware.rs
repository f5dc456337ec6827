//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the DHT11 driver and the three active-low outputs, exposing them
//! through [`SensorPort`] and [`ActuatorPort`].  This is the only module
//! in the system that touches actual hardware.  On non-espidf targets,
//! the underlying drivers use cfg-gated simulation stubs.
//!
//! Every exit path leaves the relays released: orderly shutdown calls
//! [`ActuatorPort::all_off`], dropping the adapter does the same, and
//! [`install_panic_hook`] covers panics.

use log::{info, warn};

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::control::{ActuatorId, ClimateReading};
use crate::drivers::hw_init;
use crate::drivers::output::ActiveLowOutput;
use crate::error::{ActuatorError, SensorError};
use crate::pins;
use crate::sensors::Dht11;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    sensor: Dht11,
    relays: [ActiveLowOutput; 2],
    indicator: ActiveLowOutput,
}

impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareAdapter {
    /// Build from the board pin map.  Call after
    /// [`hw_init::init_peripherals`].
    pub fn new() -> Self {
        Self {
            sensor: Dht11::new(pins::DHT11_DATA_GPIO),
            relays: [
                ActiveLowOutput::new(pins::FAN_RELAY_GPIO, "fan"),
                ActiveLowOutput::new(pins::PUMP_RELAY_GPIO, "pump"),
            ],
            indicator: ActiveLowOutput::new(pins::INDICATOR_LED_GPIO, "indicator"),
        }
    }

    pub fn is_relay_on(&self, actuator: ActuatorId) -> bool {
        self.relays[actuator.index()].is_on()
    }

    pub fn is_indicator_on(&self) -> bool {
        self.indicator.is_on()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        self.sensor.read()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_actuator(&mut self, actuator: ActuatorId, on: bool) -> Result<(), ActuatorError> {
        self.relays[actuator.index()].set(on)
    }

    fn set_indicator(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.indicator.set(on)
    }

    fn all_off(&mut self) {
        for relay in &mut self.relays {
            relay.force_off();
        }
        self.indicator.force_off();
        info!("hardware: fan, pump and indicator released");
    }
}

impl Drop for HardwareAdapter {
    fn drop(&mut self) {
        self.all_off();
    }
}

/// Release every output before the default panic handler runs.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        hw_init::force_outputs_inactive();
        warn!("panic: outputs forced inactive");
        previous(info);
    }));
}
