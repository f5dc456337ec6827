//! Active-low digital output (relay channel or indicator LED).
//!
//! Tracks the last level written so repeated requests for the same state
//! do not touch the pin.  The cached state is cleared when a write fails,
//! forcing the next request through.

use log::warn;

use crate::drivers::hw_init;
use crate::error::ActuatorError;
use crate::pins;

#[derive(Debug)]
pub struct ActiveLowOutput {
    pin: i32,
    name: &'static str,
    /// `None` until the first successful write.
    state: Option<bool>,
}

impl ActiveLowOutput {
    /// Wrap a pin already configured by [`hw_init::init_peripherals`].
    pub const fn new(pin: i32, name: &'static str) -> Self {
        Self {
            pin,
            name,
            state: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last state successfully written.
    pub fn is_on(&self) -> bool {
        self.state == Some(true)
    }

    /// Energise (`true`) or release the output.  A no-op when already there.
    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        if self.state == Some(on) {
            return Ok(());
        }
        match hw_init::gpio_write(self.pin, pins::output_level(on)) {
            Ok(()) => {
                self.state = Some(on);
                Ok(())
            }
            Err(rc) => {
                self.state = None;
                Err(ActuatorError::GpioWriteFailed(rc))
            }
        }
    }

    /// Unconditionally drive the inactive level.
    pub fn force_off(&mut self) {
        match hw_init::gpio_write(self.pin, pins::OUTPUT_INACTIVE_LEVEL) {
            Ok(()) => self.state = Some(false),
            Err(rc) => {
                warn!("{}: forced off failed (rc={})", self.name, rc);
                self.state = None;
            }
        }
    }
}
