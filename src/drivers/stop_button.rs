//! Long-press stop button.
//!
//! Active-low momentary switch on [`STOP_BUTTON_GPIO`](crate::pins::STOP_BUTTON_GPIO),
//! polled from the inter-cycle pause.  Holding it for [`HOLD_MS`] requests
//! the orderly shutdown: relays off and "System Offline" to the dashboard.
//! Short presses and contact bounce are ignored.

use super::hw_init;

/// Hold time that counts as a stop request.
pub const HOLD_MS: u64 = 3_000;

pub struct StopButton {
    gpio: i32,
    pressed_since: Option<u64>,
    fired: bool,
}

impl StopButton {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            pressed_since: None,
            fired: false,
        }
    }

    /// Sample the pin.  Returns `true` once per hold, when it reaches
    /// [`HOLD_MS`].
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let pressed = !hw_init::gpio_read(self.gpio);
        self.update(now_ms, pressed)
    }

    fn update(&mut self, now_ms: u64, pressed: bool) -> bool {
        if !pressed {
            self.pressed_since = None;
            self.fired = false;
            return false;
        }
        let since = *self.pressed_since.get_or_insert(now_ms);
        if !self.fired && now_ms.saturating_sub(since) >= HOLD_MS {
            self.fired = true;
            log::warn!("stop button held for {} ms", now_ms - since);
            return true;
        }
        false
    }
}
