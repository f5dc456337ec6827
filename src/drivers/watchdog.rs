//! Task Watchdog Timer (TWDT) driver.
//!
//! Wraps the ESP-IDF TWDT API to reset the device if the control loop
//! stalls.  The timeout is derived from the configured cycle interval so
//! a slow cycle setting cannot trip it.
//!
//! The control loop must call `feed()` on every iteration.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use core::time::Duration;

#[cfg(target_os = "espidf")]
use log::info;

/// Headroom on top of the longest expected sleep between feeds.
const MARGIN: Duration = Duration::from_secs(5);

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    timeout: Duration,
}

impl Watchdog {
    /// Timeout that tolerates one full cycle sleep plus a sensor read.
    pub fn timeout_for(cycle_interval: Duration) -> Duration {
        cycle_interval * 2 + MARGIN
    }

    /// Initialise and subscribe the current task to the TWDT.
    pub fn new(timeout: Duration) -> Self {
        #[cfg(target_os = "espidf")]
        {
            let timeout_ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
            // SAFETY: TWDT calls are thread-safe; the config struct is on the stack.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK as esp_err_t {
                    log::warn!(
                        "TWDT reconfigure returned {} (may already be configured)",
                        ret
                    );
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK as esp_err_t;
                if subscribed {
                    info!("Watchdog: subscribed ({}ms timeout, panic on trigger)", timeout_ms);
                } else {
                    log::warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self { subscribed, timeout }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::info!("Watchdog(sim): no-op ({:?})", timeout);
            Self { timeout }
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Feed the watchdog.  Must be called at least once per timeout.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                // SAFETY: resets the calling task's TWDT entry.
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}
