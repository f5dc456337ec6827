//! One-shot GPIO initialisation and raw pin helpers.
//!
//! Configures the relay and indicator outputs (driven to their inactive
//! level before the output stage is enabled), the DHT11 data line as an
//! open-drain input/output and the stop button as a pulled-up input.  Called once from `main()` before the control
//! loop starts.
//!
//! On non-ESP targets the pins are simulated with atomics so adapters and
//! drivers can be exercised from host tests.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(e: HwInitError) -> Self {
        match e {
            HwInitError::GpioConfigFailed(_) => Self::Init("GPIO configuration failed"),
        }
    }
}

// ── Init ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_gpio_outputs()?;
        init_dht_line()?;
        init_stop_button()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    for pin in pins::OUTPUT_PINS {
        sim::store(pin, pins::OUTPUT_INACTIVE_LEVEL);
    }
    log::info!("hw_init(sim): outputs parked inactive");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    for pin in pins::OUTPUT_PINS {
        // Latch the inactive level first so enabling the driver cannot
        // momentarily energise an active-low relay.
        unsafe { gpio_set_level(pin, pins::OUTPUT_INACTIVE_LEVEL) };
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as esp_err_t {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        unsafe { gpio_set_level(pin, pins::OUTPUT_INACTIVE_LEVEL) };
    }
    info!("hw_init: relay + indicator outputs configured (inactive)");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_dht_line() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::DHT11_DATA_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT_OUTPUT_OD,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as esp_err_t {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    // Released line idles high through the pull-up.
    unsafe { gpio_set_level(pins::DHT11_DATA_GPIO, 1) };
    info!("hw_init: DHT11 line configured (open-drain)");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_stop_button() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::STOP_BUTTON_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as esp_err_t {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    info!("hw_init: stop button configured (pull-up)");
    Ok(())
}

// ── Pin access ────────────────────────────────────────────────

/// Drive `pin` to `level`.  Returns the IDF error code on failure.
#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, level: u32) -> Result<(), i32> {
    // SAFETY: pin was configured as an output in init_peripherals().
    let ret = unsafe { gpio_set_level(pin, level) };
    if ret == ESP_OK as esp_err_t { Ok(()) } else { Err(ret) }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, level: u32) -> Result<(), i32> {
    if sim::write_fault() {
        return Err(-1);
    }
    sim::store(pin, level);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: read-only register access on a configured pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    sim::load(pin) != 0
}

/// Busy-wait for `us` microseconds.
#[cfg(target_os = "espidf")]
pub fn delay_us(us: u32) {
    // SAFETY: ROM busy-wait, no shared state.
    unsafe { esp_rom_delay_us(us) };
}

#[cfg(not(target_os = "espidf"))]
pub fn delay_us(us: u32) {
    std::thread::sleep(std::time::Duration::from_micros(u64::from(us)));
}

/// Microseconds since boot.
#[cfg(target_os = "espidf")]
pub fn micros() -> u64 {
    // SAFETY: esp_timer_get_time reads a free-running counter.
    (unsafe { esp_timer_get_time() }).max(0) as u64
}

#[cfg(not(target_os = "espidf"))]
pub fn micros() -> u64 {
    sim::micros()
}

/// Drive every relay and indicator pin to its inactive level, ignoring
/// errors.  Safe to call from the panic hook.
pub fn force_outputs_inactive() {
    for pin in pins::OUTPUT_PINS {
        let _ = gpio_write(pin, pins::OUTPUT_INACTIVE_LEVEL);
    }
}

// ── Simulation ───────────────────────────────────────────────

/// Host-side pin model shared by drivers, adapters and tests.
#[cfg(not(target_os = "espidf"))]
pub mod sim {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::{Mutex, MutexGuard, OnceLock};
    use std::time::Instant;

    const PIN_COUNT: usize = 49;

    static LEVELS: [AtomicU32; PIN_COUNT] = [const { AtomicU32::new(1) }; PIN_COUNT];
    static WRITE_FAULT: AtomicBool = AtomicBool::new(false);
    static SERIAL: Mutex<()> = Mutex::new(());

    pub(super) fn store(pin: i32, level: u32) {
        if let Some(slot) = LEVELS.get(pin as usize) {
            slot.store(level, Ordering::SeqCst);
        }
    }

    pub(super) fn load(pin: i32) -> u32 {
        LEVELS
            .get(pin as usize)
            .map_or(1, |slot| slot.load(Ordering::SeqCst))
    }

    pub(super) fn write_fault() -> bool {
        WRITE_FAULT.load(Ordering::SeqCst)
    }

    pub(super) fn micros() -> u64 {
        static START: OnceLock<Instant> = OnceLock::new();
        START.get_or_init(Instant::now).elapsed().as_micros() as u64
    }

    /// Current level of a simulated pin.
    pub fn level(pin: i32) -> u32 {
        load(pin)
    }

    /// Drive an input pin from a test, as the outside world would.
    pub fn set_level(pin: i32, level: u32) {
        store(pin, level);
    }

    /// Make every subsequent `gpio_write` fail until cleared.
    pub fn set_write_fault(fail: bool) {
        WRITE_FAULT.store(fail, Ordering::SeqCst);
    }

    /// Serialise tests that touch the shared pin model.  Resets pins and
    /// fault injection on acquisition.
    pub fn lock() -> MutexGuard<'static, ()> {
        let guard = SERIAL.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        set_write_fault(false);
        for slot in &LEVELS {
            slot.store(1, Ordering::SeqCst);
        }
        guard
    }
}
