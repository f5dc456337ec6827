//! DHT11 temperature / humidity sensor on a single-wire bus.
//!
//! ```text
//!  host   ‾‾‾\____18ms____/‾‾30µs‾‾
//!  sensor                          \__80µs__/‾‾80µs‾‾\  40 × (50µs low + 26µs|70µs high)
//! ```
//!
//! A high phase longer than [`ONE_THRESHOLD_US`] encodes a 1.  The 40-bit
//! frame is `RH int · RH dec · T int · T dec · checksum`, where the checksum
//! is the low byte of the sum of the first four.  Bit 7 of the temperature
//! decimal byte marks a negative temperature on newer parts.
//!
//! The sensor needs at least one second between conversions; reads inside
//! that window return the previous result.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs the data line (configured open-drain by hw_init).
//! On host/test: returns a frame injected through static atomics.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::control::ClimateReading;
use crate::drivers::hw_init;
use crate::error::SensorError;

/// Minimum spacing between physical conversions.
pub const MIN_READ_INTERVAL_US: u64 = 1_000_000;

/// High-phase width separating a 0 bit (~27 µs) from a 1 bit (~70 µs).
pub const ONE_THRESHOLD_US: u32 = 40;

const TEMP_RANGE_C: core::ops::RangeInclusive<f64> = -20.0..=60.0;

// ── Simulation hooks ─────────────────────────────────────────

/// 40-bit frame served on host builds, right-aligned.
#[cfg(not(target_os = "espidf"))]
static SIM_FRAME: AtomicU64 = AtomicU64::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_PRESENT: AtomicBool = AtomicBool::new(false);

/// Serve `frame` on the next physical read.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_frame(frame: [u8; 5]) {
    let mut raw = [0u8; 8];
    raw[3..].copy_from_slice(&frame);
    SIM_FRAME.store(u64::from_be_bytes(raw), Ordering::Relaxed);
    SIM_PRESENT.store(true, Ordering::Relaxed);
}

/// Serve a valid frame for the given whole-tenths values.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_climate(temperature_c: f64, humidity_percent: f64) {
    sim_set_frame(encode_frame(temperature_c, humidity_percent));
}

/// Make the simulated sensor stop answering.
#[cfg(not(target_os = "espidf"))]
pub fn sim_disconnect() {
    SIM_PRESENT.store(false, Ordering::Relaxed);
}

// ── Frame handling ───────────────────────────────────────────

/// Pack 40 measured high-phase widths into frame bytes, MSB first.
pub fn pulses_to_frame(high_us: &[u32; 40]) -> [u8; 5] {
    let mut frame = [0u8; 5];
    for (i, &width) in high_us.iter().enumerate() {
        if width > ONE_THRESHOLD_US {
            frame[i / 8] |= 0x80 >> (i % 8);
        }
    }
    frame
}

/// Validate and convert a raw frame.
pub fn decode_frame(frame: [u8; 5]) -> Result<ClimateReading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::ChecksumMismatch);
    }

    let humidity = f64::from(frame[0]) + f64::from(frame[1]) / 10.0;
    let magnitude = f64::from(frame[2]) + f64::from(frame[3] & 0x7F) / 10.0;
    let temperature = if frame[3] & 0x80 != 0 { -magnitude } else { magnitude };

    // An all-zero frame passes the checksum but means a dead sensor.
    if humidity <= 0.0 || humidity > 100.0 || !TEMP_RANGE_C.contains(&temperature) {
        return Err(SensorError::OutOfRange);
    }
    Ok(ClimateReading::new(temperature, humidity))
}

/// Build a frame for the given values (tenths precision).
pub fn encode_frame(temperature_c: f64, humidity_percent: f64) -> [u8; 5] {
    let h_tenths = (humidity_percent * 10.0).round().clamp(0.0, 2550.0) as u16;
    let t_tenths = (temperature_c.abs() * 10.0).round().clamp(0.0, 1270.0) as u16;
    let mut frame = [
        (h_tenths / 10) as u8,
        (h_tenths % 10) as u8,
        (t_tenths / 10) as u8,
        (t_tenths % 10) as u8,
        0,
    ];
    if temperature_c < 0.0 {
        frame[3] |= 0x80;
    }
    frame[4] = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    frame
}

// ── Driver ───────────────────────────────────────────────────

pub struct Dht11 {
    pin: i32,
    last_read_us: Option<u64>,
    last: Option<Result<ClimateReading, SensorError>>,
}

impl Dht11 {
    pub const fn new(pin: i32) -> Self {
        Self {
            pin,
            last_read_us: None,
            last: None,
        }
    }

    /// Read the sensor, or return the previous result if the last
    /// conversion was less than [`MIN_READ_INTERVAL_US`] ago.
    pub fn read(&mut self) -> Result<ClimateReading, SensorError> {
        let now = hw_init::micros();
        if let (Some(t), Some(last)) = (self.last_read_us, self.last) {
            if now.saturating_sub(t) < MIN_READ_INTERVAL_US {
                return last;
            }
        }
        let result = self.acquire().and_then(decode_frame);
        self.last_read_us = Some(now);
        self.last = Some(result);
        result
    }

    #[cfg(not(target_os = "espidf"))]
    fn acquire(&mut self) -> Result<[u8; 5], SensorError> {
        let _ = self.pin;
        if !SIM_PRESENT.load(Ordering::Relaxed) {
            return Err(SensorError::NoResponse);
        }
        let raw = SIM_FRAME.load(Ordering::Relaxed).to_be_bytes();
        let mut frame = [0u8; 5];
        frame.copy_from_slice(&raw[3..]);
        Ok(frame)
    }

    #[cfg(target_os = "espidf")]
    fn acquire(&mut self) -> Result<[u8; 5], SensorError> {
        let pin = self.pin;

        // Start signal: hold the line low for at least 18 ms.
        hw_init::gpio_write(pin, 0).map_err(|_| SensorError::NoResponse)?;
        std::thread::sleep(core::time::Duration::from_millis(20));

        // Timing-critical section: the whole frame takes ~5 ms.
        esp_idf_svc::hal::interrupt::free(|| {
            hw_init::gpio_write(pin, 1).map_err(|_| SensorError::NoResponse)?;
            hw_init::delay_us(30);

            wait_for(pin, false, 100).ok_or(SensorError::NoResponse)?;
            wait_for(pin, true, 100).ok_or(SensorError::Timeout)?;
            wait_for(pin, false, 100).ok_or(SensorError::Timeout)?;

            let mut highs = [0u32; 40];
            for width in &mut highs {
                wait_for(pin, true, 80).ok_or(SensorError::Timeout)?;
                *width = wait_for(pin, false, 100).ok_or(SensorError::Timeout)?;
            }
            Ok(pulses_to_frame(&highs))
        })
    }
}

/// Spin until the line reads `level`; returns how long that took.
#[cfg(target_os = "espidf")]
fn wait_for(pin: i32, level: bool, timeout_us: u32) -> Option<u32> {
    let start = hw_init::micros();
    loop {
        let elapsed = hw_init::micros().saturating_sub(start) as u32;
        if hw_init::gpio_read(pin) == level {
            return Some(elapsed);
        }
        if elapsed > timeout_us {
            return None;
        }
    }
}
