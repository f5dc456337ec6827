//! System configuration parameters
//!
//! Everything here is fixed for the lifetime of the process: it is loaded
//! from NVS (or defaulted) once at boot and never changed at runtime.

use core::time::Duration;

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::control::Thresholds;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Thresholds ---
    /// Fan auto-trigger: temperature above this (°C)
    pub max_temperature_c: f64,
    /// Pump auto-trigger: humidity below this (%)
    pub min_humidity_percent: f64,
    /// How long an auto-triggered actuator stays on (seconds)
    pub run_duration_secs: u32,

    // --- Timing ---
    /// Control cycle period (milliseconds)
    pub cycle_interval_ms: u32,
    /// Delay before the next cycle after a failed sensor read (milliseconds)
    pub sensor_retry_interval_ms: u32,

    // --- Connectivity ---
    pub wifi: WifiConfig,
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WifiConfig {
    pub ssid: String<32>,
    /// Empty for an open network
    pub password: String<64>,
}

/// Dashboard server endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub host: String<64>,
    pub port: u16,
    /// Device auth token sent in the hello message
    pub auth_token: String<64>,
    /// Upper bound for the reconnect backoff (seconds)
    pub max_backoff_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            max_temperature_c: 25.0,
            min_humidity_percent: 50.0,
            run_duration_secs: 10,

            cycle_interval_ms: 5_000,
            sensor_retry_interval_ms: 2_000,

            wifi: WifiConfig {
                ssid: String::new(),
                password: String::new(),
            },
            remote: RemoteConfig::default(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        let mut host = String::new();
        // Fits: 18 bytes into a 64-byte buffer.
        let _ = host.push_str("dashboard.local");
        Self {
            host,
            port: 8080,
            auth_token: String::new(),
            max_backoff_secs: 60,
        }
    }
}

impl SystemConfig {
    pub fn run_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.run_duration_secs))
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.cycle_interval_ms))
    }

    pub fn sensor_retry_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.sensor_retry_interval_ms))
    }

    /// Engine view of the thresholds.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            max_temperature_c: self.max_temperature_c,
            min_humidity_percent: self.min_humidity_percent,
            run_duration: self.run_duration(),
        }
    }

    /// Range-check every field.  Out-of-range values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=50.0).contains(&self.max_temperature_c) {
            return Err(ConfigError::ValidationFailed(
                "max_temperature_c must be 0.0–50.0",
            ));
        }
        if !(5.0..=95.0).contains(&self.min_humidity_percent) {
            return Err(ConfigError::ValidationFailed(
                "min_humidity_percent must be 5.0–95.0",
            ));
        }
        if !(1..=3600).contains(&self.run_duration_secs) {
            return Err(ConfigError::ValidationFailed(
                "run_duration_secs must be 1–3600",
            ));
        }
        // DHT11 cannot be sampled faster than once per second.
        if !(1_000..=600_000).contains(&self.cycle_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "cycle_interval_ms must be 1000–600000",
            ));
        }
        if self.sensor_retry_interval_ms < 1_000
            || self.sensor_retry_interval_ms > self.cycle_interval_ms
        {
            return Err(ConfigError::ValidationFailed(
                "sensor_retry_interval_ms must be 1000..=cycle_interval_ms",
            ));
        }
        if !self.wifi.password.is_empty() && self.wifi.password.len() < 8 {
            return Err(ConfigError::ValidationFailed(
                "wifi.password must be empty or at least 8 bytes",
            ));
        }
        if self.remote.port == 0 {
            return Err(ConfigError::ValidationFailed("remote.port must be non-zero"));
        }
        if !(2..=3600).contains(&self.remote.max_backoff_secs) {
            return Err(ConfigError::ValidationFailed(
                "remote.max_backoff_secs must be 2–3600",
            ));
        }
        Ok(())
    }
}
