//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the boundary the TCP link uses to make
//! sure the network is up before it dials the dashboard server.  Retry
//! pacing lives in the dashboard I/O task; this adapter makes exactly one
//! attempt per call.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::BlockingWifi` driver.
//! - **all other targets**: simulation stub for host-side tests.

use core::fmt;
use log::{info, warn};

use crate::config::WifiConfig;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

pub trait ConnectivityPort {
    /// Return immediately when associated, otherwise make one attempt.
    fn ensure_connected(&mut self) -> Result<(), ConnectivityError>;
    fn is_connected(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_credentials(creds: &WifiConfig) -> Result<(), ConnectivityError> {
    let ssid = creds.ssid.as_str();
    if ssid.is_empty() {
        return Err(ConnectivityError::NoCredentials);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    let password = creds.password.as_str();
    if !password.is_empty() && password.len() < 8 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    creds: WifiConfig,
    attempts: u32,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim_connected: bool,
    /// Simulation: number of attempts that fail before one succeeds.
    #[cfg(not(target_os = "espidf"))]
    sim_failures_left: u32,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: BlockingWifi<EspWifi<'static>>, creds: WifiConfig) -> Self {
        Self {
            creds,
            attempts: 0,
            wifi,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(creds: WifiConfig) -> Self {
        Self {
            creds,
            attempts: 0,
            sim_connected: false,
            sim_failures_left: 0,
        }
    }

    /// Simulation: fail the next `n` attempts.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_next(&mut self, n: u32) {
        self.sim_failures_left = n;
    }

    /// Simulation: drop the association.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop(&mut self) {
        self.sim_connected = false;
    }

    /// Connection attempts made since construction.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        let auth_method = if self.creds.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let client = ClientConfiguration {
            ssid: self
                .creds
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .creds
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        };
        let fail = |e: esp_idf_svc::sys::EspError| {
            warn!("WiFi: driver error {}", e);
            ConnectivityError::ConnectionFailed
        };
        self.wifi
            .set_configuration(&Configuration::Client(client))
            .map_err(fail)?;
        if !self.wifi.is_started().map_err(fail)? {
            self.wifi.start().map_err(fail)?;
        }
        self.wifi.connect().map_err(fail)?;
        self.wifi.wait_netif_up().map_err(fail)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        if self.sim_failures_left > 0 {
            self.sim_failures_left -= 1;
            return Err(ConnectivityError::ConnectionFailed);
        }
        self.sim_connected = true;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_connected
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn ensure_connected(&mut self) -> Result<(), ConnectivityError> {
        if self.platform_is_connected() {
            return Ok(());
        }
        validate_credentials(&self.creds)?;

        self.attempts = self.attempts.saturating_add(1);
        info!("WiFi: connecting to '{}' (attempt {})", self.creds.ssid, self.attempts);
        match self.platform_connect() {
            Ok(()) => {
                info!("WiFi: connected");
                Ok(())
            }
            Err(e) => {
                warn!("WiFi: connection failed: {}", e);
                Err(e)
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    fn creds(ssid: &str, password: &str) -> WifiConfig {
        let mut c = WifiConfig {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
        };
        c.ssid.push_str(ssid).unwrap();
        c.password.push_str(password).unwrap();
        c
    }

    #[test]
    fn rejects_empty_ssid() {
        let mut a = WifiAdapter::new(creds("", "password123"));
        assert_eq!(a.ensure_connected(), Err(ConnectivityError::NoCredentials));
        assert_eq!(a.attempts(), 0);
    }

    #[test]
    fn rejects_short_password() {
        assert_eq!(
            validate_credentials(&creds("MyNet", "short")),
            Err(ConnectivityError::InvalidPassword)
        );
    }

    #[test]
    fn accepts_open_network() {
        assert!(validate_credentials(&creds("OpenCafe", "")).is_ok());
    }

    #[test]
    fn retries_until_associated() {
        let mut a = WifiAdapter::new(creds("Farm", "mulberry88"));
        a.sim_fail_next(1);
        assert_eq!(a.ensure_connected(), Err(ConnectivityError::ConnectionFailed));
        assert!(a.ensure_connected().is_ok());
        assert!(a.is_connected());
        // Already up: no new attempt.
        a.ensure_connected().unwrap();
        assert_eq!(a.attempts(), 2);
    }

    #[test]
    fn reassociates_after_drop() {
        let mut a = WifiAdapter::new(creds("Farm", "mulberry88"));
        a.ensure_connected().unwrap();
        a.sim_drop();
        assert!(!a.is_connected());
        a.ensure_connected().unwrap();
        assert_eq!(a.attempts(), 2);
    }
}
