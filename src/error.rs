//! Unified error types for the controller firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! the top-level control loop's error handling uniform.  All variants are
//! `Copy` so they can travel through events and logs without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The climate sensor could not be read.
    Sensor(SensorError),
    /// A relay or indicator output could not be driven.
    Actuator(ActuatorError),
    /// The remote dashboard channel failed.
    Remote(RemoteError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Remote(e) => write!(f, "remote: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The DHT11 never pulled the line low after the start signal.
    NoResponse,
    /// A bit or handshake phase took longer than the protocol allows.
    Timeout,
    /// The 40-bit frame's checksum byte did not match.
    ChecksumMismatch,
    /// Decoded values are outside the sensor's physical range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResponse => write!(f, "no response from sensor"),
            Self::Timeout => write!(f, "timed out reading sensor frame"),
            Self::ChecksumMismatch => write!(f, "frame checksum mismatch"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO level write was rejected by the driver (carries the IDF code).
    GpioWriteFailed(i32),
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed(rc) => write!(f, "GPIO write failed (rc={rc})"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Remote channel errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteError {
    /// No connection to the dashboard server.
    NotConnected,
    /// Connecting to the server failed.
    ConnectFailed,
    /// The socket failed mid-read or mid-write.
    Io,
    /// The outbound queue is full; the message was dropped.
    QueueFull,
    /// An inbound line was not a valid message.
    Malformed,
    /// A message was valid JSON but addressed an unknown virtual pin.
    UnknownPin(u8),
    /// An outbound message did not fit the line buffer.
    Oversized,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::ConnectFailed => write!(f, "connect failed"),
            Self::Io => write!(f, "socket I/O error"),
            Self::QueueFull => write!(f, "outbound queue full"),
            Self::Malformed => write!(f, "malformed message"),
            Self::UnknownPin(pin) => write!(f, "unknown virtual pin V{pin}"),
            Self::Oversized => write!(f, "message exceeds line buffer"),
        }
    }
}

impl From<RemoteError> for Error {
    fn from(e: RemoteError) -> Self {
        Self::Remote(e)
    }
}
