//! Link abstraction: any byte-oriented connection to the dashboard server.
//!
//! Concrete implementations:
//! - TCP socket over WiFi ([`crate::adapters::tcp_link::TcpLink`])
//! - [`NullLink`] for host runs without a server
//!
//! The I/O task is generic over `Link`, so swapping the transport needs
//! zero changes to the session logic.

use crate::error::RemoteError;

/// Byte-oriented client connection.
pub trait Link {
    /// Open the connection.  Called again after every failure.
    fn connect(&mut self) -> Result<(), RemoteError>;

    /// Read up to `buf.len()` bytes without blocking.
    /// Returns 0 if no data is available.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, RemoteError>;

    /// Write all of `data`.
    fn write_all(&mut self, data: &[u8]) -> Result<(), RemoteError>;

    /// Drop the connection.  Safe to call when already closed.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;
}

/// A link that always connects, discards all writes and never reads.
#[derive(Debug, Default)]
pub struct NullLink {
    connected: bool,
}

impl Link for NullLink {
    fn connect(&mut self) -> Result<(), RemoteError> {
        self.connected = true;
        Ok(())
    }

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, RemoteError> {
        if self.connected {
            Ok(0)
        } else {
            Err(RemoteError::NotConnected)
        }
    }

    fn write_all(&mut self, _data: &[u8]) -> Result<(), RemoteError> {
        if self.connected {
            Ok(())
        } else {
            Err(RemoteError::NotConnected)
        }
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
