//! TCP client link to the dashboard server.
//!
//! Implements [`Link`] over `std::net::TcpStream` (lwIP sockets on
//! ESP-IDF).  The socket is switched to non-blocking mode after connect so
//! the I/O task can poll it from its executor without stalling the write
//! side.  Before dialing, the link asks its [`ConnectivityPort`] to bring
//! the network up, so WiFi re-association rides on the session backoff.

use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use heapless::String;
use log::{info, warn};

use crate::adapters::wifi::ConnectivityPort;
use crate::error::RemoteError;
use crate::remote::link::Link;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const WRITE_TIMEOUT: Duration = Duration::from_secs(2);
const WRITE_RETRY_PAUSE: Duration = Duration::from_millis(1);

pub struct TcpLink<C: ConnectivityPort> {
    host: String<64>,
    port: u16,
    network: C,
    stream: Option<TcpStream>,
}

impl<C: ConnectivityPort> TcpLink<C> {
    pub fn new(host: String<64>, port: u16, network: C) -> Self {
        Self {
            host,
            port,
            network,
            stream: None,
        }
    }

    fn drop_stream(&mut self, why: &str) -> RemoteError {
        warn!("tcp: {}:{} {}", self.host, self.port, why);
        self.stream = None;
        RemoteError::Io
    }
}

impl<C: ConnectivityPort> Link for TcpLink<C> {
    fn connect(&mut self) -> Result<(), RemoteError> {
        self.stream = None;
        self.network
            .ensure_connected()
            .map_err(|_| RemoteError::ConnectFailed)?;

        let addr = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| {
                warn!("tcp: resolve {} failed: {}", self.host, e);
                RemoteError::ConnectFailed
            })?
            .next()
            .ok_or(RemoteError::ConnectFailed)?;

        let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).map_err(|e| {
            warn!("tcp: connect {} failed: {}", addr, e);
            RemoteError::ConnectFailed
        })?;
        stream
            .set_nonblocking(true)
            .map_err(|_| RemoteError::ConnectFailed)?;
        let _ = stream.set_nodelay(true);

        info!("tcp: connected to {}", addr);
        self.stream = Some(stream);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, RemoteError> {
        let stream = self.stream.as_mut().ok_or(RemoteError::NotConnected)?;
        match stream.read(buf) {
            // Orderly shutdown by the peer.
            Ok(0) => Err(self.drop_stream("closed by peer")),
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(0),
            Err(_) => Err(self.drop_stream("read failed")),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), RemoteError> {
        let stream = self.stream.as_mut().ok_or(RemoteError::NotConnected)?;
        let deadline = Instant::now() + WRITE_TIMEOUT;
        let mut sent = 0;
        while sent < data.len() {
            match stream.write(&data[sent..]) {
                Ok(0) => return Err(self.drop_stream("write returned 0")),
                Ok(n) => sent += n,
                Err(e)
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) =>
                {
                    if Instant::now() >= deadline {
                        return Err(self.drop_stream("write timed out"));
                    }
                    std::thread::sleep(WRITE_RETRY_PAUSE);
                }
                Err(_) => return Err(self.drop_stream("write failed")),
            }
        }
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(std::net::Shutdown::Both);
            info!("tcp: disconnected");
        }
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}
