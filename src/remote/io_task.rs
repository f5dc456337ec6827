//! Async dashboard I/O task: one client session at a time.
//!
//! Runs in a dedicated thread using `edge-executor` for cooperative
//! scheduling and `async-io-mini` for reactor-driven timers.  Each
//! session races two futures; whichever fails first ends the session:
//!
//! 1. **Read**: polls the link every 20 ms, decodes lines and merges
//!    overrides into the shared mailbox ([`channels::push_override`])
//! 2. **Write**: wakes on `OUTBOUND_CHANNEL.receive().await`
//!
//! ```text
//!   connect ─▶ hello · "System Online" · sync V4/V5 ─▶ session_opened
//!      ▲                                                    │
//!      │ backoff 2s → 4s → … → max             read ∥ write │
//!      └────────────── link down ◀──────── first error ◀────┘
//! ```

use core::cell::RefCell;
use core::time::Duration;
use std::rc::Rc;

use heapless::String;
use log::{info, warn};

use super::channels::{self, OUTBOUND_CHANNEL};
use super::codec::LineDecoder;
use super::link::Link;
use super::message::{decode_inbound, encode_line, Inbound, WireMessage};
use super::vpin::VirtualPin;
use crate::config::RemoteConfig;
use crate::drivers::task_pin::{self, Core};
use crate::error::RemoteError;

/// V6 text sent at the start of every session.
pub const SYSTEM_ONLINE: &str = "System Online";

const READ_BUF_SIZE: usize = 256;
const READ_POLL: Duration = Duration::from_millis(20);
const INITIAL_BACKOFF_SECS: u32 = 2;

pub type SharedLink<L> = Rc<RefCell<L>>;

// ── Reconnect backoff ────────────────────────────────────────

/// Exponential reconnect delay: 2 s doubling up to a cap.
#[derive(Debug, Clone)]
pub struct Backoff {
    current_secs: u32,
    max_secs: u32,
}

impl Backoff {
    pub fn new(max_secs: u32) -> Self {
        Self {
            current_secs: INITIAL_BACKOFF_SECS,
            max_secs: max_secs.max(INITIAL_BACKOFF_SECS),
        }
    }

    /// Delay to wait now; doubles the next one.
    pub fn next_delay(&mut self) -> Duration {
        let d = Duration::from_secs(u64::from(self.current_secs));
        self.current_secs = self.current_secs.saturating_mul(2).min(self.max_secs);
        d
    }

    pub fn reset(&mut self) {
        self.current_secs = INITIAL_BACKOFF_SECS;
    }
}

// ── Line handling ────────────────────────────────────────────

fn dispatch_line(line: &[u8]) {
    match decode_inbound(line) {
        Ok(Inbound::Override(cmd)) => {
            info!("IO: override {} -> {:?}", cmd.actuator, cmd.intent);
            channels::push_override(cmd);
        }
        Ok(Inbound::Ignored) => {}
        Err(e) => warn!("IO: dropping inbound line: {}", e),
    }
}

fn greet(link: &mut impl Link, token: &String<64>) -> Result<(), RemoteError> {
    let hello = WireMessage::hello(token);
    let online = WireMessage::write_text(VirtualPin::SystemStatus, SYSTEM_ONLINE)?;
    let sync = WireMessage::sync(&VirtualPin::SYNC_ON_CONNECT)?;
    for msg in [hello, online, sync] {
        link.write_all(&encode_line(&msg)?)?;
    }
    Ok(())
}

// ── Session futures ──────────────────────────────────────────

async fn read_loop<L: Link>(link: SharedLink<L>) -> RemoteError {
    let mut decoder = LineDecoder::new();
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        let result = link.borrow_mut().read(&mut buf);
        match result {
            Ok(0) => {}
            Ok(n) => decoder.feed(&buf[..n], dispatch_line),
            Err(e) => return e,
        }
        async_io_mini::Timer::after(READ_POLL).await;
    }
}

async fn write_loop<L: Link>(link: SharedLink<L>) -> RemoteError {
    loop {
        let line = OUTBOUND_CHANNEL.receive().await;
        if let Err(e) = link.borrow_mut().write_all(&line) {
            return e;
        }
    }
}

/// Connect, greet and serve one session until the link fails.
///
/// Returns the error that ended the session, or the connect/greet error.
pub async fn run_session<L: Link>(link: &SharedLink<L>, token: &String<64>) -> RemoteError {
    let opened = {
        let mut l = link.borrow_mut();
        l.connect().and_then(|()| greet(&mut *l, token))
    };
    if let Err(e) = opened {
        link.borrow_mut().disconnect();
        return e;
    }

    channels::session_opened();
    info!("IO: session established");

    let err = futures_lite::future::or(read_loop(link.clone()), write_loop(link.clone())).await;

    link.borrow_mut().disconnect();
    channels::set_link_up(false);
    let stale = channels::discard_outbound();
    if stale > 0 {
        info!("IO: discarded {} queued lines", stale);
    }
    err
}

async fn session_loop<L: Link>(link: SharedLink<L>, cfg: RemoteConfig) {
    let mut backoff = Backoff::new(cfg.max_backoff_secs);
    loop {
        let was_up = {
            let err = run_session(&link, &cfg.auth_token).await;
            warn!("IO: {}:{} session ended: {}", cfg.host, cfg.port, err);
            err != RemoteError::ConnectFailed
        };
        if was_up {
            backoff.reset();
        }
        let delay = backoff.next_delay();
        info!("IO: reconnecting in {}s", delay.as_secs());
        async_io_mini::Timer::after(delay).await;
    }
}

/// Entry point for the I/O thread.
fn run_io_loop<L: Link + 'static>(link: L, cfg: RemoteConfig) {
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
    let link: SharedLink<L> = Rc::new(RefCell::new(link));

    executor.spawn(session_loop(link, cfg)).detach();

    info!("IO task started");
    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
}

// ── Thread spawn ─────────────────────────────────────────────

/// Spawn the I/O task on Core 0 (PRO_CPU), next to lwIP.
pub fn spawn<L: Link + Send + 'static>(link: L, cfg: RemoteConfig) -> std::thread::JoinHandle<()> {
    task_pin::spawn_on_core(task_pin::TaskSpec {
        core: Core::Pro,
        priority: 5,
        stack_kb: 12,
        name: "remote-io\0",
    }, move || run_io_loop(link, cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_to_cap_and_resets() {
        let mut b = Backoff::new(10);
        let secs: std::vec::Vec<u64> = (0..5).map(|_| b.next_delay().as_secs()).collect();
        assert_eq!(secs, vec![2, 4, 8, 10, 10]);
        b.reset();
        assert_eq!(b.next_delay(), Duration::from_secs(2));
    }

    #[test]
    fn greet_sends_hello_online_and_sync() {
        #[derive(Default)]
        struct Capture(std::vec::Vec<u8>);
        impl Link for Capture {
            fn connect(&mut self) -> Result<(), RemoteError> {
                Ok(())
            }
            fn read(&mut self, _: &mut [u8]) -> Result<usize, RemoteError> {
                Ok(0)
            }
            fn write_all(&mut self, data: &[u8]) -> Result<(), RemoteError> {
                self.0.extend_from_slice(data);
                Ok(())
            }
            fn disconnect(&mut self) {}
            fn is_connected(&self) -> bool {
                true
            }
        }

        let mut link = Capture::default();
        let mut token = String::new();
        token.push_str("abc").unwrap();
        greet(&mut link, &token).unwrap();
        let text = std::string::String::from_utf8(link.0).unwrap();
        let lines: std::vec::Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], r#"{"type":"hello","token":"abc"}"#);
        assert_eq!(lines[1], r#"{"type":"write","pin":6,"value":"System Online"}"#);
        assert_eq!(lines[2], r#"{"type":"sync","pins":[4,5]}"#);
    }
}
