//! Dashboard session tests: scripted link → I/O session → command inbox,
//! and control loop → publisher → outbound channel.
//!
//! The channels are process-wide statics, so every test here holds
//! [`CHANNELS`] for its whole duration.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard};

use heapless::String;

use sericulture::app::commands::AppCommand;
use sericulture::app::ports::RemotePort;
use sericulture::control::{ActuatorId, ClimateReading, OverrideCommand, StatusLabel};
use sericulture::error::RemoteError;
use sericulture::remote::channels::{self, CommandInbox, OUTBOUND_CHANNEL};
use sericulture::remote::codec::Line;
use sericulture::remote::io_task::{self, SharedLink};
use sericulture::remote::link::Link;
use sericulture::remote::publisher::ChannelPublisher;

static CHANNELS: Mutex<()> = Mutex::new(());

fn exclusive() -> MutexGuard<'static, ()> {
    let guard = CHANNELS.lock().unwrap_or_else(|e| e.into_inner());
    channels::set_link_up(false);
    channels::discard_outbound();
    let mut stale = CommandInbox::new();
    while stale.next_command().is_some() {}
    guard
}

fn drain_commands(inbox: &mut CommandInbox) -> Vec<AppCommand> {
    std::iter::from_fn(|| inbox.next_command()).collect()
}

fn line_text(line: &Line) -> &str {
    core::str::from_utf8(line).unwrap()
}

// ── Scripted link ─────────────────────────────────────────────

/// Serves scripted chunks, then fails the next read to end the session.
struct ScriptLink {
    inbound: VecDeque<Vec<u8>>,
    written: Vec<u8>,
    connected: bool,
    refuse: bool,
}

impl ScriptLink {
    fn new(chunks: &[&[u8]]) -> Self {
        Self {
            inbound: chunks.iter().map(|c| c.to_vec()).collect(),
            written: Vec::new(),
            connected: false,
            refuse: false,
        }
    }

    fn written_lines(&self) -> Vec<std::string::String> {
        std::string::String::from_utf8_lossy(&self.written)
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

impl Link for ScriptLink {
    fn connect(&mut self) -> Result<(), RemoteError> {
        if self.refuse {
            return Err(RemoteError::ConnectFailed);
        }
        self.connected = true;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, RemoteError> {
        match self.inbound.pop_front() {
            Some(chunk) => {
                buf[..chunk.len()].copy_from_slice(&chunk);
                Ok(chunk.len())
            }
            None => Err(RemoteError::Io),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), RemoteError> {
        self.written.extend_from_slice(data);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

fn token() -> String<64> {
    let mut t = String::new();
    t.push_str("abc123").unwrap();
    t
}

// ── Session ───────────────────────────────────────────────────

#[test]
fn session_greets_and_forwards_overrides() {
    let _g = exclusive();
    let mut inbox = CommandInbox::new();
    let link: SharedLink<ScriptLink> = Rc::new(RefCell::new(ScriptLink::new(&[
        b"{\"type\":\"write\",\"pin\":5,\"va",
        b"lue\":1}\n{\"type\":\"ping\"}\r\n",
        b"not json\n{\"type\":\"write\",\"pin\":4,\"value\":0}\n",
        b"{\"type\":\"write\",\"pin\":5,\"value\":\"auto\"}\n",
    ])));

    let err = futures_lite::future::block_on(io_task::run_session(&link, &token()));
    assert_eq!(err, RemoteError::Io);

    let lines = link.borrow().written_lines();
    assert_eq!(
        lines,
        vec![
            r#"{"type":"hello","token":"abc123"}"#,
            r#"{"type":"write","pin":6,"value":"System Online"}"#,
            r#"{"type":"sync","pins":[4,5]}"#,
        ]
    );
    assert!(!link.borrow().is_connected());
    assert!(!channels::link_is_up());

    // Pump was forced then released: replayed as a force followed by the
    // release so any auto window is still cancelled.
    assert_eq!(
        drain_commands(&mut inbox),
        vec![
            AppCommand::LinkConnected,
            AppCommand::LinkDisconnected,
            AppCommand::Override(OverrideCommand::force_off(ActuatorId::Fan)),
            AppCommand::Override(OverrideCommand::force_off(ActuatorId::Pump)),
            AppCommand::Override(OverrideCommand::release(ActuatorId::Pump)),
        ]
    );
}

#[test]
fn override_burst_keeps_final_command_and_link_event() {
    let _g = exclusive();
    let mut inbox = CommandInbox::new();
    let mut burst = Vec::new();
    for _ in 0..40 {
        burst.extend_from_slice(b"{\"type\":\"write\",\"pin\":5,\"value\":0}\n");
    }
    burst.extend_from_slice(b"{\"type\":\"write\",\"pin\":5,\"value\":1}\n");
    let chunks: Vec<&[u8]> = burst.chunks(200).collect();
    let link = Rc::new(RefCell::new(ScriptLink::new(&chunks)));

    let err = futures_lite::future::block_on(io_task::run_session(&link, &token()));
    assert_eq!(err, RemoteError::Io);

    assert_eq!(
        drain_commands(&mut inbox),
        vec![
            AppCommand::LinkConnected,
            AppCommand::LinkDisconnected,
            AppCommand::Override(OverrideCommand::force_on(ActuatorId::Pump)),
        ]
    );
}

#[test]
fn reconnect_is_reported_while_link_is_up() {
    let _g = exclusive();
    let mut inbox = CommandInbox::new();
    channels::session_opened();
    channels::push_override(OverrideCommand::force_on(ActuatorId::Fan));
    assert_eq!(inbox.next_command(), Some(AppCommand::LinkConnected));
    assert_eq!(
        inbox.next_command(),
        Some(AppCommand::Override(OverrideCommand::force_on(ActuatorId::Fan)))
    );
    assert_eq!(inbox.next_command(), None);

    channels::set_link_up(false);
    assert_eq!(inbox.next_command(), Some(AppCommand::LinkDisconnected));
    assert_eq!(inbox.next_command(), None);
}

#[test]
fn refused_connection_reports_without_link_events() {
    let _g = exclusive();
    let mut script = ScriptLink::new(&[]);
    script.refuse = true;
    let link = Rc::new(RefCell::new(script));
    let mut inbox = CommandInbox::new();

    let err = futures_lite::future::block_on(io_task::run_session(&link, &token()));
    assert_eq!(err, RemoteError::ConnectFailed);
    assert!(link.borrow().written.is_empty());
    assert!(drain_commands(&mut inbox).is_empty());
}

// ── Publisher ─────────────────────────────────────────────────

#[test]
fn publisher_fails_fast_while_link_down() {
    let _g = exclusive();
    let mut publisher = ChannelPublisher::new();
    assert_eq!(
        publisher.publish_status(ActuatorId::Fan, StatusLabel::AutoOn),
        Err(RemoteError::NotConnected)
    );
    assert!(OUTBOUND_CHANNEL.is_empty());
}

#[test]
fn publisher_queues_dashboard_lines() {
    let _g = exclusive();
    channels::set_link_up(true);
    let mut publisher = ChannelPublisher::new();

    publisher
        .publish_telemetry(&ClimateReading::new(26.44, 47.96))
        .unwrap();
    publisher
        .publish_status(ActuatorId::Pump, StatusLabel::ManualOn)
        .unwrap();

    let queued: Vec<_> = std::iter::from_fn(|| OUTBOUND_CHANNEL.try_receive().ok()).collect();
    let texts: Vec<&str> = queued.iter().map(line_text).collect();
    assert_eq!(
        texts,
        vec![
            "{\"type\":\"write\",\"pin\":0,\"value\":26.4}\n",
            "{\"type\":\"write\",\"pin\":1,\"value\":48.0}\n",
            "{\"type\":\"write\",\"pin\":3,\"value\":\"MANUAL ON\"}\n",
        ]
    );
    channels::set_link_up(false);
}
