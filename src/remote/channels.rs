//! Inter-task communication channels.
//!
//! Bridges the async I/O task with the synchronous control loop without
//! heap allocation.  Outbound lines use an `embassy-sync` bounded channel.
//! Inbound overrides go through a critical-section [`OverrideMailbox`], which
//! merges instead of dropping, and link events are two atomics, so nothing
//! the operator sends can crowd out a reconnect.
//!
//! ```text
//! ┌──────────────┐ OverrideMailbox ┌──────────────┐
//! │   I/O Task   │ SESSIONS/LINK_UP│ Control Loop │
//! │  (async)     │────────────────▶│  (sync)      │
//! │              │◀────────────────│ CommandInbox │
//! └──────────────┘  OUTBOUND (Line)└──────────────┘
//! ```

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Deque;

use super::codec::Line;
use crate::app::commands::AppCommand;
use crate::control::mailbox::Replay;
use crate::control::{OverrideCommand, OverrideMailbox};
use crate::error::RemoteError;

/// Channel depth for outbound lines.
pub const OUTBOUND_DEPTH: usize = 16;

/// Outbound channel: control loop → I/O task.
pub static OUTBOUND_CHANNEL: Channel<CriticalSectionRawMutex, Line, OUTBOUND_DEPTH> =
    Channel::new();

/// Overrides received since the control loop last looked.
static OVERRIDES: Mutex<CriticalSectionRawMutex, RefCell<OverrideMailbox>> =
    Mutex::new(RefCell::new(OverrideMailbox::new()));

/// Whether a session with the server is established.
static LINK_UP: AtomicBool = AtomicBool::new(false);

/// Sessions established since boot.
static SESSIONS: AtomicU32 = AtomicU32::new(0);

// ── I/O task side ────────────────────────────────────────────

pub fn set_link_up(up: bool) {
    LINK_UP.store(up, Ordering::Release);
}

/// Mark a new session as established.
pub fn session_opened() {
    set_link_up(true);
    SESSIONS.fetch_add(1, Ordering::AcqRel);
}

/// Hand an override to the control loop.
pub fn push_override(cmd: OverrideCommand) {
    OVERRIDES.lock(|m| m.borrow_mut().push(cmd));
}

/// Throw away lines queued for a session that no longer exists.
pub fn discard_outbound() -> usize {
    let mut n = 0;
    while OUTBOUND_CHANNEL.try_receive().is_ok() {
        n += 1;
    }
    n
}

// ── Control loop side ────────────────────────────────────────

pub fn link_is_up() -> bool {
    LINK_UP.load(Ordering::Acquire)
}

/// Queue a line for the server.
pub fn send_line(line: Line) -> Result<(), RemoteError> {
    if !link_is_up() {
        return Err(RemoteError::NotConnected);
    }
    OUTBOUND_CHANNEL
        .try_send(line)
        .map_err(|_| RemoteError::QueueFull)
}

fn take_overrides() -> Replay {
    OVERRIDES.lock(|m| m.borrow_mut().take())
}

/// Control loop view of everything the I/O task has reported.
///
/// Link events come first so a reconnect is seen before the overrides
/// that arrived on the new session.
pub struct CommandInbox {
    sessions_seen: u32,
    reported_up: bool,
    replay: Deque<OverrideCommand, 4>,
}

impl CommandInbox {
    /// Start observing.  Sessions opened before this call are not reported.
    pub fn new() -> Self {
        Self {
            sessions_seen: SESSIONS.load(Ordering::Acquire),
            reported_up: link_is_up(),
            replay: Deque::new(),
        }
    }

    /// Next command for the control loop, `None` once everything is drained.
    pub fn next_command(&mut self) -> Option<AppCommand> {
        let sessions = SESSIONS.load(Ordering::Acquire);
        if sessions != self.sessions_seen {
            self.sessions_seen = sessions;
            self.reported_up = true;
            return Some(AppCommand::LinkConnected);
        }
        if self.reported_up && !link_is_up() {
            self.reported_up = false;
            return Some(AppCommand::LinkDisconnected);
        }
        if self.replay.is_empty() {
            for cmd in take_overrides() {
                // Same capacity as `Replay`.
                let _ = self.replay.push_back(cmd);
            }
        }
        self.replay.pop_front().map(AppCommand::Override)
    }
}

impl Default for CommandInbox {
    fn default() -> Self {
        Self::new()
    }
}
