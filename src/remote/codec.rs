//! Newline-delimited line codec.
//!
//! Wire format: one JSON object per line, `\n` terminated (a trailing
//! `\r` is tolerated).
//!
//! The decoder accumulates incoming bytes and yields complete lines.  A
//! single socket read may carry part of a line or several lines at once.
//! A line longer than [`MAX_LINE_LEN`] is discarded up to its terminator
//! so one bad message cannot desynchronise the stream.

use heapless::Vec;

/// Longest accepted line, excluding the terminator.
pub const MAX_LINE_LEN: usize = 256;

/// One encoded outbound line, terminator included.
pub type Line = Vec<u8, { MAX_LINE_LEN + 1 }>;

/// Streaming line decoder.
pub struct LineDecoder {
    buf: Vec<u8, MAX_LINE_LEN>,
    /// Set while skipping the remainder of an oversized line.
    discarding: bool,
    dropped: u32,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDecoder {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            discarding: false,
            dropped: 0,
        }
    }

    /// Feed bytes into the decoder, calling `on_line` once per complete,
    /// non-empty line (terminator stripped).
    pub fn feed(&mut self, data: &[u8], mut on_line: impl FnMut(&[u8])) {
        for &b in data {
            if b == b'\n' {
                if self.discarding {
                    self.discarding = false;
                } else {
                    let line = match self.buf.last() {
                        Some(b'\r') => &self.buf[..self.buf.len() - 1],
                        _ => &self.buf[..],
                    };
                    if !line.is_empty() {
                        on_line(line);
                    }
                }
                self.buf.clear();
                continue;
            }
            if self.discarding {
                continue;
            }
            if self.buf.push(b).is_err() {
                self.buf.clear();
                self.discarding = true;
                self.dropped = self.dropped.saturating_add(1);
            }
        }
    }

    /// Oversized lines thrown away since construction.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Reset decoder state (e.g. after a reconnect).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }
}
