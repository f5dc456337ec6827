//! JSON line messages exchanged with the dashboard server.
//!
//! ```text
//!  device → server   {"type":"hello","token":"…"}
//!                    {"type":"write","pin":0,"value":24.5}
//!                    {"type":"write","pin":2,"value":"AUTO ON"}
//!                    {"type":"sync","pins":[4,5]}
//!  server → device   {"type":"write","pin":4,"value":1}
//!                    {"type":"ping"}
//! ```
//!
//! Switch values arrive as numbers or numeric strings depending on the
//! widget; `1` forces ON, `0` forces OFF and `-1` or `"auto"` hands the
//! actuator back to automatic control.  Any other value is rejected so a
//! garbled write cannot lift a manual OFF.

use core::fmt;

use heapless::{String, Vec};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::codec::{Line, MAX_LINE_LEN};
use super::vpin::VirtualPin;
use crate::control::OverrideCommand;
use crate::error::RemoteError;

/// Longest text value carried on a pin.
pub const MAX_TEXT_LEN: usize = 32;

// ── Wire types ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Hello,
    Write,
    Sync,
    Ping,
}

/// A pin value: dashboards send numbers for gauges and strings for labels.
#[derive(Debug, Clone, PartialEq)]
pub enum PinValue {
    Number(f64),
    Text(String<MAX_TEXT_LEN>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<PinValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String<64>>,
    #[serde(default, skip_serializing_if = "no_pins")]
    pub pins: Vec<u8, 8>,
}

fn no_pins(pins: &Vec<u8, 8>) -> bool {
    pins.is_empty()
}

impl WireMessage {
    const fn bare(kind: MessageKind) -> Self {
        Self {
            kind,
            pin: None,
            value: None,
            token: None,
            pins: Vec::new(),
        }
    }

    pub fn hello(token: &String<64>) -> Self {
        Self {
            token: Some(token.clone()),
            ..Self::bare(MessageKind::Hello)
        }
    }

    pub fn write_number(pin: VirtualPin, value: f64) -> Self {
        Self {
            pin: Some(pin.number()),
            value: Some(PinValue::Number(value)),
            ..Self::bare(MessageKind::Write)
        }
    }

    pub fn write_text(pin: VirtualPin, text: &str) -> Result<Self, RemoteError> {
        let mut s = String::new();
        s.push_str(text).map_err(|_| RemoteError::Oversized)?;
        Ok(Self {
            pin: Some(pin.number()),
            value: Some(PinValue::Text(s)),
            ..Self::bare(MessageKind::Write)
        })
    }

    pub fn sync(pins: &[VirtualPin]) -> Result<Self, RemoteError> {
        let mut msg = Self::bare(MessageKind::Sync);
        for p in pins {
            msg.pins.push(p.number()).map_err(|_| RemoteError::Oversized)?;
        }
        Ok(msg)
    }
}

// ── PinValue serde ───────────────────────────────────────────

impl Serialize for PinValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

struct PinValueVisitor;

impl Visitor<'_> for PinValueVisitor {
    type Value = PinValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a number or a string of at most {MAX_TEXT_LEN} bytes")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<PinValue, E> {
        Ok(PinValue::Number(if v { 1.0 } else { 0.0 }))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<PinValue, E> {
        Ok(PinValue::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<PinValue, E> {
        Ok(PinValue::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<PinValue, E> {
        Ok(PinValue::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<PinValue, E> {
        let mut s = String::new();
        s.push_str(v)
            .map_err(|_| E::invalid_length(v.len(), &self))?;
        Ok(PinValue::Text(s))
    }
}

impl<'de> Deserialize<'de> for PinValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PinValueVisitor)
    }
}

// ── Inbound ──────────────────────────────────────────────────

/// What an inbound line means to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    Override(OverrideCommand),
    /// Valid but irrelevant (keepalive, writes to display pins).
    Ignored,
}

/// Map a switch value to an override intent.
pub fn override_intent(value: &PinValue) -> Result<Option<bool>, RemoteError> {
    let n = match value {
        PinValue::Number(n) => *n,
        PinValue::Text(s) if s.trim().eq_ignore_ascii_case("auto") => return Ok(None),
        PinValue::Text(s) => s.trim().parse::<f64>().map_err(|_| RemoteError::Malformed)?,
    };
    if (n - 1.0).abs() < f64::EPSILON {
        Ok(Some(true))
    } else if n.abs() < f64::EPSILON {
        Ok(Some(false))
    } else if (n + 1.0).abs() < f64::EPSILON {
        Ok(None)
    } else {
        Err(RemoteError::Malformed)
    }
}

/// Decode one line received from the server.
pub fn decode_inbound(line: &[u8]) -> Result<Inbound, RemoteError> {
    let msg: WireMessage = serde_json::from_slice(line).map_err(|_| RemoteError::Malformed)?;
    if msg.kind != MessageKind::Write {
        return Ok(Inbound::Ignored);
    }
    let number = msg.pin.ok_or(RemoteError::Malformed)?;
    let pin = VirtualPin::from_number(number).ok_or(RemoteError::UnknownPin(number))?;
    let Some(actuator) = pin.controlled_actuator() else {
        return Ok(Inbound::Ignored);
    };
    let value = msg.value.as_ref().ok_or(RemoteError::Malformed)?;
    Ok(Inbound::Override(OverrideCommand {
        actuator,
        intent: override_intent(value)?,
    }))
}

// ── Outbound ─────────────────────────────────────────────────

/// Serialise `msg` as one `\n`-terminated line.
pub fn encode_line(msg: &WireMessage) -> Result<Line, RemoteError> {
    let json = serde_json::to_vec(msg).map_err(|_| RemoteError::Malformed)?;
    if json.len() > MAX_LINE_LEN {
        return Err(RemoteError::Oversized);
    }
    let mut line = Line::new();
    line.extend_from_slice(&json)
        .map_err(|_| RemoteError::Oversized)?;
    line.push(b'\n').map_err(|_| RemoteError::Oversized)?;
    Ok(line)
}

/// Round to one decimal place for display.
pub fn round_one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
